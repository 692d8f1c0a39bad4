use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// A data file opened during validation, waiting to be claimed.
#[derive(Debug)]
pub struct InputFile {
    path: PathBuf,
    file: File,
}

impl InputFile {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<InputFile> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(InputFile { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_reader(self) -> BufReader<File> {
        BufReader::new(self.file)
    }
}

/// Hands out each input file to exactly one requester.
///
/// Files are claimed from the back: with `n` files remaining the next claim
/// gets the file at position `n - 1`.
#[derive(Debug)]
pub struct FileDispenser {
    files: Mutex<Vec<InputFile>>,
    total: usize,
}

impl FileDispenser {
    pub fn new(files: Vec<InputFile>) -> Self {
        let total = files.len();
        Self {
            files: Mutex::new(files),
            total,
        }
    }

    /// Claim the next unprocessed file, or `None` when all have been claimed.
    /// Never blocks beyond the claim itself.
    pub fn claim_next(&self) -> Option<InputFile> {
        self.files.lock().pop()
    }

    pub fn remaining(&self) -> usize {
        self.files.lock().len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
