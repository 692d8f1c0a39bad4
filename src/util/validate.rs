use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::pipeline::dispenser::InputFile;

/// Validate that a thread count is within `1..=max`.
pub fn validate_thread_count(kind: &str, count: usize, max: usize) -> Result<()> {
    if count == 0 || count > max {
        bail!("invalid number of {kind} threads: `{count}`, expected 1 to {max}")
    }
    Ok(())
}

pub fn validate_data_file_count(count: usize, max: usize) -> Result<()> {
    if count > max {
        bail!("too many data files: `{count}`, at most {max} are allowed")
    }
    Ok(())
}

pub fn validate_capacity(capacity: usize, max: usize) -> Result<()> {
    if capacity == 0 || capacity > max {
        bail!("invalid buffer capacity: `{capacity}`, expected 1 to {max}")
    }
    Ok(())
}

/// Validate that an output file can be written without creating it.
///
/// An existing file must not be read-only. A missing file needs an existing
/// parent directory.
pub fn validate_output_path(kind: &str, path: &str) -> Result<()> {
    let file = Path::new(path);
    match fs::metadata(file) {
        Ok(meta) if meta.is_dir() => bail!("{kind} `{path}` is a directory"),
        Ok(meta) if meta.permissions().readonly() => bail!("{kind} `{path}` is not writable"),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let parent = match file.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if !parent.is_dir() {
                bail!("{kind} `{path}` cannot be created, `{}` is not a directory", parent.display())
            }
            Ok(())
        }
        Err(e) => bail!("{kind} `{path}` is not accessible: {e}"),
    }
}

pub fn validate_directory(kind: &str, path: &str) -> Result<()> {
    if !Path::new(path).is_dir() {
        bail!("{kind} `{path}` is not a directory")
    }
    Ok(())
}

/// Open every data file for reading, failing on the first one that can't be.
pub fn open_data_files(paths: &[String]) -> Result<Vec<InputFile>> {
    paths
        .iter()
        .map(|path| InputFile::open(path).with_context(|| format!("data file `{path}` is not readable")))
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn thread_count_bounds() {
        assert!(validate_thread_count("requester", 0, 5).is_err());
        assert!(validate_thread_count("requester", 1, 5).is_ok());
        assert!(validate_thread_count("requester", 5, 5).is_ok());
        assert!(validate_thread_count("requester", 6, 5).is_err());
        assert!(validate_thread_count("resolver", 10, 10).is_ok());
        assert!(validate_thread_count("resolver", 11, 10).is_err());
    }

    #[test]
    fn data_file_count_bounds() {
        assert!(validate_data_file_count(0, 100).is_ok());
        assert!(validate_data_file_count(100, 100).is_ok());
        assert!(validate_data_file_count(101, 100).is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(validate_capacity(0, 10_000).is_err());
        assert!(validate_capacity(1, 10_000).is_ok());
    }

    #[test]
    fn capacity_above_max_is_rejected() {
        assert!(validate_capacity(10_000, 10_000).is_ok());
        assert!(validate_capacity(10_001, 10_000).is_err());
        assert!(validate_capacity(usize::MAX / 2, 10_000).is_err());
    }

    #[test]
    fn output_path_in_existing_directory_is_valid_and_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        let path = path.to_str().unwrap();

        assert!(validate_output_path("resolver log", path).is_ok());
        assert!(!Path::new(path).exists());
    }

    #[test]
    fn output_path_in_missing_directory_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.txt");
        assert!(validate_output_path("resolver log", path.to_str().unwrap()).is_err());
    }

    #[test]
    fn read_only_output_path_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("serviced.txt");
        fs::write(&path, "").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        assert!(validate_output_path("requester log", path.to_str().unwrap()).is_err());
    }

    #[test]
    fn directory_as_output_path_is_invalid() {
        let dir = TempDir::new().unwrap();
        assert!(validate_output_path("requester log", dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn open_data_files_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("names.txt");
        fs::write(&good, "example.com\n").unwrap();
        let missing = dir.path().join("missing.txt");

        let paths = vec![
            good.to_str().unwrap().to_owned(),
            missing.to_str().unwrap().to_owned(),
        ];
        let error = open_data_files(&paths).unwrap_err();
        assert!(error.to_string().contains("missing.txt"));

        assert_eq!(open_data_files(&paths[..1]).unwrap().len(), 1);
    }
}
