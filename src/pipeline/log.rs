use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use parking_lot::Mutex;

pub type FileLog = RecordLog<BufWriter<File>>;

/// Line-oriented output shared by a pool of workers. Each line is written
/// whole under the log's own lock, so lines from different workers never
/// interleave.
#[derive(Debug)]
pub struct RecordLog<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> RecordLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn append_line(&self, line: impl Display) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

impl FileLog {
    /// Create (or truncate) `path` for writing.
    pub fn create(path: &str) -> io::Result<FileLog> {
        Ok(RecordLog::new(BufWriter::new(File::create(path)?)))
    }
}

#[cfg(test)]
impl RecordLog<Vec<u8>> {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.writer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn lines_from_many_writers_stay_whole() {
        let log = Arc::new(RecordLog::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        log.append_line(format!("writer{t}.example,10.0.{t}.{i}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = log.lines();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.starts_with("writer") && l.contains(",10.0.")));
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "stale,line\n").unwrap();

        let log = FileLog::create(path.to_str().unwrap()).unwrap();
        log.append_line("fresh.example,").unwrap();
        log.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh.example,\n");
    }
}
