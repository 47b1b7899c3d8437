use std::{
    collections::VecDeque,
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::Path,
    sync::Arc,
};

use parking_lot::Mutex;

/// Appends log lines to a file and rewrites it down to the newest
/// `max_lines` lines once it has grown 10% (at least 50 lines) past the cap.
#[derive(Clone)]
pub struct CappedFileWriter {
    path: String,
    max_lines: u32,
    written: Arc<Mutex<u32>>,
}

impl CappedFileWriter {
    pub fn new(path: String, max_lines: u32) -> Self {
        Self {
            path,
            max_lines: max_lines.max(1),
            written: Arc::new(Mutex::new(0)),
        }
    }

    fn truncate_to_cap(&self) -> io::Result<()> {
        if !Path::new(&self.path).exists() {
            return Ok(());
        }

        let cap = self.max_lines as usize;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(cap + 1);
        for line in BufReader::new(File::open(&self.path)?).lines() {
            tail.push_back(line?);
            if tail.len() > cap {
                tail.pop_front();
            }
        }

        let mut file = File::create(&self.path)?;
        for line in &tail {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}

impl io::Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Serialize writers so a prune never races an append.
        let mut written = self.written.lock();

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(buf)?;

        *written += buf.iter().filter(|&&b| b == b'\n').count() as u32;
        if *written >= (self.max_lines / 10).max(50) {
            if let Err(e) = self.truncate_to_cap() {
                eprintln!("Failed to truncate log file {}: {}", self.path, e);
            }
            *written = 0;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radio.log");
        let mut writer = CappedFileWriter::new(path.to_string_lossy().into_owned(), 20);

        for i in 0..120 {
            writer.write_all(format!("line {}\n", i).as_bytes()).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // last prune happened at line 100, 20 lines appended since
        assert_eq!(lines.len(), 40);
        assert_eq!(lines.last(), Some(&"line 119"));
        assert_eq!(lines.first(), Some(&"line 80"));
    }
}
