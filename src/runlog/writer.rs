//! Run log writer
//!
//! Every line goes to the terminal and to the log file, flushed immediately so
//! an interrupted run still leaves a usable log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::format;
use crate::models::{Mode, Summary, TestId, TestRecord};

pub struct LogWriter {
    path: PathBuf,
    file: File,
    echo: bool,
}

impl LogWriter {
    /// Start a fresh log, truncating any existing file
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file,
            echo: true,
        })
    }

    /// Continue an existing log (resumed runs)
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            echo: true,
        })
    }

    /// Write to the file only
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        if self.echo {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        self.file.write_all(text.as_bytes())?;
        self.file.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        self.write_str(text)?;
        self.write_str("\n")
    }

    pub fn header(&mut self, pytorch_path: &Path, mode: Mode) -> io::Result<()> {
        let text = format::header(pytorch_path, &self.path, mode);
        self.write_str(&text)
    }

    pub fn test_start(&mut self, position: usize, total: usize, id: &TestId) -> io::Result<()> {
        self.write_str(&format::test_start(position, total, id))
    }

    /// Raw runner output goes to the file only; the terminal gets the status
    pub fn test_output(&mut self, stdout: &str, stderr: &str) -> io::Result<()> {
        for stream in [stdout, stderr] {
            if stream.is_empty() {
                continue;
            }
            self.file.write_all(stream.as_bytes())?;
            if !stream.ends_with('\n') {
                self.file.write_all(b"\n")?;
            }
        }
        self.file.flush()
    }

    pub fn test_status(
        &mut self,
        record: &TestRecord,
        limit: Option<Duration>,
        detail: Option<&str>,
    ) -> io::Result<()> {
        self.write_str(&format::status(record, limit, detail))
    }

    pub fn summary(&mut self, title: &str, summary: &Summary) -> io::Result<()> {
        self.write_str(&format::summary(title, summary))
    }
}
