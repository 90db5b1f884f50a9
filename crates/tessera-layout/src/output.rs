//! Named content blobs handed to whatever persists them.

use std::io;

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Directory relative to the output root, `/`-separated.
    pub pathname: String,
    /// File name.
    pub filename: String,
    /// File content.
    pub content: String,
}

impl OutputFile {
    /// Creates a file entry.
    pub fn new(
        pathname: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// `pathname/filename`.
    #[must_use]
    pub fn path(&self) -> String {
        if self.pathname.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.pathname.trim_end_matches('/'), self.filename)
        }
    }
}

/// Accepts generated files.
pub trait OutputSink {
    /// Persists one file.
    ///
    /// # Errors
    ///
    /// Any I/O failure of the underlying store.
    fn write(&mut self, file: &OutputFile) -> io::Result<()>;
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Files written so far.
    pub files: Vec<OutputFile>,
}

impl OutputSink for MemorySink {
    fn write(&mut self, file: &OutputFile) -> io::Result<()> {
        self.files.push(file.clone());
        Ok(())
    }
}
