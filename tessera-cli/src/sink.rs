//! Writes output files below a root directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tessera_layout::{OutputFile, OutputSink};

/// Sink backed by the file system.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of `file`, refusing paths that would leave the root.
    fn target(&self, file: &OutputFile) -> io::Result<PathBuf> {
        let relative = Path::new(&file.pathname).join(&file.filename);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} escapes the output directory", relative.display()),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, file: &OutputFile) -> io::Result<()> {
        let path = self.target(file)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &file.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_stay_below_root() {
        let sink = DirectorySink::new("out");
        let nested = OutputFile::new("res/layout", "main.xml", "");
        assert_eq!(sink.target(&nested).expect("inside root"), Path::new("out/res/layout/main.xml"));
        let top = OutputFile::new("", "index.html", "");
        assert_eq!(sink.target(&top).expect("inside root"), Path::new("out/index.html"));
        assert!(sink.target(&OutputFile::new("../etc", "passwd", "")).is_err());
        assert!(sink.target(&OutputFile::new("/tmp", "x", "")).is_err());
    }
}
