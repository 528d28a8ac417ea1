//! Append-only link log
//!
//! One submission URL per line, in discovery order. Lines are only ever
//! appended; the log is never rewritten.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File name of the link log inside the state directory
pub const LINK_LOG_FILE: &str = "links.txt";

/// Handle on the on-disk link log
#[derive(Debug, Clone)]
pub struct LinkLog {
    path: PathBuf,
}

impl LinkLog {
    /// Log stored at `<state_dir>/links.txt`
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(LINK_LOG_FILE))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once discovery has written at least one page
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Appends `links` and syncs them to disk
    ///
    /// The file is created even when `links` is empty, marking that a
    /// listing page was recorded.
    pub fn append(&self, links: &[String]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        if links.is_empty() {
            return Ok(());
        }

        let mut block = String::new();
        if !ends_with_newline(&mut file)? {
            tracing::warn!(
                "Link log {} ends in a partial line; terminating it before appending",
                self.path.display()
            );
            block.push('\n');
        }
        for link in links {
            block.push_str(link);
            block.push('\n');
        }
        file.write_all(block.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    /// Reads every entry in insertion order; a missing log reads as empty
    pub fn read_all(&self) -> io::Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// True for an empty file or one whose last byte is a newline
fn ends_with_newline(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
