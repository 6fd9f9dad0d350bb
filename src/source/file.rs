use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::Source;
use crate::error::{Error, Result};

/// File-backed source
///
/// The size is captured when the file is opened. The handle is closed when
/// the source is dropped, which covers every early return of a traversal.
#[derive(Debug)]
pub struct FileSource {
    reader: BufReader<File>,
    name: String,
    size: u64,
    position: u64,
}

impl FileSource {
    /// Open a file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path.display().to_string();
        Self::from_file(file, name)
    }

    /// Wrap an already opened file
    pub fn from_file(file: File, name: String) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(FileSource {
            reader: BufReader::new(file),
            name,
            size,
            position: 0,
        })
    }
}

impl Source for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size {
            return Err(Error::OutOfRange {
                offset,
                size: self.size,
            });
        }
        // Relative seeks keep the buffer when the target is already loaded
        let delta = offset as i64 - self.position as i64;
        if delta != 0 {
            self.reader.seek_relative(delta)?;
        }
        self.position = offset;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = buf.len().min(self.remaining() as usize);
        if want == 0 {
            return Ok(0);
        }
        let n = self.reader.read(&mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
