//! File access used to load textures.
//!
//! The layout engine resolves resource names through a [`FileInterface`].
//! [`LocalFiles`] reads from a directory on disk; [`MemoryFiles`] serves
//! byte buffers registered up front.

use std::{
    collections::HashMap,
    fs,
    io::{self, Cursor, Read, Seek, SeekFrom},
    path::PathBuf,
    sync::Arc,
};

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// An open file.
    pub struct FileHandle;
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file '{0}' not found")]
    NotFound(String),
    #[error("file handle is not open")]
    InvalidHandle,
    #[error("read {actual} of {expected} bytes")]
    ShortRead { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Access to named resources.
pub trait FileInterface: Send {
    fn open(&mut self, path: &str) -> Result<FileHandle, FileError>;

    fn close(&mut self, file: FileHandle);

    /// Reads up to `buffer.len()` bytes, returning the number read.
    fn read(&mut self, file: FileHandle, buffer: &mut [u8]) -> Result<usize, FileError>;

    /// Moves the read cursor, returning the new offset from the start.
    fn seek(&mut self, file: FileHandle, pos: SeekFrom) -> Result<u64, FileError>;

    fn tell(&mut self, file: FileHandle) -> Result<u64, FileError>;
}

/// Reads the whole of `path` into memory.
///
/// The file is always closed before returning.
pub fn read_file(files: &mut dyn FileInterface, path: &str) -> Result<Vec<u8>, FileError> {
    let file = files.open(path)?;
    let result = read_open_file(files, file);
    files.close(file);
    result
}

fn read_open_file(files: &mut dyn FileInterface, file: FileHandle) -> Result<Vec<u8>, FileError> {
    files.seek(file, SeekFrom::End(0))?;
    let size = files.tell(file)? as usize;
    files.seek(file, SeekFrom::Start(0))?;

    let mut buffer = vec![0; size];
    let mut filled = 0;
    while filled < size {
        let n = files.read(file, &mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled < size {
        return Err(FileError::ShortRead {
            expected: size,
            actual: filled,
        });
    }
    Ok(buffer)
}

/// Reads files relative to a root directory.
#[derive(Debug, Default)]
pub struct LocalFiles {
    root: PathBuf,
    open: SlotMap<FileHandle, fs::File>,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open: SlotMap::default(),
        }
    }

    fn file(&mut self, file: FileHandle) -> Result<&mut fs::File, FileError> {
        self.open.get_mut(file).ok_or(FileError::InvalidHandle)
    }
}

impl FileInterface for LocalFiles {
    fn open(&mut self, path: &str) -> Result<FileHandle, FileError> {
        let file = fs::File::open(self.root.join(path)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path.to_owned()),
            _ => FileError::Io(e),
        })?;
        Ok(self.open.insert(file))
    }

    fn close(&mut self, file: FileHandle) {
        if self.open.remove(file).is_none() {
            log::warn!("Closed a file handle that was not open");
        }
    }

    fn read(&mut self, file: FileHandle, buffer: &mut [u8]) -> Result<usize, FileError> {
        Ok(self.file(file)?.read(buffer)?)
    }

    fn seek(&mut self, file: FileHandle, pos: SeekFrom) -> Result<u64, FileError> {
        Ok(self.file(file)?.seek(pos)?)
    }

    fn tell(&mut self, file: FileHandle) -> Result<u64, FileError> {
        Ok(self.file(file)?.stream_position()?)
    }
}

/// Serves in-memory buffers by name.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: HashMap<String, Arc<[u8]>>,
    open: SlotMap<FileHandle, Cursor<Arc<[u8]>>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `path`, replacing any previous contents.
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.files.insert(path.into(), data.into());
    }

    fn cursor(&mut self, file: FileHandle) -> Result<&mut Cursor<Arc<[u8]>>, FileError> {
        self.open.get_mut(file).ok_or(FileError::InvalidHandle)
    }
}

impl FileInterface for MemoryFiles {
    fn open(&mut self, path: &str) -> Result<FileHandle, FileError> {
        let data = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_owned()))?;
        Ok(self.open.insert(Cursor::new(data)))
    }

    fn close(&mut self, file: FileHandle) {
        if self.open.remove(file).is_none() {
            log::warn!("Closed a file handle that was not open");
        }
    }

    fn read(&mut self, file: FileHandle, buffer: &mut [u8]) -> Result<usize, FileError> {
        Ok(self.cursor(file)?.read(buffer)?)
    }

    fn seek(&mut self, file: FileHandle, pos: SeekFrom) -> Result<u64, FileError> {
        Ok(self.cursor(file)?.seek(pos)?)
    }

    fn tell(&mut self, file: FileHandle) -> Result<u64, FileError> {
        Ok(self.cursor(file)?.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `chunk` bytes per read and can cut a file short.
    struct Trickle {
        inner: MemoryFiles,
        chunk: usize,
        limit: usize,
        served: usize,
    }

    impl FileInterface for Trickle {
        fn open(&mut self, path: &str) -> Result<FileHandle, FileError> {
            self.inner.open(path)
        }

        fn close(&mut self, file: FileHandle) {
            self.inner.close(file)
        }

        fn read(&mut self, file: FileHandle, buffer: &mut [u8]) -> Result<usize, FileError> {
            let len = buffer
                .len()
                .min(self.chunk)
                .min(self.limit.saturating_sub(self.served));
            let n = self.inner.read(file, &mut buffer[..len])?;
            self.served += n;
            Ok(n)
        }

        fn seek(&mut self, file: FileHandle, pos: SeekFrom) -> Result<u64, FileError> {
            self.inner.seek(file, pos)
        }

        fn tell(&mut self, file: FileHandle) -> Result<u64, FileError> {
            self.inner.tell(file)
        }
    }

    #[test]
    fn read_whole_memory_file() {
        let mut files = MemoryFiles::new();
        files.insert("a.tga", vec![1u8, 2, 3, 4, 5]);
        assert_eq!(read_file(&mut files, "a.tga").unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(files.open.is_empty());
    }

    #[test]
    fn missing_file() {
        let mut files = MemoryFiles::new();
        assert!(matches!(
            read_file(&mut files, "nope.tga"),
            Err(FileError::NotFound(path)) if path == "nope.tga"
        ));
    }

    #[test]
    fn partial_reads_are_joined() {
        let mut inner = MemoryFiles::new();
        let data: Vec<u8> = (0..100).collect();
        inner.insert("f", data.clone());
        let mut files = Trickle {
            inner,
            chunk: 7,
            limit: usize::MAX,
            served: 0,
        };
        assert_eq!(read_file(&mut files, "f").unwrap(), data);
    }

    #[test]
    fn short_read_fails_and_closes() {
        let mut inner = MemoryFiles::new();
        inner.insert("f", vec![0u8; 32]);
        let mut files = Trickle {
            inner,
            chunk: 8,
            limit: 20,
            served: 0,
        };
        assert!(matches!(
            read_file(&mut files, "f"),
            Err(FileError::ShortRead {
                expected: 32,
                actual: 20
            })
        ));
        assert!(files.inner.open.is_empty());
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut files = MemoryFiles::new();
        files.insert("f", vec![0u8; 4]);
        let handle = files.open("f").unwrap();
        files.close(handle);
        assert!(matches!(
            files.tell(handle),
            Err(FileError::InvalidHandle)
        ));
    }

    #[test]
    fn local_files_read_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("rml-skia-files-{}", fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("x.bin"), [9u8, 8, 7]).unwrap();

        let mut files = LocalFiles::new(&dir);
        assert_eq!(read_file(&mut files, "x.bin").unwrap(), vec![9, 8, 7]);
        assert!(matches!(
            read_file(&mut files, "y.bin"),
            Err(FileError::NotFound(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
