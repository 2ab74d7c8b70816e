//! Backing storage for the pre-closed document bytes.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Where the serialized document lives between pre-close and close.
///
/// Memory is the default; large documents can be staged in a temporary
/// file instead. The temp file is unlinked at creation and reclaimed by
/// the OS when dropped, on every exit path.
#[derive(Debug)]
pub enum BackingStore {
    /// In-memory buffer.
    Memory(Cursor<Vec<u8>>),
    /// Anonymous temporary file with random access.
    TempFile(File),
}

impl BackingStore {
    /// Creates an in-memory store.
    pub fn in_memory() -> Self {
        BackingStore::Memory(Cursor::new(Vec::new()))
    }

    /// Creates a temp-file-backed store.
    pub fn temp_file() -> io::Result<Self> {
        Ok(BackingStore::TempFile(tempfile::tempfile()?))
    }

    /// Returns the total number of bytes stored.
    pub fn len(&mut self) -> io::Result<u64> {
        match self {
            BackingStore::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
            BackingStore::TempFile(file) => {
                let position = file.stream_position()?;
                let len = file.seek(SeekFrom::End(0))?;
                file.seek(SeekFrom::Start(position))?;
                Ok(len)
            }
        }
    }

    /// Returns true when nothing has been written.
    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Overwrites `bytes` at `offset` without changing the length.
    pub fn overwrite_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        let len = self.len()?;
        if offset + bytes.len() as u64 > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "overwrite past end of backing store",
            ));
        }
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(bytes)
    }

    /// Streams the entire store into `sink`.
    pub fn stream_to<W: Write>(&mut self, sink: &mut W) -> io::Result<u64> {
        self.seek(SeekFrom::Start(0))?;
        io::copy(self, sink)
    }
}

impl Read for BackingStore {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BackingStore::Memory(cursor) => cursor.read(buf),
            BackingStore::TempFile(file) => file.read(buf),
        }
    }
}

impl Write for BackingStore {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BackingStore::Memory(cursor) => cursor.write(buf),
            BackingStore::TempFile(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BackingStore::Memory(cursor) => cursor.flush(),
            BackingStore::TempFile(file) => file.flush(),
        }
    }
}

impl Seek for BackingStore {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            BackingStore::Memory(cursor) => cursor.seek(pos),
            BackingStore::TempFile(file) => file.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(mut store: BackingStore) {
        store.write_all(b"hello world").unwrap();
        assert_eq!(store.len().unwrap(), 11);

        store.overwrite_at(6, b"earth").unwrap();
        assert_eq!(store.len().unwrap(), 11);

        let mut out = Vec::new();
        store.stream_to(&mut out).unwrap();
        assert_eq!(out, b"hello earth");
    }

    #[test]
    fn test_memory_store() {
        exercise(BackingStore::in_memory());
    }

    #[test]
    fn test_temp_file_store() {
        exercise(BackingStore::temp_file().unwrap());
    }

    #[test]
    fn test_overwrite_past_end_rejected() {
        let mut store = BackingStore::in_memory();
        store.write_all(b"abc").unwrap();
        assert!(store.overwrite_at(2, b"xyz").is_err());
    }
}
