use airbeam_core::{CHUNK_SIZE, TransferProgress};
use bytes::Bytes;

/// Lazy cursor over a file's bytes, yielding fixed-size chunks in order.
/// Cheap to restart from any acknowledged offset; slicing `Bytes` never
/// copies the payload.
#[derive(Debug)]
pub struct FileChunker {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
}

impl FileChunker {
    pub fn new(data: Bytes) -> Self {
        Self::with_chunk_size(data, CHUNK_SIZE)
    }

    pub fn with_chunk_size(data: Bytes, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            data,
            offset: 0,
            chunk_size,
        }
    }

    /// Next chunk in order, `None` once the file is exhausted.
    pub fn next_chunk(&mut self) -> Option<Bytes> {
        if self.offset >= self.data.len() {
            return None;
        }
        let end = usize::min(self.offset + self.chunk_size, self.data.len());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        Some(chunk)
    }

    /// Rewind to an earlier offset, e.g. the last acknowledged byte.
    pub fn restart_from(&mut self, offset: u64) {
        self.offset = usize::min(offset as usize, self.data.len());
    }

    pub fn bytes_sent(&self) -> u64 {
        self.offset as u64
    }

    pub fn total_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn progress(&self) -> TransferProgress {
        TransferProgress::new(self.bytes_sent(), self.total_bytes())
    }
}
