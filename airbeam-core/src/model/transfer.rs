use serde::{Deserialize, Serialize};

/// Chunk size used by the sender when slicing a file (16 KB).
pub const CHUNK_SIZE: usize = 16384;

/// Outgoing-buffer level above which the sender suspends until the
/// transport drains (1 MiB).
pub const BUFFER_HIGH_WATER: usize = 1024 * 1024;

/// Buffer level at which a suspended sender resumes.
pub const BUFFER_LOW_WATER: usize = 256 * 1024;

/// Descriptor sent ahead of the first chunk of a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
        }
    }
}

/// Progress snapshot emitted after every chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub percentage: f64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, total_bytes: u64) -> Self {
        let percentage = if total_bytes == 0 {
            100.0
        } else {
            bytes_transferred as f64 / total_bytes as f64 * 100.0
        };
        Self {
            bytes_transferred,
            total_bytes,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_transferred == self.total_bytes
    }
}

/// Control frames exchanged over the data channel itself. File bytes travel
/// as raw binary frames between these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelMessage {
    FileMetadata { metadata: FileMetadata },
}
