use crate::transfer::TransferError;
use airbeam_core::{FileMetadata, TransferProgress};
use bytes::{Bytes, BytesMut};

/// A fully received file, materialized once the accumulated bytes match the
/// declared size exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub metadata: FileMetadata,
    pub data: Bytes,
}

#[derive(Debug)]
pub enum AssemblyStep {
    Incomplete(TransferProgress),
    Complete(ReceivedFile),
}

struct Incoming {
    metadata: FileMetadata,
    buf: BytesMut,
}

/// Receive-side accumulation. The protocol is metadata first, then binary
/// chunks in arrival order; a chunk with no preceding metadata is rejected
/// rather than buffered speculatively, and overshooting the declared size
/// is an error rather than a silent stop.
#[derive(Default)]
pub struct FileAssembler {
    current: Option<Incoming>,
}

impl FileAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    /// Begin a new file. A zero-byte file is complete as soon as its
    /// metadata arrives. Metadata arriving mid-file abandons the previous
    /// accumulation and starts over.
    pub fn start(&mut self, metadata: FileMetadata) -> AssemblyStep {
        if metadata.size == 0 {
            self.current = None;
            return AssemblyStep::Complete(ReceivedFile {
                metadata,
                data: Bytes::new(),
            });
        }

        // Capacity grows with the chunks; a bogus declared size cannot
        // force a huge upfront allocation.
        let declared = metadata.size;
        self.current = Some(Incoming {
            metadata,
            buf: BytesMut::new(),
        });
        AssemblyStep::Incomplete(TransferProgress::new(0, declared))
    }

    pub fn accept_chunk(&mut self, chunk: Bytes) -> Result<AssemblyStep, TransferError> {
        let Some(incoming) = self.current.as_mut() else {
            return Err(TransferError::OutOfOrderChunk);
        };

        incoming.buf.extend_from_slice(&chunk);
        let received = incoming.buf.len() as u64;
        let declared = incoming.metadata.size;

        if received > declared {
            self.current = None;
            return Err(TransferError::SizeMismatch { declared, received });
        }

        if received == declared {
            let incoming = self
                .current
                .take()
                .ok_or(TransferError::OutOfOrderChunk)?;
            return Ok(AssemblyStep::Complete(ReceivedFile {
                metadata: incoming.metadata,
                data: incoming.buf.freeze(),
            }));
        }

        Ok(AssemblyStep::Incomplete(TransferProgress::new(
            received, declared,
        )))
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
