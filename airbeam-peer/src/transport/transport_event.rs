use bytes::Bytes;

/// One message on the data channel: JSON control frames travel as text,
/// file chunks as binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

impl Frame {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Inbound events from a transport, delivered in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is ready for send/receive.
    Open,
    Frame(Frame),
    Closed,
    Error(String),
}
