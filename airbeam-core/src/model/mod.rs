mod member;
mod peer;
mod room;
mod signaling;
mod transfer;

pub use member::Member;
pub use peer::PeerId;
pub use room::{RoomId, RoomVisibility};
pub use signaling::SignalingMessage;
pub use transfer::{
    ChannelMessage, FileMetadata, TransferProgress, BUFFER_HIGH_WATER, BUFFER_LOW_WATER,
    CHUNK_SIZE,
};
