pub mod model;
pub mod role;

pub use model::{
    ChannelMessage, FileMetadata, Member, PeerId, RoomId, RoomVisibility, SignalingMessage,
    TransferProgress, CHUNK_SIZE, BUFFER_HIGH_WATER, BUFFER_LOW_WATER,
};
pub use role::{resolve, PeerRole};
