use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// One connected user as seen in membership snapshots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: PeerId,
    pub username: String,
}

impl Member {
    pub fn new(id: PeerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Member with the display name the relay assigns at connect time.
    pub fn generated(id: PeerId) -> Self {
        let username = format!("user-{}", id.short());
        Self { id, username }
    }
}
