//! Deterministic tie-break deciding which of two newly-mutually-visible
//! peers opens the data channel. Both sides compute the same answer from
//! the same pair of ids, so neither depends on event arrival order.

use crate::model::PeerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    /// This side creates the channel and sends the offer.
    Initiator,
    /// This side waits for the inbound channel.
    Responder,
}

/// The peer whose id sorts first initiates.
pub fn resolve(local: &PeerId, remote: &PeerId) -> PeerRole {
    if local < remote {
        PeerRole::Initiator
    } else {
        PeerRole::Responder
    }
}
