use crate::room::Room;
use airbeam_core::{Member, PeerId, RoomId, RoomVisibility};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room '{0}' not found")]
    RoomNotFound(RoomId),

    #[error("room id '{0}' is already taken")]
    RoomIdConflict(RoomId),

    #[error("a private room needs a room id")]
    RoomIdMissing,
}

/// Result of removing a member from its room. `remaining` is empty when the
/// room emptied and was deleted.
#[derive(Debug)]
pub struct RoomUpdate {
    pub room_id: RoomId,
    pub remaining: Vec<Member>,
}

/// Authoritative room state. No I/O of its own; the relay actor owns the
/// registry and is the single writer, which makes every
/// snapshot-then-broadcast pair atomic from the clients' point of view.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    member_rooms: HashMap<PeerId, RoomId>,
    public_index: BTreeSet<RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with the creator as its sole member.
    ///
    /// Public rooms get a fresh generated id; private rooms use the supplied
    /// id and fail with [`RegistryError::RoomIdConflict`] when taken. The
    /// caller must have removed the creator from any previous room first.
    pub fn create_room(
        &mut self,
        creator: Member,
        visibility: RoomVisibility,
        desired_id: Option<RoomId>,
    ) -> Result<(RoomId, Vec<Member>), RegistryError> {
        let room_id = match visibility {
            RoomVisibility::Public => self.fresh_public_id(),
            RoomVisibility::Private => {
                let id = desired_id.ok_or(RegistryError::RoomIdMissing)?;
                if self.rooms.contains_key(&id) {
                    return Err(RegistryError::RoomIdConflict(id));
                }
                id
            }
        };

        let mut room = Room::new(room_id.clone(), visibility);
        self.member_rooms
            .insert(creator.id.clone(), room_id.clone());
        room.insert(creator);
        let users = room.snapshot();

        if visibility == RoomVisibility::Public {
            self.public_index.insert(room_id.clone());
        }
        self.rooms.insert(room_id.clone(), room);

        info!("Room '{}' created ({:?})", room_id, visibility);
        Ok((room_id, users))
    }

    /// Add a member to an existing room and return the full membership
    /// snapshot. The caller must broadcast `user-list-update` with the
    /// snapshot to every member, including the new one.
    pub fn join_room(
        &mut self,
        room_id: &RoomId,
        member: Member,
    ) -> Result<Vec<Member>, RegistryError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;

        self.member_rooms
            .insert(member.id.clone(), room_id.clone());
        room.insert(member);
        Ok(room.snapshot())
    }

    /// Remove a member from whatever room it is in. Idempotent: `None` when
    /// the member is in no room. Deletes the room (and its public-index
    /// entry) when it empties; otherwise the caller owes the remaining
    /// members the same `user-list-update` broadcast as a join.
    pub fn leave_room(&mut self, peer_id: &PeerId) -> Option<RoomUpdate> {
        let room_id = self.member_rooms.remove(peer_id)?;
        let room = self.rooms.get_mut(&room_id)?;

        room.remove(peer_id);

        if room.is_empty() {
            self.rooms.remove(&room_id);
            self.public_index.remove(&room_id);
            info!("Room '{}' emptied and removed", room_id);
            return Some(RoomUpdate {
                room_id,
                remaining: Vec::new(),
            });
        }

        let remaining = room.snapshot();
        Some(RoomUpdate { room_id, remaining })
    }

    /// Ordered snapshot of public room ids, not a live view.
    pub fn list_public_rooms(&self) -> Vec<RoomId> {
        self.public_index.iter().cloned().collect()
    }

    /// Room the peer currently sits in, if any.
    pub fn room_of(&self, peer_id: &PeerId) -> Option<&RoomId> {
        self.member_rooms.get(peer_id)
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Validate a create request without changing any state. Lets the
    /// caller reject a doomed create before it mutates membership.
    pub fn check_create(
        &self,
        visibility: RoomVisibility,
        desired_id: Option<&RoomId>,
    ) -> Result<(), RegistryError> {
        if visibility == RoomVisibility::Private {
            let id = desired_id.ok_or(RegistryError::RoomIdMissing)?;
            if self.rooms.contains_key(id) {
                return Err(RegistryError::RoomIdConflict(id.clone()));
            }
        }
        Ok(())
    }

    /// Whether `peer_id` is a current member of `room_id`.
    pub fn is_member(&self, room_id: &RoomId, peer_id: &PeerId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(peer_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn fresh_public_id(&self) -> RoomId {
        loop {
            let id = RoomId::generate();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}
