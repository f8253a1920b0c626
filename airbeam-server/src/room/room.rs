use airbeam_core::{Member, PeerId, RoomId, RoomVisibility};
use std::collections::HashMap;

/// One room's membership. Mutated only through [`RoomRegistry`], which
/// serializes access inside the relay actor.
///
/// [`RoomRegistry`]: crate::room::RoomRegistry
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    visibility: RoomVisibility,
    members: HashMap<PeerId, Member>,
}

impl Room {
    pub fn new(id: RoomId, visibility: RoomVisibility) -> Self {
        Self {
            id,
            visibility,
            members: HashMap::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn visibility(&self) -> RoomVisibility {
        self.visibility
    }

    pub fn insert(&mut self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Member> {
        self.members.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.members.contains_key(peer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Owned copy of the membership; later registry mutation never changes
    /// a snapshot already handed out. Sorted by id so broadcasts are stable.
    pub fn snapshot(&self) -> Vec<Member> {
        let mut users: Vec<Member> = self.members.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }
}
