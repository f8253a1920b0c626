use crate::relay::RelayCommand;
use crate::room::{RegistryError, RoomRegistry, RoomUpdate};
use crate::signaling::SignalingOutput;
use airbeam_core::{Member, PeerId, RoomVisibility, SignalingMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The relay actor. Owns the registry and the member table, consumes every
/// command from the connection tasks through one channel, and pushes
/// replies/broadcasts through the [`SignalingOutput`]. Because it is the
/// single writer, a membership snapshot and its broadcast are atomic with
/// respect to every other join/leave.
pub struct SignalingRelay {
    registry: RoomRegistry,
    members: HashMap<PeerId, Member>,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            members: HashMap::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Relay event loop finished");
    }

    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { member } => {
                debug!("Peer {} connected as '{}'", member.id, member.username);
                self.output.send_to(
                    &member.id,
                    &SignalingMessage::Welcome {
                        id: member.id.clone(),
                        username: member.username.clone(),
                    },
                );
                self.members.insert(member.id.clone(), member);
            }

            RelayCommand::Message { from, message } => self.handle_message(from, message),

            RelayCommand::Disconnect { peer_id } => {
                debug!("Peer {} disconnected", peer_id);
                let update = self.registry.leave_room(&peer_id);
                self.broadcast_update(update);
                self.members.remove(&peer_id);
            }
        }
    }

    fn handle_message(&mut self, from: PeerId, message: SignalingMessage) {
        if message.target().is_some() {
            self.route(from, message);
            return;
        }

        match message {
            SignalingMessage::CreateRoom { is_public, room_id } => {
                let Some(creator) = self.members.get(&from).cloned() else {
                    warn!("create-room from unknown peer {}", from);
                    return;
                };

                let visibility = if is_public {
                    RoomVisibility::Public
                } else {
                    RoomVisibility::Private
                };

                // Validate before touching membership: a rejected create
                // must not evict the sender from its current room.
                if let Err(e) = self.registry.check_create(visibility, room_id.as_ref()) {
                    self.send_error(&from, e.to_string());
                    return;
                }

                // Creating a room implies leaving the previous one.
                let update = self.registry.leave_room(&from);
                self.broadcast_update(update);

                match self.registry.create_room(creator, visibility, room_id) {
                    Ok((room_id, users)) => {
                        self.output
                            .send_to(&from, &SignalingMessage::RoomCreated { room_id, users });
                    }
                    Err(e) => self.send_error(&from, e.to_string()),
                }
            }

            SignalingMessage::JoinRoom { room_id } => {
                let Some(member) = self.members.get(&from).cloned() else {
                    warn!("join-room from unknown peer {}", from);
                    return;
                };

                // Same validate-first rule: a join to a missing room is
                // just an error, never a leave.
                if !self.registry.contains_room(&room_id) {
                    self.send_error(
                        &from,
                        RegistryError::RoomNotFound(room_id).to_string(),
                    );
                    return;
                }

                // Re-joining the current room skips the leave, so a sole
                // member cannot delete the room out from under itself.
                if self.registry.room_of(&from) != Some(&room_id) {
                    let update = self.registry.leave_room(&from);
                    self.broadcast_update(update);
                }

                match self.registry.join_room(&room_id, member) {
                    Ok(users) => {
                        debug!("Peer {} joined room '{}'", from, room_id);
                        self.broadcast_users(&users);
                    }
                    Err(e) => self.send_error(&from, e.to_string()),
                }
            }

            SignalingMessage::GetPublicRooms => {
                let rooms = self.registry.list_public_rooms();
                self.output
                    .send_to(&from, &SignalingMessage::PublicRooms { rooms });
            }

            other => {
                warn!(
                    "Dropping unexpected '{}' from client {}",
                    other.kind(),
                    from
                );
            }
        }
    }

    /// Forward a peer-to-peer payload to its target within the sender's
    /// room, stamping `from` with the authenticated sender id. A missing
    /// target drops the message: the sender gets no reply and the condition
    /// is logged for the operator.
    fn route(&mut self, from: PeerId, mut message: SignalingMessage) {
        let Some(to) = message.target().cloned() else {
            return;
        };

        let Some(room_id) = self.registry.room_of(&from) else {
            warn!(
                "Peer {} sent '{}' while not in any room",
                from,
                message.kind()
            );
            return;
        };

        if !self.registry.is_member(room_id, &to) {
            warn!(
                "Target {} not found in room '{}' for '{}' from {}",
                to,
                room_id,
                message.kind(),
                from
            );
            return;
        }

        debug!("Forwarding '{}' from {} to {}", message.kind(), from, to);
        message.set_from(from);
        self.output.send_to(&to, &message);
    }

    /// The broadcast contract: after every join and leave, every remaining
    /// member of the room receives the fresh snapshot.
    fn broadcast_users(&self, users: &[Member]) {
        let message = SignalingMessage::UserListUpdate {
            users: users.to_vec(),
        };
        for member in users {
            self.output.send_to(&member.id, &message);
        }
    }

    fn broadcast_update(&self, update: Option<RoomUpdate>) {
        if let Some(update) = update
            && !update.remaining.is_empty()
        {
            self.broadcast_users(&update.remaining);
        }
    }

    fn send_error(&self, peer_id: &PeerId, message: String) {
        warn!("Error for {}: {}", peer_id, message);
        self.output
            .send_to(peer_id, &SignalingMessage::Error { message });
    }
}
