//! The set of live rooms and who sits where.

use std::collections::HashMap;

use fateline_core::error::DomainError;
use tracing::info;

use crate::domain::player::{Player, PlayerId};
use crate::domain::room::{Room, RoomId};

/// Owns every room and the player-to-room membership index.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<PlayerId, RoomId>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a room with `owner` seated and records the membership.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyInRoom` if the owner is seated elsewhere.
    pub fn create(&mut self, room_id: RoomId, owner: Player) -> Result<&mut Room, DomainError> {
        if self.memberships.contains_key(&owner.id) {
            return Err(DomainError::AlreadyInRoom);
        }
        self.memberships.insert(owner.id, room_id);
        info!(room_id = %room_id, owner_id = %owner.id, "room created");
        Ok(self
            .rooms
            .entry(room_id)
            .or_insert_with(|| Room::new(room_id, owner)))
    }

    /// Looks up a room.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoomNotFound` if no such room exists.
    pub fn get(&self, room_id: RoomId) -> Result<&Room, DomainError> {
        self.rooms
            .get(&room_id)
            .ok_or(DomainError::RoomNotFound(room_id))
    }

    /// Looks up a room mutably.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoomNotFound` if no such room exists.
    pub fn get_mut(&mut self, room_id: RoomId) -> Result<&mut Room, DomainError> {
        self.rooms
            .get_mut(&room_id)
            .ok_or(DomainError::RoomNotFound(room_id))
    }

    /// The room a player is seated in.
    #[must_use]
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        self.memberships.get(&player_id).copied()
    }

    /// Records that a player now sits in a room.
    pub fn bind(&mut self, player_id: PlayerId, room_id: RoomId) {
        self.memberships.insert(player_id, room_id);
    }

    /// Forgets a player's membership.
    pub fn unbind(&mut self, player_id: PlayerId) {
        self.memberships.remove(&player_id);
    }

    /// Drops the room if nobody is left in it. Returns whether it was dropped.
    pub fn remove_if_empty(&mut self, room_id: RoomId) -> bool {
        let empty = self
            .rooms
            .get(&room_id)
            .is_some_and(|room| room.players.is_empty());
        if empty {
            self.rooms.remove(&room_id);
            info!(room_id = %room_id, "room closed");
        }
        empty
    }

    /// Number of live rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_create_binds_owner() {
        // Arrange
        let mut registry = RoomRegistry::new();
        let (room_id, owner) = (Uuid::new_v4(), Uuid::new_v4());

        // Act
        registry
            .create(room_id, Player::new(owner, "Ada").unwrap())
            .unwrap();

        // Assert
        assert_eq!(registry.room_of(owner), Some(room_id));
        assert_eq!(registry.get(room_id).unwrap().owner_id, owner);
    }

    #[test]
    fn test_create_rejects_seated_player() {
        let mut registry = RoomRegistry::new();
        let owner = Uuid::new_v4();
        registry
            .create(Uuid::new_v4(), Player::new(owner, "Ada").unwrap())
            .unwrap();

        let result = registry.create(Uuid::new_v4(), Player::new(owner, "Ada").unwrap());

        assert!(matches!(result, Err(DomainError::AlreadyInRoom)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_room_is_not_found() {
        let registry = RoomRegistry::new();
        let room_id = Uuid::new_v4();

        assert!(matches!(
            registry.get(room_id),
            Err(DomainError::RoomNotFound(id)) if id == room_id
        ));
    }

    #[test]
    fn test_remove_if_empty_keeps_occupied_rooms() {
        // Arrange
        let mut registry = RoomRegistry::new();
        let (room_id, owner) = (Uuid::new_v4(), Uuid::new_v4());
        registry
            .create(room_id, Player::new(owner, "Ada").unwrap())
            .unwrap();

        // Act / Assert
        assert!(!registry.remove_if_empty(room_id));
        let departure = registry.get_mut(room_id).unwrap().leave(owner).unwrap();
        registry.unbind(owner);
        assert!(departure.emptied);
        assert!(registry.remove_if_empty(room_id));
        assert!(registry.is_empty());
        assert_eq!(registry.room_of(owner), None);
    }
}
