//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::place::SavedPlace;

/// User domain entity
///
/// `places` is the ordered ownership list. `saved_places` holds snapshots of
/// places owned by other users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: String,
    pub places: Vec<Uuid>,
    pub saved_places: Vec<SavedPlace>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with empty lists
    pub fn new(name: String, email: String, password_hash: String, image: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            image,
            places: Vec::new(),
            saved_places: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn owns(&self, place_id: Uuid) -> bool {
        self.places.contains(&place_id)
    }

    pub fn has_saved(&self, place_id: Uuid) -> bool {
        self.saved_places.iter().any(|sp| sp.id == place_id)
    }

    /// Append to the ownership list. Returns false if already present.
    pub fn push_place(&mut self, place_id: Uuid) -> bool {
        if self.owns(place_id) {
            return false;
        }
        self.places.push(place_id);
        self.updated_at = Utc::now();
        true
    }

    /// Remove from the ownership list. Returns false if absent.
    pub fn pull_place(&mut self, place_id: Uuid) -> bool {
        let before = self.places.len();
        self.places.retain(|id| *id != place_id);
        let removed = self.places.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Store a snapshot. Returns false if the place was already saved.
    pub fn push_saved(&mut self, snapshot: SavedPlace) -> bool {
        if self.has_saved(snapshot.id) {
            return false;
        }
        self.saved_places.push(snapshot);
        self.updated_at = Utc::now();
        true
    }

    /// Drop the snapshot of a place. Returns false if none was stored.
    pub fn pull_saved(&mut self, place_id: Uuid) -> bool {
        let before = self.saved_places.len();
        self.saved_places.retain(|sp| sp.id != place_id);
        let removed = self.saved_places.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Point the profile at a new image, returning the previous path.
    pub fn replace_image(&mut self, image: String) -> String {
        self.updated_at = Utc::now();
        std::mem::replace(&mut self.image, image)
    }
}

/// Result of signup and login: who the caller is and a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}
