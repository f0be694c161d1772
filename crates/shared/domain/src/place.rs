//! Place domain entity and the snapshot users keep when they save one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geocoded coordinates of an address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Place domain entity.
///
/// `creator` is the single owning user. `saved` holds the ids of users that
/// bookmarked the place; each of them keeps a `SavedPlace` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Location,
    pub image: String,
    pub creator: Uuid,
    pub saved: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Create a new place owned by `creator`, not saved by anyone.
    pub fn new(
        title: String,
        description: String,
        address: String,
        location: Location,
        image: String,
        creator: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            address,
            location,
            image,
            creator,
            saved: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.creator == user_id
    }

    pub fn is_saved_by(&self, user_id: Uuid) -> bool {
        self.saved.contains(&user_id)
    }

    /// Record a back-reference. Returns false if it was already present.
    pub fn add_saver(&mut self, user_id: Uuid) -> bool {
        if self.is_saved_by(user_id) {
            return false;
        }
        self.saved.push(user_id);
        true
    }

    /// Drop a back-reference. Returns false if it was absent.
    pub fn remove_saver(&mut self, user_id: Uuid) -> bool {
        let before = self.saved.len();
        self.saved.retain(|id| *id != user_id);
        self.saved.len() != before
    }

    /// Replace the editable attributes.
    pub fn revise(&mut self, title: String, description: String, address: String, location: Location) {
        self.title = title;
        self.description = description;
        self.address = address;
        self.location = location;
        self.updated_at = Utc::now();
    }

    /// Copy the place as it looks right now.
    ///
    /// Later edits to the place do not reach copies already handed out.
    pub fn snapshot(&self) -> SavedPlace {
        SavedPlace {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            location: self.location,
            image: self.image.clone(),
            creator: self.creator,
            saved_at: Utc::now(),
        }
    }
}

/// Denormalized copy of a place stored on the saving user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    /// Id of the place this snapshot was taken from
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Location,
    pub image: String,
    pub creator: Uuid,
    pub saved_at: DateTime<Utc>,
}
