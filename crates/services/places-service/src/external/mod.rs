//! External collaborators: geocoding, password hashing, tokens and image files.

mod blob_store;
mod geocoder;
mod hasher;
mod token;

pub use blob_store::{discard_images, BlobStore, LocalBlobStore};
pub use geocoder::{Geocoder, MapboxGeocoder};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use token::{Claims, JwtIssuer, TokenIssuer};

#[cfg(any(test, feature = "test-utils"))]
pub use blob_store::MockBlobStore;
#[cfg(any(test, feature = "test-utils"))]
pub use geocoder::MockGeocoder;
#[cfg(any(test, feature = "test-utils"))]
pub use hasher::MockPasswordHasher;
#[cfg(any(test, feature = "test-utils"))]
pub use token::MockTokenIssuer;
