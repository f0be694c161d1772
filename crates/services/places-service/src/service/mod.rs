//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod auth_service;
mod consistency;
pub mod container;
mod place_service;
pub mod requests;
mod user_service;

// Service Container
pub use container::{Collaborators, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use consistency::{ConsistencyManager, ConsistencyService};
pub use place_service::{PlaceManager, PlaceService};
pub use user_service::{UserManager, UserService};

pub use requests::{CreatePlaceRequest, LoginRequest, SignupRequest, UpdatePlaceRequest};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
