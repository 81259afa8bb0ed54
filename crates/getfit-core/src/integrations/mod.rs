//! Contracts for the external collaborators: the identity provider and the
//! remote profile store. No network client lives here; hosts plug one in.

mod auth;
mod traits;

pub use auth::{validate_body_metric, AuthManager};
pub use traits::{IdentityProvider, ProfileStore, UserId};
