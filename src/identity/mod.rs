//! Session persistence, role resolution and screen routing for the signed-in user.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;
mod store;
mod context;
pub mod claims;
pub mod authorizer;

pub use principal::Principal;
pub use session::{Session, SessionToken};
pub use provider::{accept_authentication, Gender, LoginRequest, RegisterRequest};
pub use store::{FileBackend, KvBackend, MemoryBackend, SessionStore, StoreError, TOKEN_KEY, USER_KEY};
pub use context::SessionContext;
pub use claims::{decode_payload, resolve_roles, RoleSet, TokenClaims};
pub use authorizer::{dashboard_for, route, Role, Screen};

pub(crate) use provider::failure_message;
pub(crate) use session::{lenient_opt_string, lenient_string};
