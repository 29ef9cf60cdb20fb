// eveng-api: Async Rust client for the EVE-NG REST API (session cookie auth)

pub mod envelope;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod variant;

mod auth;
mod folders;
mod labs;
mod networks;
mod nodes;
mod system;
mod users;

pub use envelope::Envelope;
pub use error::Error;
pub use session::{SESSION_COOKIE, Session, SessionConfig};
pub use transport::{TlsMode, TransportConfig};
