//! Data models for the persisted session.
//!
//! - `SessionData`: access token plus the signed-in user
//! - `User`: profile of the signed-in user

pub mod session_data;
pub mod user;

pub use session_data::SessionData;
pub use user::User;
