//! sessionkeeper-core - session credential persistence on the OS keychain.
//!
//! This crate provides:
//! - `SecureItem`: typed records in a secure store, with create-or-update saves
//! - `SessionManager`: a lazily created, resettable session store
//! - `Session`: login check, save, logout and read for the app session
//! - `KeyringStore` / `MemoryStore`: secure store backends
//!
//! Data flows `Session` -> `SessionManager` -> `SecureItem` -> `SecureStore`.

pub mod backend;
pub mod config;
pub mod error;
pub mod item;
pub mod manager;
pub mod models;
pub mod query;
pub mod session;
pub mod settings;

pub use backend::{KeyringStore, MemoryStore, SecureStore, Status};
pub use config::{KeychainConfig, ServiceRole};
pub use error::StoreError;
pub use item::SecureItem;
pub use manager::{SessionInstance, SessionManager};
pub use models::{SessionData, User};
pub use query::{ItemClass, Query};
pub use session::Session;
pub use settings::{FileSettings, MemorySettings, Settings};
