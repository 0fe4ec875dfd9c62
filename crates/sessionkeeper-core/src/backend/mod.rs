//! Secure credential store backends.
//!
//! This module provides:
//! - `SecureStore`: the lookup/add/update/delete contract a platform store fulfils
//! - `MemoryStore`: an in-process store with keychain matching rules
//! - `KeyringStore`: the OS credential store via the `keyring` crate
//!
//! Every operation reports failure as a keychain-style `Status` code. Callers
//! only tell apart success, `ITEM_NOT_FOUND` and everything else.

pub mod memory;
pub mod platform;

use std::fmt;

use crate::query::{Attributes, Query};

pub use memory::MemoryStore;
pub use platform::KeyringStore;

/// Status code returned by a secure store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const SUCCESS: Status = Status(0);
    pub const ITEM_NOT_FOUND: Status = Status(-25300);
    pub const DUPLICATE_ITEM: Status = Status(-25299);
    pub const PARAM: Status = Status(-50);
    pub const INTERACTION_NOT_ALLOWED: Status = Status(-25308);
    pub const PLATFORM_FAILURE: Status = Status(-1);
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Status::SUCCESS => "success",
            Status::ITEM_NOT_FOUND => "item not found",
            Status::DUPLICATE_ITEM => "duplicate item",
            Status::PARAM => "invalid parameter",
            Status::INTERACTION_NOT_ALLOWED => "interaction not allowed",
            Status::PLATFORM_FAILURE => "platform failure",
            _ => "unrecognized status",
        };
        write!(f, "{} ({})", name, self.0)
    }
}

/// Result of a single-match lookup. Fields are filled according to the
/// query's `return_attributes` and `return_data` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub attributes: Option<Attributes>,
    pub data: Option<Vec<u8>>,
}

/// A platform secure store addressed by query descriptors.
///
/// Implementations must be `Send + Sync` so a single store can back the
/// process-wide session manager. `Err` never carries `Status::SUCCESS`.
pub trait SecureStore: Send + Sync {
    /// Look up the first record matching `query`.
    fn copy_matching(&self, query: &Query) -> Result<Match, Status>;

    /// Add a new record identified by `query` holding `data`.
    fn add(&self, query: &Query, data: &[u8]) -> Result<(), Status>;

    /// Replace the payload of every record matching `query`.
    fn update(&self, query: &Query, data: &[u8]) -> Result<(), Status>;

    /// Delete every record matching `query`.
    fn delete(&self, query: &Query) -> Result<(), Status>;
}
