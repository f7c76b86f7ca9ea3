//! Persistence for the set of already-notified entry identifiers.

mod seen;

pub use seen::{SeenStore, StoreError};
