//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and whatever holds the
//! data. They contain no business logic.
//!
//! - **memory**: process-local user store backed by a Tokio `RwLock`.

pub mod memory;
