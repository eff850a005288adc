//! Namespaced uniqueness actors.
//!
//! Each namespace is served by one [`actor::UniquenessActor`] task that
//! applies lock commands strictly one at a time. [`LockRegistry`] spawns
//! actors on first use of a namespace and implements
//! [`salereg_core::lock::LockActor`] on top of them.

pub mod actor;
pub mod memory;
pub mod registry;

pub use actor::{ActorHandle, UniquenessActor};
pub use memory::MemoryLockStorage;
pub use registry::{LockRegistry, DEFAULT_MAILBOX_CAPACITY};
