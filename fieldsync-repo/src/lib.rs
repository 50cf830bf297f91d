// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # FieldSync Repository
//!
//! Entity operations for the FieldSync backend, written against the
//! [`Execute`](fieldsync_fetch::Execute) trait so any executor (the real
//! [`SyncClient`](fieldsync_fetch::SyncClient) or a test double) can run them.
//!
//! - [`Repository`] - get, list, list-all, create, patch, soft and hard
//!   delete by [`EntityKind`](fieldsync_core::EntityKind), plus workflows
//! - [`Collection`] - the same operations typed by entity model
//! - [`PatchSet`] - validated partial updates
//! - [`queries`] - scoped queries shared across screens
//! - [`user_message`] - short messages for classified errors

pub mod collection;
pub mod message;
pub mod patch;
pub mod queries;
pub mod repository;

#[cfg(test)]
mod testing;

pub use collection::Collection;
pub use message::user_message;
pub use patch::{PatchSet, PatchSetBuilder};
pub use repository::{Created, Repository};
