// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `FieldSync` Core
//!
//! Core types, models, and filter expressions for the `FieldSync` data-sync
//! client.
//!
//! This crate has no I/O. It provides:
//!
//! - Entity kinds and their endpoint segments
//! - Typed entity models and the [`Entity`] trait
//! - The constraint builder used to scope collection queries
//! - Timestamp helpers for the backend's ISO-8601 format
//!
//! ## Key Types
//!
//! ### Entities
//! - [`EntityKind`] - Enum of every object type the backend stores
//! - [`Entity`] - Trait tying a model struct to its kind and identifier
//! - [`Task`], [`Project`], [`Customer`], [`Appointment`], ... - Typed models
//!
//! ### Filtering
//! - [`Constraint`] - Leaf comparison or AND/OR combinator
//! - [`ConstraintType`] - Comparison operators understood by the backend
//! - [`Filter`] - Top-level list of constraints sent as the `constraints` parameter

pub mod constraint;
pub mod error;
pub mod models;
pub mod timestamp;

// Re-export error types
pub use error::CoreError;

// Re-export constraint types
pub use constraint::{Combinator, Constraint, ConstraintType, Filter, Leaf};

// Re-export all model types
pub use models::{
    // Kinds & traits
    Entity,
    EntityKind,
    // Work
    Appointment,
    Project,
    Task,
    TaskStatus,
    TimeEntry,
    // People
    Customer,
    Team,
    Technician,
    // Inventory
    InventoryItem,
    Location,
    // Records
    Attachment,
    Invoice,
    Note,
};
