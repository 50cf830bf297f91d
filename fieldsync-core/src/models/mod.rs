//! Domain models for `FieldSync`.
//!
//! Every backend object carries the same bookkeeping fields, grouped in
//! [`Metadata`] and flattened into each model. Field names are the
//! normalized (lower snake case) form of the backend's keys; the decoder in
//! `fieldsync-fetch` normalizes incoming keys before these types see them.
//!
//! ## Submodules
//!
//! - [`kind`] - Entity kinds and the [`Entity`] trait
//! - [`work`] - Tasks, projects, appointments, time entries
//! - [`people`] - Customers, technicians, teams
//! - [`inventory`] - Inventory items and locations
//! - [`records`] - Notes, attachments, invoices

pub mod inventory;
pub mod kind;
pub mod people;
pub mod records;
pub mod work;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

// Re-export everything at the models level
pub use inventory::{InventoryItem, Location};
pub use kind::{DELETED_FIELD, Entity, EntityKind};
pub use people::{Customer, Team, Technician};
pub use records::{Attachment, Invoice, Note};
pub use work::{Appointment, Project, Task, TaskStatus, TimeEntry};

#[cfg(test)]
mod serde_tests;

// ============================================================================
// Metadata
// ============================================================================

/// Bookkeeping fields shared by every backend object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Server-assigned identifier. Absent until created.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time, assigned by the server.
    #[serde(default, skip_serializing, with = "timestamp::iso8601_option")]
    pub created_date: Option<DateTime<Utc>>,
    /// Last modification time, assigned by the server.
    #[serde(default, skip_serializing, with = "timestamp::iso8601_option")]
    pub modified_date: Option<DateTime<Utc>>,
    /// Soft-deletion marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

/// Implements [`Entity`] for a model with a flattened `meta` field.
macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl $crate::models::kind::Entity for $ty {
            const KIND: $crate::models::kind::EntityKind = $kind;

            fn id(&self) -> Option<&str> {
                self.meta.id.as_deref()
            }

            fn set_id(&mut self, id: String) {
                self.meta.id = Some(id);
            }
        }
    };
}

pub(crate) use impl_entity;
