//! Entity kinds and the [`Entity`] trait.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Field set to `true` by a soft delete.
pub const DELETED_FIELD: &str = "deleted";

// ============================================================================
// Entity Kind
// ============================================================================

/// Object types stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A unit of field work.
    Task,
    /// A job grouping tasks for one customer.
    Project,
    /// A customer account.
    Customer,
    /// A scheduled visit.
    Appointment,
    /// A stock item.
    InventoryItem,
    /// A site or storage location.
    Location,
    /// A field technician.
    Technician,
    /// A group of technicians.
    Team,
    /// A free-form note.
    Note,
    /// An uploaded file or photo.
    Attachment,
    /// Time logged against a task.
    TimeEntry,
    /// A billing document.
    Invoice,
}

impl EntityKind {
    /// Returns the display name for this kind, as the backend names the type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Project => "Project",
            Self::Customer => "Customer",
            Self::Appointment => "Appointment",
            Self::InventoryItem => "Inventory Item",
            Self::Location => "Location",
            Self::Technician => "Technician",
            Self::Team => "Team",
            Self::Note => "Note",
            Self::Attachment => "Attachment",
            Self::TimeEntry => "Time Entry",
            Self::Invoice => "Invoice",
        }
    }

    /// Returns all entity kinds.
    pub fn all() -> &'static [EntityKind] {
        &[
            Self::Task,
            Self::Project,
            Self::Customer,
            Self::Appointment,
            Self::InventoryItem,
            Self::Location,
            Self::Technician,
            Self::Team,
            Self::Note,
            Self::Attachment,
            Self::TimeEntry,
            Self::Invoice,
        ]
    }

    /// Returns the endpoint segment: the display name lower-cased with
    /// whitespace stripped (`Inventory Item` becomes `inventoryitem`).
    pub fn path_segment(&self) -> String {
        segment_of(self.display_name())
    }

    /// Returns the collection path, `obj/{segment}`.
    pub fn collection_path(&self) -> String {
        format!("obj/{}", self.path_segment())
    }

    /// Returns the single-object path, `obj/{segment}/{id}`.
    pub fn object_path(&self, id: &str) -> String {
        format!("obj/{}/{}", self.path_segment(), id)
    }
}

fn segment_of(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    /// Accepts the display name, the path segment, or the snake-case name,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = segment_of(&s.replace('_', ""));
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.path_segment() == wanted)
            .ok_or_else(|| CoreError::UnknownEntityKind(s.to_string()))
    }
}

// ============================================================================
// Entity Trait
// ============================================================================

/// A typed model stored as one backend object.
///
/// Implementors serialize to the payload sent on create and deserialize from
/// the normalized (snake-case) form of the backend's response.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The kind this model is stored as.
    const KIND: EntityKind;

    /// Returns the server-assigned identifier, if the object has been created.
    fn id(&self) -> Option<&str>;

    /// Records the server-assigned identifier after a create.
    fn set_id(&mut self, id: String);
}
