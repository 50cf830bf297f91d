//! People and organization models: customers, technicians, teams.

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::{Metadata, impl_entity};

/// A customer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Customer or company name.
    pub name: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Billing address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl_entity!(Customer, EntityKind::Customer);

/// A field technician.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Full name.
    pub name: String,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Team id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Whether the technician can be scheduled.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl_entity!(Technician, EntityKind::Technician);

/// A group of technicians.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Team name.
    pub name: String,
    /// Technician ids.
    #[serde(default)]
    pub members: Vec<String>,
}

impl_entity!(Team, EntityKind::Team);
