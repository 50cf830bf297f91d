//! Inventory models: stock items and the locations that hold them.

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::{Metadata, impl_entity};

/// A stock item held at a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Item name.
    pub name: String,
    /// Stock-keeping unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Units on hand. Negative values mean back-ordered.
    #[serde(default)]
    pub quantity: i64,
    /// Location id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Cost per unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
}

impl InventoryItem {
    /// Returns true if no units are on hand.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }
}

impl_entity!(InventoryItem, EntityKind::InventoryItem);

/// A site or storage location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Location name.
    pub name: String,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Latitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl_entity!(Location, EntityKind::Location);
