//! Record models: notes, attachments, invoices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::{Metadata, impl_entity};
use crate::timestamp;

/// A free-form note attached to another object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Note text.
    pub body: String,
    /// Id of the object this note belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Author technician id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl_entity!(Note, EntityKind::Note);

/// An uploaded file or photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Original file name.
    pub file_name: String,
    /// Download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Id of the object this file belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl_entity!(Attachment, EntityKind::Attachment);

/// A billing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Human-facing invoice number.
    pub number: String,
    /// Customer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Project id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Total amount.
    #[serde(default)]
    pub total: f64,
    /// Issue date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::iso8601_option"
    )]
    pub issued_date: Option<DateTime<Utc>>,
    /// Whether the invoice has been paid.
    #[serde(default)]
    pub paid: bool,
}

impl_entity!(Invoice, EntityKind::Invoice);
