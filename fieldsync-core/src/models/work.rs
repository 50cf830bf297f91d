//! Work-tracking models: tasks, projects, appointments, time entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::{Metadata, impl_entity};
use crate::timestamp;

// ============================================================================
// Task
// ============================================================================

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    #[serde(alias = "Open")]
    Open,
    /// Being worked on.
    #[serde(alias = "In Progress")]
    InProgress,
    /// Waiting on something external.
    #[serde(alias = "Blocked")]
    Blocked,
    /// Finished.
    #[serde(alias = "Done")]
    Done,
}

impl TaskStatus {
    /// Returns the value stored by the backend for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
        }
    }
}

/// A unit of field work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Short description.
    pub title: String,
    /// Workflow state.
    #[serde(default)]
    pub status: TaskStatus,
    /// Owning project id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Assigned technician id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Due date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::iso8601_option"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Priority, higher is more urgent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

impl Task {
    /// Creates an open task with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(Task, EntityKind::Task);

// ============================================================================
// Project
// ============================================================================

/// A job grouping tasks for one customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Project name.
    pub name: String,
    /// Customer id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Free-form status label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Planned start.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::iso8601_option"
    )]
    pub start_date: Option<DateTime<Utc>>,
    /// Planned end.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::iso8601_option"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl_entity!(Project, EntityKind::Project);

// ============================================================================
// Appointment
// ============================================================================

/// A scheduled visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Calendar title.
    pub title: String,
    /// Visit start.
    #[serde(with = "timestamp::iso8601")]
    pub start_time: DateTime<Utc>,
    /// Visit end.
    #[serde(with = "timestamp::iso8601")]
    pub end_time: DateTime<Utc>,
    /// Related task id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Assigned technician id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    /// Location id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl_entity!(Appointment, EntityKind::Appointment);

// ============================================================================
// Time Entry
// ============================================================================

/// Time logged against a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Bookkeeping fields.
    #[serde(flatten)]
    pub meta: Metadata,
    /// Task id.
    pub task: String,
    /// Technician id.
    pub technician: String,
    /// Clock-in time.
    #[serde(with = "timestamp::iso8601")]
    pub started_at: DateTime<Utc>,
    /// Clock-out time; absent while the clock is running.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::iso8601_option"
    )]
    pub ended_at: Option<DateTime<Utc>>,
}

impl TimeEntry {
    /// Returns the logged duration in whole minutes, if the entry is closed.
    pub fn minutes(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_minutes().max(0))
    }
}

impl_entity!(TimeEntry, EntityKind::TimeEntry);
