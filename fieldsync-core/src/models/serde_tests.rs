//! Serde tests for the entity models.
//!
//! Inputs use the normalized (snake-case) keys the decoder hands to models.

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::{
    Appointment, Entity, EntityKind, InventoryItem, Invoice, Task, TaskStatus, Team, Technician,
    TimeEntry,
};

// ============================================================================
// EntityKind Serde Tests
// ============================================================================

#[test]
fn test_entity_kind_serde_roundtrip_all_variants() {
    for kind in EntityKind::all() {
        let json = serde_json::to_string(kind).unwrap();
        let deserialized: EntityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(*kind, deserialized, "Round-trip failed for {:?}", kind);
    }
}

#[test]
fn test_entity_kind_snake_case() {
    assert_eq!(
        serde_json::to_string(&EntityKind::InventoryItem).unwrap(),
        r#""inventory_item""#
    );
}

// ============================================================================
// Model Serde Tests
// ============================================================================

#[test]
fn test_task_from_backend_object() {
    let task: Task = serde_json::from_value(json!({
        "_id": "1700000000x1",
        "title": "Replace filter",
        "status": "In Progress",
        "project": "1700000000x9",
        "due_date": "2024-06-01T09:00:00.000Z",
        "created_date": "2024-05-01T12:00:00.000Z",
        "modified_date": "2024-05-02T12:00:00.000Z",
        "unknown_field": 42
    }))
    .unwrap();

    assert_eq!(task.id(), Some("1700000000x1"));
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(
        task.due_date,
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
    );
    assert!(task.meta.created_date.is_some());
    assert!(!task.meta.deleted);
}

#[test]
fn test_create_payload_omits_server_fields() {
    let mut task = Task::new("Inspect boiler");
    task.meta.created_date = Some(Utc::now());
    task.priority = Some(3);

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(
        value,
        json!({"title": "Inspect boiler", "status": "open", "priority": 3})
    );
}

#[test]
fn test_set_id_is_serialized() {
    let mut task = Task::new("Inspect boiler");
    task.set_id("abc".to_string());

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["_id"], "abc");
}

#[test]
fn test_appointment_requires_times() {
    let result: Result<Appointment, _> = serde_json::from_value(json!({
        "_id": "a1",
        "title": "Site visit"
    }));
    assert!(result.is_err());
}

#[test]
fn test_time_entry_minutes() {
    let entry: TimeEntry = serde_json::from_value(json!({
        "task": "t1",
        "technician": "u1",
        "started_at": "2024-05-01T08:00:00.000Z",
        "ended_at": "2024-05-01T09:30:00.000Z"
    }))
    .unwrap();
    assert_eq!(entry.minutes(), Some(90));
}

#[test]
fn test_defaults_for_missing_fields() {
    let tech: Technician = serde_json::from_value(json!({"name": "Ada"})).unwrap();
    assert!(tech.active);

    let team: Team = serde_json::from_value(json!({"name": "North"})).unwrap();
    assert!(team.members.is_empty());

    let item: InventoryItem = serde_json::from_value(json!({"name": "Valve"})).unwrap();
    assert!(item.is_out_of_stock());

    let invoice: Invoice =
        serde_json::from_value(json!({"number": "INV-7", "deleted": true})).unwrap();
    assert!(invoice.meta.deleted);
    assert!(!invoice.paid);
}

#[test]
fn test_entity_kinds_are_wired() {
    assert_eq!(Task::KIND, EntityKind::Task);
    assert_eq!(InventoryItem::KIND, EntityKind::InventoryItem);
    assert_eq!(TimeEntry::KIND, EntityKind::TimeEntry);
}
