//! Scoped queries used across the app.
//!
//! Each function returns a [`ListQuery`] composed from the constraint
//! builder. Soft-deleted objects are excluded.

use chrono::{DateTime, Utc};
use fieldsync_core::models::DELETED_FIELD;
use fieldsync_core::{Constraint, Filter, TaskStatus};
use fieldsync_fetch::{ListQuery, SortOrder};

/// Excludes soft-deleted objects.
pub fn not_deleted() -> Constraint {
    Constraint::not_equal(DELETED_FIELD, true)
}

/// Tasks belonging to `project_id`, soonest due first.
pub fn tasks_for_project(project_id: &str) -> ListQuery {
    ListQuery::filtered(
        Filter::new()
            .with(Constraint::equals("project", project_id))
            .with(not_deleted()),
    )
    .sorted_by("due_date", SortOrder::Asc)
}

/// Unfinished tasks assigned to `technician_id`, soonest due first.
pub fn open_tasks_for_technician(technician_id: &str) -> ListQuery {
    let unfinished = [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Blocked]
        .iter()
        .map(TaskStatus::as_str);

    ListQuery::filtered(
        Filter::new()
            .with(Constraint::equals("assignee", technician_id))
            .with(Constraint::is_in("status", unfinished))
            .with(not_deleted()),
    )
    .sorted_by("due_date", SortOrder::Asc)
}

/// Appointments starting within `[start, end]`, in start order.
pub fn appointments_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> ListQuery {
    ListQuery::filtered(
        Filter::new()
            .with(Constraint::date_range("start_time", start, end))
            .with(not_deleted()),
    )
    .sorted_by("start_time", SortOrder::Asc)
}

/// Inventory held at `location_id`, by name.
pub fn inventory_at_location(location_id: &str) -> ListQuery {
    ListQuery::filtered(
        Filter::new()
            .with(Constraint::equals("location", location_id))
            .with(not_deleted()),
    )
    .sorted_by("name", SortOrder::Asc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn constraints(query: &ListQuery) -> Value {
        let request = query.to_request("obj/x", 0, 10).unwrap();
        serde_json::from_str(request.query_value("constraints").unwrap()).unwrap()
    }

    #[test]
    fn test_tasks_for_project() {
        let query = tasks_for_project("p7");
        assert_eq!(
            constraints(&query),
            json!([
                {"key": "project", "constraint_type": "equals", "value": "p7"},
                {"key": "deleted", "constraint_type": "not equal", "value": true}
            ])
        );
        assert_eq!(query.sort, Some(("due_date".to_string(), SortOrder::Asc)));
    }

    #[test]
    fn test_open_tasks_for_technician() {
        let value = constraints(&open_tasks_for_technician("tech1"));
        assert_eq!(
            value[1],
            json!({"key": "status", "constraint_type": "in", "value": ["open", "in_progress", "blocked"]})
        );
    }

    #[test]
    fn test_appointments_between() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let value = constraints(&appointments_between(&start, &end));
        assert_eq!(
            value[0],
            json!({
                "key": "start_time",
                "constraint_type": "is between",
                "value": ["2024-05-01T00:00:00.000Z", "2024-05-08T00:00:00.000Z"]
            })
        );
    }

    #[test]
    fn test_inventory_at_location() {
        let query = inventory_at_location("loc3");
        assert_eq!(constraints(&query)[0]["value"], "loc3");
        assert_eq!(query.sort, Some(("name".to_string(), SortOrder::Asc)));
    }
}
