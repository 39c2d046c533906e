/// Offsec Program - Timeline event model.
///
/// Append-only narrative entries on an engagement; removed only via the
/// engagement cascade.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::timeline_events;

/// Timeline event database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = timeline_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimelineEvent {
    pub id: i32,
    pub engagement_id: i32,
    pub user_id: Option<i32>,
    pub event_type: String,
    pub summary: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New timeline event for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = timeline_events)]
pub struct NewTimelineEvent {
    pub engagement_id: i32,
    pub user_id: Option<i32>,
    pub event_type: String,
    pub summary: String,
    pub details: Option<String>,
}

/// Timeline event creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateTimelineEventRequest {
    #[validate(length(min = 1, max = 50))]
    pub event_type: String,
    #[validate(length(min = 1, max = 255))]
    pub summary: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_timeline_event_request_valid() {
        use validator::Validate;
        let request = CreateTimelineEventRequest {
            event_type: "milestone".to_string(),
            summary: "Initial access obtained".to_string(),
            details: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_timeline_event_request_empty_summary() {
        use validator::Validate;
        let request = CreateTimelineEventRequest {
            event_type: "milestone".to_string(),
            summary: "".to_string(),
            details: None,
        };
        assert!(request.validate().is_err());
    }
}
