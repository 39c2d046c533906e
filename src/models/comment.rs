/// Offsec Program - Comment model.
///
/// A comment belongs to exactly one of an engagement or a finding (both FKs
/// are nullable; the write paths only ever set one) and always has an
/// authoring user. Append-only; removed via the parent cascade.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::comments;

/// Comment database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub engagement_id: Option<i32>,
    pub finding_id: Option<i32>,
    pub user_id: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// New comment for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub engagement_id: Option<i32>,
    pub finding_id: Option<i32>,
    pub user_id: i32,
    pub text: String,
}

/// Comment creation request.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_comment_request_rejects_empty_text() {
        use validator::Validate;
        let request = CreateCommentRequest {
            text: "".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
