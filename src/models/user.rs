/// Offsec Program - User model.
///
/// Users carry a role and a long-lived API key used as their credential.
/// The API key is never serialized in list/detail responses; it is only
/// returned once, at generation time.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::users;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Red,
    Blue,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Strict parse; unknown values are rejected at the boundary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// User database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role_enum(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// New user for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub api_key: Option<String>,
}

/// User response without sensitive fields.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: &str) -> User {
        User {
            id: 1,
            username: "malcolm".to_string(),
            full_name: Some("Malcolm Green".to_string()),
            email: Some("malcolm@example.com".to_string()),
            role: role.to_string(),
            api_key: Some("secret-key".to_string()),
            created_at: Utc::now(),
        }
    }

    // ==================== UserRole Tests ====================

    #[test]
    fn test_user_role_parse_valid() {
        assert_eq!(UserRole::parse("red"), Some(UserRole::Red));
        assert_eq!(UserRole::parse("blue"), Some(UserRole::Blue));
        assert_eq!(UserRole::parse("manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
    }

    #[test]
    fn test_user_role_parse_invalid() {
        assert_eq!(UserRole::parse("purple"), None);
        assert_eq!(UserRole::parse("Admin"), None); // case sensitive
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in [
            UserRole::Red,
            UserRole::Blue,
            UserRole::Manager,
            UserRole::Admin,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    // ==================== User Method Tests ====================

    #[test]
    fn test_is_admin() {
        assert!(test_user("admin").is_admin());
        assert!(!test_user("red").is_admin());
        assert!(!test_user("manager").is_admin());
    }

    #[test]
    fn test_role_enum() {
        assert_eq!(test_user("blue").role_enum(), Some(UserRole::Blue));
        assert_eq!(test_user("bogus").role_enum(), None);
    }

    // ==================== UserResponse Tests ====================

    #[test]
    fn test_user_response_omits_api_key() {
        let response = UserResponse::from(test_user("red"));
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(!json.contains("secret-key"));
        assert!(!json.contains("api_key"));
        assert!(json.contains("malcolm"));
    }
}
