use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::Role, db::user::User};

/// A password-free view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: ApiId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            full_name: user.user.full_name,
            email: user.user.email,
            role: user.user.role,
            created_at: user.user.created_at,
        }
    }
}

/// Body of `PATCH /users/<id>/role`.
///
/// Deserialisation rejects anything outside the three known roles.
#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The summary must be structurally incapable of leaking the hash.
    #[test]
    fn summary_omits_password_hash() {
        let user = User::example();
        let hash = user.password_hash.clone();
        let json = serde_json::to_string(&UserSummary::from(user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains(&hash));
    }

    #[test]
    fn unknown_role_rejected() {
        let result: Result<RoleUpdate, _> = serde_json::from_str(r#"{"role": "owner"}"#);
        assert!(result.is_err());
    }
}
