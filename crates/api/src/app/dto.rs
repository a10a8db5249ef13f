use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reportdesk_auth::PermissionSet;
use reportdesk_core::{DomainError, GroupId, UserId};
use reportdesk_directory::{User, UserProfile};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
    /// Accepted for compatibility; administrative resets do not check it.
    #[serde(default)]
    pub current_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub user_id: UserId,
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignQuery {
    pub assigned_to: UserId,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Option<UserId>,
    pub username: String,
    pub permissions: Vec<String>,
}

/// A user as shown to clients. The password hash has no field here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub groups: Vec<GroupId>,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_fired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            groups: user.groups.into_iter().collect(),
            profile: user.profile,
            is_fired: user.is_fired,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub fn users_to_views(users: Vec<User>) -> Vec<UserView> {
    users.into_iter().map(UserView::from).collect()
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, turning any rejection into the 400 envelope.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|rejection| errors::bad_request(rejection.body_text()))
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| errors::bad_request(rejection.body_text()))
}

/// Parse a path segment into a numeric id.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use reportdesk_core::ReportId;

    #[test]
    fn user_view_never_carries_the_hash() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let user = User {
            id: UserId::new(3),
            username: "clerk".into(),
            password_hash: "$argon2id$secret".into(),
            groups: [GroupId::new(2)].into_iter().collect(),
            profile: UserProfile {
                last_name: Some("Doe".into()),
                ..Default::default()
            },
            is_fired: false,
            created_at: t,
            updated_at: t,
        };

        let json = serde_json::to_value(UserView::from(user)).unwrap();
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["groups"], serde_json::json!([2]));
        assert_eq!(json["isFired"], false);
    }

    #[test]
    fn bad_path_ids_are_400() {
        assert_eq!(parse_id::<ReportId>("12").unwrap(), ReportId::new(12));
        assert_eq!(parse_id::<ReportId>("abc").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_id::<ReportId>("0").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_permissions_fail_group_creation_bodies() {
        let ok: CreateGroupRequest =
            serde_json::from_value(serde_json::json!({ "name": "Intake", "permissions": ["ViewReport"] })).unwrap();
        assert_eq!(ok.permissions.len(), 1);

        let bad = serde_json::from_value::<CreateGroupRequest>(
            serde_json::json!({ "name": "Intake", "permissions": ["ManageUser Groups"] }),
        );
        assert!(bad.is_err());
    }
}
