//! User records for one application, in wire form and in list form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use super::format::DateFormatter;

/// Free-form key/value profile as stored by Userbase.
pub type Profile = BTreeMap<String, String>;

/// A user as returned by `GET /admin/list-app-users`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppUserItem {
    pub user_id: String,
    pub username: String,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_profile: Option<Profile>,
}

/// Response of `GET /admin/list-app-users`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListAppUsersResponse {
    pub app_id: String,
    #[serde(default)]
    pub users: Vec<AppUserItem>,
}

/// Body of `POST /admin/delete-user` and `POST /admin/permanent-delete-user`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionRequest<'a> {
    pub user_id: &'a str,
    pub app_name: &'a str,
    pub username: &'a str,
}

/// Body of `POST /admin/delete-app`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAppRequest<'a> {
    pub app_name: &'a str,
}

/// The busy flag: which destructive call, if any, is in flight for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingOperation {
    #[default]
    None,
    Deleting,
    PermanentlyDeleting,
}

impl PendingOperation {
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A user as held by [`super::AppUsersState`].
///
/// Identity, name, dates and payloads never change after load. `deleted`,
/// `pending_operation`, `display_metadata_expanded` and `last_error` are only
/// changed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    user_id: Ustr,
    username: String,
    creation_date: DateTime<Utc>,
    formatted_creation_date: String,
    email: Option<String>,
    profile: Option<Profile>,
    protected_profile: Option<Profile>,

    pub(super) deleted: bool,
    pub(super) display_metadata_expanded: bool,
    pub(super) pending_operation: PendingOperation,
    /// Message of the last failed action on this record, until the next one starts.
    pub(super) last_error: Option<String>,
}

impl UserRecord {
    pub fn from_item(item: AppUserItem, formatter: &dyn DateFormatter) -> Self {
        let AppUserItem {
            user_id,
            username,
            creation_date,
            deleted,
            email,
            profile,
            protected_profile,
        } = item;

        Self {
            user_id: Ustr::from(user_id.as_str()),
            username,
            creation_date,
            formatted_creation_date: formatter.format_date(creation_date),
            email,
            profile,
            protected_profile,
            deleted,
            display_metadata_expanded: false,
            pending_operation: PendingOperation::None,
            last_error: None,
        }
    }

    pub fn user_id(&self) -> Ustr {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    pub fn formatted_creation_date(&self) -> &str {
        &self.formatted_creation_date
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn protected_profile(&self) -> Option<&Profile> {
        self.protected_profile.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_metadata_expanded(&self) -> bool {
        self.display_metadata_expanded
    }

    pub fn pending_operation(&self) -> PendingOperation {
        self.pending_operation
    }

    pub fn is_busy(&self) -> bool {
        self.pending_operation.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_admin_api_shape() {
        let body = serde_json::json!({
            "appId": "app-1",
            "users": [
                {
                    "userId": "u1",
                    "username": "alice",
                    "creationDate": "2020-01-05T15:04:00.000Z",
                    "email": "alice@example.com",
                    "profile": { "plan": "pro" }
                },
                {
                    "userId": "u2",
                    "username": "bob",
                    "creationDate": "2020-01-04T10:00:00Z",
                    "deleted": true
                }
            ]
        });

        let response: ListAppUsersResponse =
            serde_json::from_value(body).expect("admin api body should parse");

        assert_eq!(response.app_id, "app-1");
        assert_eq!(response.users.len(), 2);
        assert!(!response.users[0].deleted);
        assert_eq!(response.users[0].email.as_deref(), Some("alice@example.com"));
        assert_eq!(
            response.users[0]
                .profile
                .as_ref()
                .and_then(|p| p.get("plan"))
                .map(String::as_str),
            Some("pro")
        );
        assert!(response.users[1].deleted);
        assert!(response.users[1].protected_profile.is_none());
    }

    #[test]
    fn missing_users_field_means_empty() {
        let response: ListAppUsersResponse =
            serde_json::from_value(serde_json::json!({ "appId": "app-1" }))
                .expect("body without users should parse");
        assert!(response.users.is_empty());
    }

    #[test]
    fn user_action_request_is_camel_case() {
        let body = serde_json::to_value(UserActionRequest {
            user_id: "u1",
            app_name: "demo",
            username: "alice",
        })
        .expect("serializable");

        assert_eq!(
            body,
            serde_json::json!({ "userId": "u1", "appName": "demo", "username": "alice" })
        );
    }

    #[test]
    fn from_item_formats_once_and_starts_idle() {
        let item = AppUserItem {
            user_id: "u1".to_owned(),
            username: "alice".to_owned(),
            creation_date: DateTime::from_timestamp(60, 0).expect("valid timestamp"),
            deleted: true,
            email: None,
            profile: None,
            protected_profile: None,
        };
        let formatter = |ts: DateTime<Utc>| format!("t={}", ts.timestamp());

        let record = UserRecord::from_item(item, &formatter);

        assert_eq!(record.user_id(), Ustr::from("u1"));
        assert_eq!(record.formatted_creation_date(), "t=60");
        assert!(record.is_deleted());
        assert!(!record.is_busy());
        assert!(!record.is_metadata_expanded());
    }
}
