//! User search and administration.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{EmailRequest, null_as_default, percentage};
use crate::gateway::{Gateway, GatewayError, GatewayResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<User>,
}

/// Client-side narrowing of search results. All enabled flags must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub admins_only: bool,
    pub blocked_only: bool,
    pub active_only: bool,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        (!self.admins_only || user.is_admin)
            && (!self.blocked_only || user.is_blocked)
            && (!self.active_only || user.is_active)
    }

    pub fn apply(&self, users: Vec<User>) -> Vec<User> {
        users.into_iter().filter(|u| self.matches(u)).collect()
    }
}

/// Aggregate user counters for the statistics dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub blocked_users: u64,
    pub admin_users: u64,
    pub users_with_phone: u64,
    pub users_without_phone: u64,
    pub users_with_location: u64,
    pub users_without_location: u64,
}

impl UserStats {
    /// Share of `value` among all users.
    pub fn share(&self, value: u64) -> u64 {
        percentage(value, self.total_users)
    }
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    data: UserStats,
}

/// Searches users by free text; blank queries are rejected before any request.
pub async fn search(
    gateway: &Gateway,
    query: &str,
    filter: UserFilter,
) -> anyhow::Result<Vec<User>> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Please enter a search query");
    }

    let response: SearchResponse = gateway
        .get_json_with_query("/users/search", &[("query", query)])
        .await?;
    Ok(filter.apply(response.data))
}

pub async fn block(gateway: &Gateway, email: &str) -> GatewayResult<StatusCode> {
    gateway
        .post_empty("/users/block", &EmailRequest { email })
        .await
}

pub async fn unblock(gateway: &Gateway, email: &str) -> GatewayResult<StatusCode> {
    gateway
        .post_empty("/users/unlock", &EmailRequest { email })
        .await
}

pub async fn promote_to_admin(gateway: &Gateway, email: &str) -> GatewayResult<StatusCode> {
    gateway
        .post_empty("/users/admin", &EmailRequest { email })
        .await
}

pub async fn stats(gateway: &Gateway) -> GatewayResult<UserStats> {
    let response: StatsResponse = gateway.get_json("/users/admin/stats").await?;
    Ok(response.data)
}

/// Operator-facing message for a failed user action.
pub fn action_failure_message(action: UserAction, err: &GatewayError) -> String {
    match (action, err.status()) {
        (UserAction::Block, Some(400)) => "This user is already blocked.".to_string(),
        (UserAction::Unblock, Some(400)) => "This user is not blocked.".to_string(),
        (UserAction::Promote, Some(400)) => "This user is already an admin.".to_string(),
        (_, Some(404)) => "User not found.".to_string(),
        _ => err
            .server_message()
            .unwrap_or_else(|| format!("Failed to {} user. Please try again.", action.verb())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Block,
    Unblock,
    Promote,
}

impl UserAction {
    pub fn verb(self) -> &'static str {
        match self {
            UserAction::Block => "block",
            UserAction::Unblock => "unblock",
            UserAction::Promote => "promote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool, is_blocked: bool, is_active: bool) -> User {
        User {
            uid: "u".to_string(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            latitude: None,
            longitude: None,
            is_active,
            is_blocked,
            is_admin,
        }
    }

    #[test]
    fn test_default_filter_keeps_everyone() {
        let users = vec![user(false, false, false), user(true, true, true)];
        assert_eq!(UserFilter::default().apply(users).len(), 2);
    }

    #[test]
    fn test_filters_combine() {
        let users = vec![
            user(true, false, true),
            user(true, true, true),
            user(false, true, true),
            user(true, true, false),
        ];
        let filter = UserFilter {
            admins_only: true,
            blocked_only: true,
            active_only: true,
        };

        let kept = filter.apply(users);
        assert_eq!(kept, vec![user(true, true, true)]);
    }

    #[test]
    fn test_search_response_accepts_null_data() {
        let response: SearchResponse = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_action_failure_messages() {
        let already = GatewayError::from_status(400, "");
        assert_eq!(
            action_failure_message(UserAction::Block, &already),
            "This user is already blocked."
        );

        let missing = GatewayError::from_status(404, "");
        assert_eq!(
            action_failure_message(UserAction::Promote, &missing),
            "User not found."
        );

        let server = GatewayError::from_status(500, r#"{"message":"db down"}"#);
        assert_eq!(action_failure_message(UserAction::Unblock, &server), "db down");

        let bare = GatewayError::from_status(500, "");
        assert_eq!(
            action_failure_message(UserAction::Unblock, &bare),
            "Failed to unblock user. Please try again."
        );
    }

    #[test]
    fn test_stats_share() {
        let stats = UserStats {
            total_users: 8,
            blocked_users: 2,
            ..UserStats::default()
        };
        assert_eq!(stats.share(stats.blocked_users), 25);
    }
}
