//! Reduction of raw GitHub pull-request objects to the fields the
//! aggregator consumes.
//!
//! Normalization is a pure one-to-one mapping: records are never filtered
//! by state, and a pull request counts as merged exactly when `merged_at`
//! is present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login GitHub substitutes for deleted accounts.
pub const GHOST_LOGIN: &str = "ghost";

/// Author block of a raw pull-request object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
pub struct RawUser
{
    /// Account login.
    pub login:      String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
}

/// Subset of the GitHub pull-request object read from list pages.
///
/// Unknown fields are ignored so the full API payload deserializes directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
pub struct RawPullRequest
{
    /// Author, `null` when the account was deleted.
    #[serde(default)]
    pub user:       Option<RawUser,>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc,>,
    /// Merge timestamp, absent for unmerged pull requests.
    #[serde(default)]
    pub merged_at:  Option<DateTime<Utc,>,>,
    /// Close timestamp, absent for open pull requests.
    #[serde(default)]
    pub closed_at:  Option<DateTime<Utc,>,>,
}

/// Reduced pull-request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPullRequest
{
    /// Author login.
    pub username:   String,
    /// Author avatar URL.
    pub avatar_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc,>,
    /// Merge timestamp.
    pub merged_at:  Option<DateTime<Utc,>,>,
    /// Close timestamp.
    pub closed_at:  Option<DateTime<Utc,>,>,
}

impl NormalizedPullRequest
{
    /// Whether the pull request was merged.
    pub fn is_merged(&self,) -> bool
    {
        self.merged_at.is_some()
    }
}

impl From<RawPullRequest,> for NormalizedPullRequest
{
    fn from(raw: RawPullRequest,) -> Self
    {
        let (username, avatar_url,) = match raw.user {
            Some(user,) => (user.login, user.avatar_url,),
            None => (GHOST_LOGIN.to_owned(), String::new(),),
        };

        Self {
            username,
            avatar_url,
            created_at: raw.created_at,
            merged_at: raw.merged_at,
            closed_at: raw.closed_at,
        }
    }
}

/// Normalizes every record, preserving order.
pub fn normalize_all(records: Vec<RawPullRequest,>,) -> Vec<NormalizedPullRequest,>
{
    records.into_iter().map(NormalizedPullRequest::from,).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    const PAYLOAD: &str = r#"[
        {
            "id": 1,
            "number": 42,
            "state": "closed",
            "user": {"login": "alice", "avatar_url": "https://avatars.example/alice", "type": "User"},
            "created_at": "2024-03-02T10:00:00Z",
            "merged_at": "2024-03-03T09:30:00Z",
            "closed_at": "2024-03-03T09:30:00Z"
        },
        {
            "id": 2,
            "state": "open",
            "user": null,
            "created_at": "2024-02-27T08:00:00Z",
            "merged_at": null,
            "closed_at": null
        }
    ]"#;

    #[test]
    fn deserializes_api_payload_and_keeps_every_state()
    {
        let raw: Vec<RawPullRequest,> = serde_json::from_str(PAYLOAD,).expect("valid payload",);
        let normalized = normalize_all(raw,);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].username, "alice");
        assert_eq!(normalized[0].avatar_url, "https://avatars.example/alice");
        assert!(normalized[0].is_merged());
        assert!(!normalized[1].is_merged());
    }

    #[test]
    fn deleted_author_maps_to_ghost()
    {
        let raw: Vec<RawPullRequest,> = serde_json::from_str(PAYLOAD,).expect("valid payload",);
        let normalized = normalize_all(raw,);

        assert_eq!(normalized[1].username, GHOST_LOGIN);
        assert!(normalized[1].avatar_url.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys()
    {
        let raw: Vec<RawPullRequest,> = serde_json::from_str(PAYLOAD,).expect("valid payload",);
        let json = serde_json::to_value(&normalize_all(raw,)[0],).expect("serializable",);

        assert_eq!(json["username"], "alice");
        assert_eq!(json["avatarUrl"], "https://avatars.example/alice");
        assert_eq!(json["createdAt"], "2024-03-02T10:00:00Z");
        assert_eq!(json["mergedAt"], "2024-03-03T09:30:00Z");
        assert_eq!(json["closedAt"], "2024-03-03T09:30:00Z");
    }
}
