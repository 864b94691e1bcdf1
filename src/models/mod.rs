use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A configured IPTV source for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub stream_kind: String,
    pub priority: i32,
    pub should_filter: bool,
    pub refresh_period_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Xtream,
    M3u,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Xtream => "xtream",
            ProviderKind::M3u => "m3u",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "xtream" => Some(ProviderKind::Xtream),
            "m3u" => Some(ProviderKind::M3u),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A channel, VOD or series entry in a user's stream store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub stream_type: StreamType,
    pub is_active: bool,
    pub category: StreamCategory,
    pub channel_number: String,
    pub name: String,
    pub original_name: String,
    pub stream_url: String,
    pub tvg_id: Option<String>,
    pub tvg_group: Option<String>,
    pub tvg_logo: Option<String>,
    pub extras: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stream type codes carried in storage and in exported playlists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Live,
    Vod,
    Series,
}

impl StreamType {
    /// Numeric code used in storage and in the `tvg-type` playlist attribute
    pub fn code(&self) -> i64 {
        match self {
            StreamType::Live => 0,
            StreamType::Vod => 4,
            StreamType::Series => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StreamType::Live),
            4 => Some(StreamType::Vod),
            5 => Some(StreamType::Series),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(StreamType::Live),
            "vod" => Some(StreamType::Vod),
            "series" => Some(StreamType::Series),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Live => "live",
            StreamType::Vod => "vod",
            StreamType::Series => "series",
        }
    }
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Replaces the legacy Main/Other two-table split with a single mutable tag;
/// a "move" is one UPDATE on this field or on `stream_type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamCategory {
    Main,
    Other,
}

impl StreamCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamCategory::Main => "main",
            StreamCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "main" => Some(StreamCategory::Main),
            "other" => Some(StreamCategory::Other),
            _ => None,
        }
    }
}

/// A single user-configured inclusion/exclusion rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_active: bool,
    pub kind: FilterRuleKind,
    pub pattern: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five rule kinds, in evaluation precedence order.
///
/// `IncludeNameRegex` rules act as an allow-list when any are present;
/// the four exclude kinds are then checked in declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterRuleKind {
    IncludeNameRegex,
    ExcludeName,
    ExcludeNameRegex,
    ExcludeStreamRegex,
    ExcludeGroupRegex,
}

impl FilterRuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterRuleKind::IncludeNameRegex => "include_name_regex",
            FilterRuleKind::ExcludeName => "exclude_name",
            FilterRuleKind::ExcludeNameRegex => "exclude_name_regex",
            FilterRuleKind::ExcludeStreamRegex => "exclude_stream_regex",
            FilterRuleKind::ExcludeGroupRegex => "exclude_group_regex",
        }
    }

    /// Returns `None` for unrecognized kind text so callers can fail open
    /// on corrupt rows instead of aborting playlist generation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "include_name_regex" => Some(FilterRuleKind::IncludeNameRegex),
            "exclude_name" => Some(FilterRuleKind::ExcludeName),
            "exclude_name_regex" => Some(FilterRuleKind::ExcludeNameRegex),
            "exclude_stream_regex" => Some(FilterRuleKind::ExcludeStreamRegex),
            "exclude_group_regex" => Some(FilterRuleKind::ExcludeGroupRegex),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterRuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reconciliation record for a stream that disappeared from its provider's
/// current listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingStream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub stream_id: Option<Uuid>,
    pub name: String,
    pub first_seen_missing_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCreateRequest {
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub stream_kind: Option<String>,
    pub priority: Option<i32>,
    pub should_filter: Option<bool>,
    pub refresh_period_days: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUpdateRequest {
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub stream_kind: String,
    pub priority: i32,
    pub should_filter: bool,
    pub refresh_period_days: i32,
    pub is_active: bool,
}

/// Fields of a stream row as first written, before any user edits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStream {
    pub provider_id: Option<Uuid>,
    pub stream_type: StreamType,
    pub channel_number: String,
    pub name: String,
    pub original_name: String,
    pub stream_url: String,
    pub tvg_id: Option<String>,
    pub tvg_group: Option<String>,
    pub tvg_logo: Option<String>,
    pub extras: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdateRequest {
    pub channel_number: String,
    pub name: String,
    pub stream_url: String,
    pub tvg_id: Option<String>,
    pub tvg_group: Option<String>,
    pub tvg_logo: Option<String>,
    pub is_active: bool,
}

/// Body of a move operation; either field may be omitted to leave it as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMoveRequest {
    pub stream_type: Option<StreamType>,
    pub category: Option<StreamCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRuleCreateRequest {
    pub kind: FilterRuleKind,
    pub pattern: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRuleUpdateRequest {
    pub kind: FilterRuleKind,
    pub pattern: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamListRequest {
    pub stream_type: Option<String>,
    pub provider: Option<Uuid>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamListResponse {
    pub streams: Vec<Stream>,
    pub total_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Outcome of one provider refresh pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub fetched: usize,
    pub added: usize,
    pub deactivated: usize,
    pub reactivated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub summary: RefreshSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_type_codes_round_trip() {
        for ty in [StreamType::Live, StreamType::Vod, StreamType::Series] {
            assert_eq!(StreamType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(StreamType::from_code(3), None);
    }

    #[test]
    fn stream_type_names() {
        assert_eq!(StreamType::parse("live"), Some(StreamType::Live));
        assert_eq!(StreamType::parse("vod"), Some(StreamType::Vod));
        assert_eq!(StreamType::parse("series"), Some(StreamType::Series));
        assert_eq!(StreamType::parse("radio"), None);
    }

    #[test]
    fn filter_rule_kind_parse_rejects_unknown() {
        assert_eq!(
            FilterRuleKind::parse("exclude_name"),
            Some(FilterRuleKind::ExcludeName)
        );
        assert_eq!(FilterRuleKind::parse("exclude_everything"), None);
    }

    #[test]
    fn provider_kind_round_trip() {
        for kind in [ProviderKind::Xtream, ProviderKind::M3u] {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
    }
}
