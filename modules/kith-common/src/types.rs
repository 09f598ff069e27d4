use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Tenant root ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// --- People ---

/// A contact within a workspace. Every person belongs to exactly one
/// workspace; (workspace_id, email) is unique when email is non-null.
/// Email is stored normalized (trimmed, lowercased).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub relationship_type: Option<String>,
    pub relationship_strength: Option<i32>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub next_followup_at: Option<DateTime<Utc>>,
    /// Free-form key/value data. Keys are unique; values are arbitrary JSON.
    pub custom_data: serde_json::Map<String, serde_json::Value>,
    /// Which imports/integrations produced this person ("csv", "google", ...).
    pub sources: Vec<String>,
    /// External system -> external id.
    pub source_ids: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Link rows ---

/// Person-to-company association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyLink {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub person_id: Uuid,
    pub company_id: Uuid,
    pub role: Option<String>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagLink {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub person_id: Uuid,
    pub tag_id: Uuid,
}

/// Person's participation in an interaction (call, meeting, email thread).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLink {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub interaction_id: Uuid,
    pub person_id: Uuid,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub person_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialProfile {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub person_id: Uuid,
    pub platform: String,
    pub url: String,
}

// --- Duplicate candidates ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Pending,
    Dismissed,
    Merged,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Dismissed => "dismissed",
            CandidateStatus::Merged => "merged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CandidateStatus::Pending),
            "dismissed" => Some(CandidateStatus::Dismissed),
            "merged" => Some(CandidateStatus::Merged),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed duplicate pairing as stored. `person_a` and `person_b` are
/// held in canonical order (a < b) so each unordered pair has exactly one
/// representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub person_a: Uuid,
    pub person_b: Uuid,
    pub confidence: f64,
    pub reason: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
}

/// A pending candidate joined with both endpoints' display fields, as
/// returned to the review UI.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCandidate {
    pub id: Uuid,
    pub person_a: Uuid,
    pub person_a_name: String,
    pub person_a_email: Option<String>,
    pub person_b: Uuid,
    pub person_b_name: String,
    pub person_b_email: Option<String>,
    pub confidence: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Matcher output: one proposed pair with its score and explanation.
/// Construction canonicalizes the id order.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub person_a: Uuid,
    pub person_b: Uuid,
    pub confidence: f64,
    pub reason: String,
}

impl CandidatePair {
    pub fn new(a: Uuid, b: Uuid, confidence: f64, reason: impl Into<String>) -> Self {
        let (person_a, person_b) = if a < b { (a, b) } else { (b, a) };
        Self {
            person_a,
            person_b,
            confidence,
            reason: reason.into(),
        }
    }

    /// The canonical pair key used for deduplication across matchers.
    pub fn key(&self) -> (Uuid, Uuid) {
        (self.person_a, self.person_b)
    }
}

// --- Operation results ---

/// Counts from one duplicate scan over a workspace.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanStats {
    /// Unique candidate pairs written.
    pub total: u32,
    /// Pairs contributed by the deterministic matcher.
    pub exact: u32,
    /// Pairs contributed by the fuzzy matcher (after pair dedup).
    pub fuzzy: u32,
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} candidates ({} exact, {} fuzzy)",
            self.total, self.exact, self.fuzzy
        )
    }
}

/// Result of a successful merge: the surviving person and how many rows
/// each dependent table contributed.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub keep_id: Uuid,
    pub moved: BTreeMap<String, u64>,
}
