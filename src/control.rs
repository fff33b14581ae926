// 🛡️ Control Model - Canonical schema for compliance control records
// One schema, one keying strategy: identity is the `id` UUID, labels are
// canonical strings parsed strictly at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// NIST FUNCTION
// ============================================================================

/// Top-level NIST Cybersecurity Framework function.
///
/// Each function has a canonical label ("Govern"), a short code ("GV") used
/// as the grouping key in charts, and a combined display label ("Govern (GV)").
/// Parsing accepts all three forms case-insensitively; anything else is
/// rejected so that only canonical values ever reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NistFunction {
    Govern,
    Identify,
    Protect,
    Detect,
    Respond,
    Recover,
}

/// Fixed framework order, used for zero-filled chart series.
pub const ALL_FUNCTIONS: [NistFunction; 6] = [
    NistFunction::Govern,
    NistFunction::Identify,
    NistFunction::Protect,
    NistFunction::Detect,
    NistFunction::Respond,
    NistFunction::Recover,
];

impl NistFunction {
    pub fn label(&self) -> &'static str {
        match self {
            NistFunction::Govern => "Govern",
            NistFunction::Identify => "Identify",
            NistFunction::Protect => "Protect",
            NistFunction::Detect => "Detect",
            NistFunction::Respond => "Respond",
            NistFunction::Recover => "Recover",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NistFunction::Govern => "GV",
            NistFunction::Identify => "ID",
            NistFunction::Protect => "PR",
            NistFunction::Detect => "DE",
            NistFunction::Respond => "RS",
            NistFunction::Recover => "RC",
        }
    }

    /// Display label with the short code, e.g. "Govern (GV)".
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.label(), self.code())
    }

    /// Parse a function from any accepted form: canonical label, short code,
    /// or combined "Label (CODE)". Case-insensitive, whitespace-trimmed.
    pub fn parse(input: &str) -> Option<NistFunction> {
        let normalized = input.trim().to_lowercase();
        for func in ALL_FUNCTIONS {
            if normalized == func.label().to_lowercase()
                || normalized == func.code().to_lowercase()
                || normalized == func.display_label().to_lowercase()
            {
                return Some(func);
            }
        }
        None
    }
}

impl fmt::Display for NistFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for NistFunction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NistFunction::parse(&value)
            .ok_or_else(|| format!("unknown NIST function: {:?}", value))
    }
}

impl From<NistFunction> for String {
    fn from(func: NistFunction) -> String {
        func.label().to_string()
    }
}

// ============================================================================
// ASSESSMENT PRIORITY
// ============================================================================

/// Assessment priority of a control, with a risk weight used for the
/// domain risk ranking (High counts 3x, Medium 2x, Low 1x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssessmentPriority {
    High,
    Medium,
    Low,
}

pub const ALL_PRIORITIES: [AssessmentPriority; 3] = [
    AssessmentPriority::High,
    AssessmentPriority::Medium,
    AssessmentPriority::Low,
];

impl AssessmentPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentPriority::High => "High",
            AssessmentPriority::Medium => "Medium",
            AssessmentPriority::Low => "Low",
        }
    }

    pub fn risk_weight(&self) -> u64 {
        match self {
            AssessmentPriority::High => 3,
            AssessmentPriority::Medium => 2,
            AssessmentPriority::Low => 1,
        }
    }

    pub fn parse(input: &str) -> Option<AssessmentPriority> {
        let normalized = input.trim().to_lowercase();
        ALL_PRIORITIES
            .into_iter()
            .find(|p| normalized == p.as_str().to_lowercase())
    }
}

impl fmt::Display for AssessmentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssessmentPriority {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AssessmentPriority::parse(&value)
            .ok_or_else(|| format!("unknown assessment priority: {:?}", value))
    }
}

impl From<AssessmentPriority> for String {
    fn from(priority: AssessmentPriority) -> String {
        priority.as_str().to_string()
    }
}

// ============================================================================
// MEETS CRITERIA
// ============================================================================

/// Compliance flag: does the control currently meet its criteria?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MeetsCriteria {
    Yes,
    No,
}

impl MeetsCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetsCriteria::Yes => "Yes",
            MeetsCriteria::No => "No",
        }
    }

    pub fn is_compliant(&self) -> bool {
        matches!(self, MeetsCriteria::Yes)
    }

    pub fn parse(input: &str) -> Option<MeetsCriteria> {
        match input.trim().to_lowercase().as_str() {
            "yes" => Some(MeetsCriteria::Yes),
            "no" => Some(MeetsCriteria::No),
            _ => None,
        }
    }
}

impl fmt::Display for MeetsCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MeetsCriteria {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MeetsCriteria::parse(&value)
            .ok_or_else(|| format!("unknown meets-criteria flag: {:?}", value))
    }
}

impl From<MeetsCriteria> for String {
    fn from(flag: MeetsCriteria) -> String {
        flag.as_str().to_string()
    }
}

// ============================================================================
// REMEDIATION STATUS
// ============================================================================

/// Workflow state of fixing a non-compliant control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RemediationStatus {
    NotStarted,
    InProgress,
    Completed,
}

pub const ALL_STATUSES: [RemediationStatus; 3] = [
    RemediationStatus::NotStarted,
    RemediationStatus::InProgress,
    RemediationStatus::Completed,
];

impl RemediationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemediationStatus::NotStarted => "Not Started",
            RemediationStatus::InProgress => "In Progress",
            RemediationStatus::Completed => "Completed",
        }
    }

    pub fn parse(input: &str) -> Option<RemediationStatus> {
        let normalized = input.trim().to_lowercase();
        ALL_STATUSES
            .into_iter()
            .find(|s| normalized == s.as_str().to_lowercase())
    }
}

impl fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RemediationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RemediationStatus::parse(&value)
            .ok_or_else(|| format!("unknown remediation status: {:?}", value))
    }
}

impl From<RemediationStatus> for String {
    fn from(status: RemediationStatus) -> String {
        status.as_str().to_string()
    }
}

// ============================================================================
// CONTROL RECORD
// ============================================================================

/// A single trackable compliance requirement record.
///
/// Serde renames match the CSV export columns, so the same derives drive
/// both the JSON API and the tabular import/export boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Stable identity (UUID). Assigned by the store when empty.
    #[serde(rename = "Control_ID", default)]
    pub id: String,

    #[serde(rename = "Owner")]
    pub owner: String,

    #[serde(rename = "NIST_Function")]
    pub nist_function: NistFunction,

    #[serde(rename = "NIST_Category_ID")]
    pub nist_category_id: String,

    #[serde(rename = "NIST_SubCategory_ID")]
    pub nist_sub_category_id: String,

    #[serde(rename = "Assessment_Priority")]
    pub assessment_priority: AssessmentPriority,

    #[serde(rename = "Control_Description")]
    pub control_description: String,

    #[serde(rename = "Identified_Risks")]
    pub identified_risks: String,

    #[serde(rename = "Risk_Details")]
    pub risk_details: String,

    #[serde(rename = "Cybersecurity_Domain")]
    pub cybersecurity_domain: String,

    #[serde(rename = "Meets_Criteria")]
    pub meets_criteria: MeetsCriteria,

    #[serde(rename = "Remediation_Status")]
    pub remediation_status: RemediationStatus,

    /// When the control was last assessed or touched by a user.
    #[serde(rename = "Last_Updated")]
    pub last_updated: DateTime<Utc>,

    /// Store-managed creation timestamp.
    #[serde(rename = "Created_At", default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Store-managed modification timestamp.
    #[serde(rename = "Updated_At", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Control {
    /// Assign a fresh UUID if this record has none yet.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.meets_criteria.is_compliant()
    }
}

// ============================================================================
// TESTS
// ============================================================================
