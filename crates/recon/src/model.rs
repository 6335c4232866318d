use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::normalize::{
    clean_contact, clean_identifier, clean_name, format_cents, full_name, parse_amount_cents,
};
use crate::registry::RegistryScope;

// ---------------------------------------------------------------------------
// Registry input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Open,
    Closed,
    Unknown,
    Other(String),
}

impl MemberStatus {
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        match t.to_ascii_lowercase().as_str() {
            "" | "nan" => Self::Unknown,
            "open" | "active" => Self::Open,
            "closed" | "inactive" => Self::Closed,
            _ => Self::Other(t.to_string()),
        }
    }
}

/// Raw fields of one registry member, as read from the dump.
#[derive(Debug, Clone, Default)]
pub struct MemberFields {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub scheme_id: String,
    pub employer: String,
    pub scheme_type: String,
    pub national_id: String,
    pub ssn: String,
    pub contact: String,
    pub status: String,
}

/// One authoritative registry entry with its comparison forms precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRecord {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub scheme_id: String,
    pub employer: String,
    pub scheme_type: String,
    pub national_id: String,
    pub ssn: String,
    pub contact: Option<u64>,
    pub status: MemberStatus,
    pub clean_name: String,
}

impl MemberRecord {
    pub fn new(fields: MemberFields) -> Self {
        let clean_name = full_name(&fields.first_name, &fields.middle_name, &fields.last_name);
        Self {
            clean_name,
            scheme_id: clean_identifier(&fields.scheme_id),
            national_id: clean_identifier(&fields.national_id),
            ssn: clean_identifier(&fields.ssn),
            contact: clean_contact(&fields.contact),
            status: MemberStatus::parse(&fields.status),
            employer: fields.employer.trim().to_string(),
            scheme_type: fields.scheme_type.trim().to_string(),
            first_name: fields.first_name,
            middle_name: fields.middle_name,
            last_name: fields.last_name,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == MemberStatus::Closed
    }
}

// ---------------------------------------------------------------------------
// Schedule input
// ---------------------------------------------------------------------------

/// One submitted schedule row, fields exactly as they appeared in the upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleRecord {
    /// 1-based position in the submitted batch.
    pub row_number: usize,
    pub ssn: String,
    pub national_id: String,
    pub contact: String,
    pub scheme_id: String,
    pub member_name: String,
    pub salary: String,
    pub contribution: String,
}

/// Comparison forms of a [`ScheduleRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSchedule {
    pub clean_name: String,
    pub national_id: String,
    pub ssn: String,
    pub contact: Option<u64>,
    pub scheme_id: String,
    pub salary_cents: Option<i64>,
    pub contribution_cents: Option<i64>,
}

impl NormalizedSchedule {
    pub fn from_record(record: &ScheduleRecord) -> Self {
        Self {
            clean_name: clean_name(&record.member_name),
            national_id: clean_identifier(&record.national_id),
            ssn: clean_identifier(&record.ssn),
            contact: clean_contact(&record.contact),
            scheme_id: clean_identifier(&record.scheme_id),
            salary_cents: parse_amount_cents(&record.salary),
            contribution_cents: parse_amount_cents(&record.contribution),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How a registry entry was found for a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    SchemeId,
    NationalId,
    Ssn,
    Contact,
    FuzzyName,
}

impl MatchMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SchemeId => "scheme ID",
            Self::NationalId => "Ghana Card",
            Self::Ssn => "SSNIT",
            Self::Contact => "contact",
            Self::FuzzyName => "fuzzy name",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemeId => write!(f, "scheme_id"),
            Self::NationalId => write!(f, "national_id"),
            Self::Ssn => write!(f, "ssn"),
            Self::Contact => write!(f, "contact"),
            Self::FuzzyName => write!(f, "fuzzy_name"),
        }
    }
}

/// A registry entry accepted for a schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMatch {
    pub method: MatchMethod,
    pub scheme_id: String,
    pub member_name: String,
    pub score: u8,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// One finding about a schedule row. Rendered tags are joined into the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusTag {
    MissingAmount,
    SalaryOutOfRange { min_cents: i64, max_cents: i64 },
    IncorrectContribution { expected_cents: i64 },
    SchemeConfirmed,
    SchemeAssignedToOther,
    SchemeNotFound,
    SchemeAutoFilled { method: MatchMethod },
    SchemeFuzzyFilled,
    Unregistered,
}

impl StatusTag {
    /// Stable machine key, used for summary counts.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MissingAmount => "missing_amount",
            Self::SalaryOutOfRange { .. } => "salary_out_of_range",
            Self::IncorrectContribution { .. } => "incorrect_contribution",
            Self::SchemeConfirmed => "scheme_confirmed",
            Self::SchemeAssignedToOther => "scheme_assigned_to_other",
            Self::SchemeNotFound => "scheme_not_found",
            Self::SchemeAutoFilled { .. } => "scheme_auto_filled",
            Self::SchemeFuzzyFilled => "scheme_fuzzy_filled",
            Self::Unregistered => "unregistered",
        }
    }

    /// Severity prefix for the exported schedule. A trailing `*` marks rows
    /// that need a reviewer's attention.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::MissingAmount
            | Self::SalaryOutOfRange { .. }
            | Self::IncorrectContribution { .. }
            | Self::SchemeAssignedToOther
            | Self::SchemeNotFound => "❌ *",
            Self::SchemeConfirmed => "✅ ",
            Self::SchemeAutoFilled { .. } => "✅ *",
            Self::SchemeFuzzyFilled => "🚫 *",
            Self::Unregistered => "🟡 *",
        }
    }

    pub fn is_business_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingAmount | Self::SalaryOutOfRange { .. } | Self::IncorrectContribution { .. }
        )
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAmount => write!(f, "Missing salary or contribution"),
            Self::SalaryOutOfRange { min_cents, max_cents } => write!(
                f,
                "Invalid salary range (min sal: {}, max sal: {})",
                format_cents(*min_cents),
                format_cents(*max_cents)
            ),
            Self::IncorrectContribution { expected_cents } => write!(
                f,
                "Incorrect Tier2 contribution (expected {})",
                format_cents(*expected_cents)
            ),
            Self::SchemeConfirmed => write!(f, "Valid scheme number & name match"),
            Self::SchemeAssignedToOther => write!(f, "Scheme number assigned to different member"),
            Self::SchemeNotFound => write!(f, "Scheme number not found in system"),
            Self::SchemeAutoFilled { method } => {
                write!(f, "Scheme number auto-filled ({} match)", method.label())
            }
            Self::SchemeFuzzyFilled => write!(f, "Scheme number populated via fuzzy name search"),
            Self::Unregistered => write!(f, "Unregistered member"),
        }
    }
}

pub const STATUS_SEPARATOR: &str = "; ";

pub fn join_status(tags: &[StatusTag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(STATUS_SEPARATOR)
}

/// Status text with each tag's severity marker, as written to the exported
/// schedule.
pub fn join_marked_status(tags: &[StatusTag]) -> String {
    tags.iter()
        .map(|tag| format!("{}{tag}", tag.marker()))
        .collect::<Vec<_>>()
        .join(STATUS_SEPARATOR)
}

/// Overall classification of a reconciled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    AutoCorrected,
    FuzzyCorrected,
    Mismatched,
    Unregistered,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::AutoCorrected => write!(f, "auto_corrected"),
            Self::FuzzyCorrected => write!(f, "fuzzy_corrected"),
            Self::Mismatched => write!(f, "mismatched"),
            Self::Unregistered => write!(f, "unregistered"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconciledRow {
    pub row_number: usize,
    pub national_id: String,
    pub ssn: String,
    pub contact: String,
    pub member_name: String,
    pub salary: String,
    pub contribution: String,
    pub submitted_scheme_id: String,
    pub resolved_scheme_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contribution_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_contribution_cents: Option<i64>,
    pub tags: Vec<StatusTag>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_method: Option<MatchMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    pub verdict: Verdict,
}

impl ReconciledRow {
    pub fn scheme_id_changed(&self) -> bool {
        self.resolved_scheme_id != self.submitted_scheme_id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_rows: usize,
    pub valid: usize,
    pub auto_corrected: usize,
    pub fuzzy_corrected: usize,
    pub mismatched: usize,
    pub unregistered: usize,
    pub rejected: usize,
    pub scheme_ids_filled: usize,
    pub tag_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    /// Employer / scheme-type selection, when the views came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<RegistryScope>,
    pub scoped_members: usize,
    pub scheme_members: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<ReconciledRow>,
}
