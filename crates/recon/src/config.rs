use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub salary: SalaryBounds,
    #[serde(default)]
    pub contribution: ContributionRule,
    #[serde(default)]
    pub scheme_id: SchemeIdFormat,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "Tier-2 schedule validation".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            thresholds: Thresholds::default(),
            salary: SalaryBounds::default(),
            contribution: ContributionRule::default(),
            scheme_id: SchemeIdFormat::default(),
            registry: RegistryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Name-similarity thresholds on the 0..=100 scale.
///
/// `strict` gates every fallback (secondary identifier or fuzzy name).
/// `loose` gates the sanity check on a direct scheme-ID hit, where the
/// scheme ID itself is the primary evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default = "default_threshold")]
    pub strict: u8,
    #[serde(default = "default_threshold")]
    pub loose: u8,
}

fn default_threshold() -> u8 {
    50
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strict: default_threshold(),
            loose: default_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Salary + contribution
// ---------------------------------------------------------------------------

/// Inclusive salary bounds in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SalaryBounds {
    #[serde(default = "default_min_salary")]
    pub min_cents: i64,
    #[serde(default = "default_max_salary")]
    pub max_cents: i64,
}

fn default_min_salary() -> i64 {
    53_980
}

fn default_max_salary() -> i64 {
    6_100_000
}

impl Default for SalaryBounds {
    fn default() -> Self {
        Self {
            min_cents: default_min_salary(),
            max_cents: default_max_salary(),
        }
    }
}

impl SalaryBounds {
    pub fn contains(&self, salary_cents: i64) -> bool {
        (self.min_cents..=self.max_cents).contains(&salary_cents)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionRule {
    /// Statutory rate in basis points (500 = 5%).
    #[serde(default = "default_rate_bps")]
    pub rate_bps: u32,
    /// Allowed absolute deviation between reported and expected, in minor units.
    #[serde(default = "default_tolerance_cents")]
    pub tolerance_cents: i64,
    #[serde(default)]
    pub policy: ContributionPolicy,
    /// Substring that marks a scheme ID as subject to the check under
    /// `ContributionPolicy::MarkedSchemes`. Matched case-insensitively.
    #[serde(default = "default_scheme_marker")]
    pub scheme_marker: String,
}

fn default_rate_bps() -> u32 {
    500
}

fn default_tolerance_cents() -> i64 {
    50
}

fn default_scheme_marker() -> String {
    "ops".into()
}

impl Default for ContributionRule {
    fn default() -> Self {
        Self {
            rate_bps: default_rate_bps(),
            tolerance_cents: default_tolerance_cents(),
            policy: ContributionPolicy::default(),
            scheme_marker: default_scheme_marker(),
        }
    }
}

/// Which rows the contribution recomputation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionPolicy {
    #[default]
    Always,
    MarkedSchemes,
}

// ---------------------------------------------------------------------------
// Scheme ID format
// ---------------------------------------------------------------------------

/// Shape of a scheme ID issued by this registry's numbering scheme.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeIdFormat {
    #[serde(default = "default_scheme_length")]
    pub length: usize,
    #[serde(default = "default_scheme_prefix")]
    pub prefix: String,
}

fn default_scheme_length() -> usize {
    13
}

fn default_scheme_prefix() -> String {
    "1010".into()
}

impl Default for SchemeIdFormat {
    fn default() -> Self {
        Self {
            length: default_scheme_length(),
            prefix: default_scheme_prefix(),
        }
    }
}

impl SchemeIdFormat {
    /// `scheme_id` must already be normalized.
    pub fn is_well_formed(&self, scheme_id: &str) -> bool {
        !scheme_id.is_empty()
            && scheme_id.chars().count() == self.length
            && scheme_id.starts_with(&self.prefix)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Keep members whose lifecycle status is closed in both views.
    #[serde(default = "default_true")]
    pub include_closed: bool,
    #[serde(default)]
    pub columns: RegistryColumns,
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_closed: true,
            columns: RegistryColumns::default(),
        }
    }
}

/// Header names of the registry dump, one per member field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryColumns {
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

impl Default for RegistryColumns {
    fn default() -> Self {
        Self {
            first_name: "First name".into(),
            middle_name: "[Middle name]".into(),
            last_name: "[Last name]".into(),
            scheme_id: "[Scheme number]".into(),
            employer: "Group name".into(),
            scheme_type: "[Scheme name]".into(),
            national_id: "Id number".into(),
            ssn: "S s n i t".into(),
            contact: "Mobile".into(),
            status: "Status".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    StatusThenName,
    NameThenStatus,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (label, value) in [
            ("thresholds.strict", self.thresholds.strict),
            ("thresholds.loose", self.thresholds.loose),
        ] {
            if value > 100 {
                return Err(ReconError::ConfigValidation(format!(
                    "{label} must be within 0..=100, got {value}"
                )));
            }
        }

        if self.salary.min_cents < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "salary.min_cents must not be negative, got {}",
                self.salary.min_cents
            )));
        }
        if self.salary.min_cents > self.salary.max_cents {
            return Err(ReconError::ConfigValidation(format!(
                "salary.min_cents ({}) exceeds salary.max_cents ({})",
                self.salary.min_cents, self.salary.max_cents
            )));
        }

        if self.contribution.rate_bps == 0 || self.contribution.rate_bps > 10_000 {
            return Err(ReconError::ConfigValidation(format!(
                "contribution.rate_bps must be within 1..=10000, got {}",
                self.contribution.rate_bps
            )));
        }
        if self.contribution.tolerance_cents < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "contribution.tolerance_cents must not be negative, got {}",
                self.contribution.tolerance_cents
            )));
        }
        if self.contribution.policy == ContributionPolicy::MarkedSchemes
            && self.contribution.scheme_marker.trim().is_empty()
        {
            return Err(ReconError::ConfigValidation(
                "contribution.scheme_marker is required when policy = \"marked_schemes\"".into(),
            ));
        }

        if self.scheme_id.length == 0 {
            return Err(ReconError::ConfigValidation(
                "scheme_id.length must be at least 1".into(),
            ));
        }
        if self.scheme_id.prefix.chars().count() > self.scheme_id.length {
            return Err(ReconError::ConfigValidation(format!(
                "scheme_id.prefix '{}' is longer than scheme_id.length ({})",
                self.scheme_id.prefix, self.scheme_id.length
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
