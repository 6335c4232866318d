use crate::config::{ContributionPolicy, ReconConfig};
use crate::model::{NormalizedSchedule, StatusTag};

/// Outcome of the amount checks for one row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BusinessCheck {
    pub tags: Vec<StatusTag>,
    /// Expected contribution, when the salary was present.
    pub expected_cents: Option<i64>,
    /// Missing amounts end the row here; identity resolution is skipped.
    pub terminal: bool,
}

/// `salary_cents × rate_bps / 10_000`, rounded half away from zero.
pub fn expected_contribution_cents(salary_cents: i64, rate_bps: u32) -> i64 {
    let scaled = i128::from(salary_cents) * i128::from(rate_bps);
    let half = if scaled < 0 { -5_000 } else { 5_000 };
    ((scaled + half) / 10_000) as i64
}

fn contribution_check_applies(config: &ReconConfig, scheme_id: &str) -> bool {
    match config.contribution.policy {
        ContributionPolicy::Always => true,
        ContributionPolicy::MarkedSchemes => scheme_id
            .to_lowercase()
            .contains(&config.contribution.scheme_marker.trim().to_lowercase()),
    }
}

/// Salary bounds and statutory contribution recomputation.
pub fn check_amounts(row: &NormalizedSchedule, config: &ReconConfig) -> BusinessCheck {
    let (Some(salary), Some(reported)) = (row.salary_cents, row.contribution_cents) else {
        return BusinessCheck {
            tags: vec![StatusTag::MissingAmount],
            expected_cents: row
                .salary_cents
                .map(|s| expected_contribution_cents(s, config.contribution.rate_bps)),
            terminal: true,
        };
    };

    let mut tags = Vec::new();

    if !config.salary.contains(salary) {
        tags.push(StatusTag::SalaryOutOfRange {
            min_cents: config.salary.min_cents,
            max_cents: config.salary.max_cents,
        });
    }

    let expected = expected_contribution_cents(salary, config.contribution.rate_bps);
    if contribution_check_applies(config, &row.scheme_id)
        && (i128::from(reported) - i128::from(expected)).abs()
            > i128::from(config.contribution.tolerance_cents)
    {
        tags.push(StatusTag::IncorrectContribution {
            expected_cents: expected,
        });
    }

    BusinessCheck {
        tags,
        expected_cents: Some(expected),
        terminal: false,
    }
}
