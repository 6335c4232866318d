//! Identity resolution: find the registry entry behind a schedule row.
//!
//! Order of evidence:
//! 1. the submitted scheme ID (direct, checked against the loose threshold),
//! 2. national ID, SSN, contact (exact lookups, strict threshold),
//! 3. fuzzy name search in the employer-scoped view (strict threshold).
//!
//! Fallbacks are plain functions in [`FALLBACK_CHAIN`]; the first one that
//! returns a match wins.

use log::debug;

use crate::config::{ReconConfig, Thresholds};
use crate::model::{MatchMethod, MemberRecord, NormalizedSchedule, ResolvedMatch};
use crate::registry::RegistryViews;
use crate::similarity::{best_match, token_sort_ratio};

/// What the submitted scheme ID said about the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectCheck {
    /// Blank or not in this registry's numbering format.
    Skipped,
    Confirmed,
    /// The scheme ID exists but the name does not fit its owner.
    AssignedToOther { score: u8 },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub direct: DirectCheck,
    pub matched: Option<ResolvedMatch>,
}

impl Resolution {
    /// A fallback produced the match, so the row's scheme ID must be replaced.
    pub fn is_fallback(&self) -> bool {
        self.matched
            .as_ref()
            .is_some_and(|m| m.method != MatchMethod::SchemeId)
    }
}

pub type FallbackStrategy =
    fn(&NormalizedSchedule, &RegistryViews, &Thresholds) -> Option<ResolvedMatch>;

/// Fallback strategies in priority order.
pub const FALLBACK_CHAIN: [FallbackStrategy; 4] =
    [by_national_id, by_ssn, by_contact, by_fuzzy_name];

/// Run `chain` in order, stopping at the first accepted match.
pub fn first_success(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    thresholds: &Thresholds,
    chain: &[FallbackStrategy],
) -> Option<ResolvedMatch> {
    chain.iter().find_map(|strategy| strategy(row, views, thresholds))
}

/// Name confirmation shared by every strategy. Empty names never match.
fn confirm(
    row: &NormalizedSchedule,
    member: &MemberRecord,
    threshold: u8,
    method: MatchMethod,
) -> Option<ResolvedMatch> {
    if row.clean_name.is_empty() || member.clean_name.is_empty() {
        return None;
    }
    let score = token_sort_ratio(&row.clean_name, &member.clean_name);
    if score < threshold {
        debug!(
            "{method}: '{}' vs '{}' scored {score} < {threshold}",
            row.clean_name, member.clean_name
        );
        return None;
    }
    Some(ResolvedMatch {
        method,
        scheme_id: member.scheme_id.clone(),
        member_name: member.clean_name.clone(),
        score,
    })
}

/// Fallbacks only accept members that carry a scheme ID to fill in.
fn confirm_fallback(
    row: &NormalizedSchedule,
    member: Option<&MemberRecord>,
    thresholds: &Thresholds,
    method: MatchMethod,
) -> Option<ResolvedMatch> {
    let member = member.filter(|m| !m.scheme_id.is_empty())?;
    confirm(row, member, thresholds.strict, method)
}

pub fn by_national_id(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    thresholds: &Thresholds,
) -> Option<ResolvedMatch> {
    if row.national_id.is_empty() {
        return None;
    }
    let member = views.scheme_wide.by_national_id(&row.national_id);
    confirm_fallback(row, member, thresholds, MatchMethod::NationalId)
}

pub fn by_ssn(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    thresholds: &Thresholds,
) -> Option<ResolvedMatch> {
    if row.ssn.is_empty() {
        return None;
    }
    let member = views.scheme_wide.by_ssn(&row.ssn);
    confirm_fallback(row, member, thresholds, MatchMethod::Ssn)
}

pub fn by_contact(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    thresholds: &Thresholds,
) -> Option<ResolvedMatch> {
    let contact = row.contact?;
    let member = views.scheme_wide.by_contact(contact);
    confirm_fallback(row, member, thresholds, MatchMethod::Contact)
}

/// Best name in the employer-scoped view. No identifier corroborates it.
pub fn by_fuzzy_name(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    thresholds: &Thresholds,
) -> Option<ResolvedMatch> {
    let members = views.scoped.members();
    let candidates = members.iter().map(|m| {
        if m.scheme_id.is_empty() {
            ""
        } else {
            m.clean_name.as_str()
        }
    });
    let (idx, score) = best_match(&row.clean_name, candidates)?;
    if score < thresholds.strict {
        debug!(
            "fuzzy_name: best for '{}' is '{}' at {score} < {}",
            row.clean_name, members[idx].clean_name, thresholds.strict
        );
        return None;
    }
    let member = &members[idx];
    Some(ResolvedMatch {
        method: MatchMethod::FuzzyName,
        scheme_id: member.scheme_id.clone(),
        member_name: member.clean_name.clone(),
        score,
    })
}

/// Look the submitted scheme ID up in the scheme-wide view.
pub fn direct_match(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    config: &ReconConfig,
) -> (DirectCheck, Option<ResolvedMatch>) {
    if !config.scheme_id.is_well_formed(&row.scheme_id) {
        return (DirectCheck::Skipped, None);
    }
    let Some(member) = views.scheme_wide.by_scheme_id(&row.scheme_id) else {
        return (DirectCheck::NotFound, None);
    };
    match confirm(row, member, config.thresholds.loose, MatchMethod::SchemeId) {
        Some(m) => (DirectCheck::Confirmed, Some(m)),
        None => {
            let score = token_sort_ratio(&row.clean_name, &member.clean_name);
            (DirectCheck::AssignedToOther { score }, None)
        }
    }
}

/// Resolve one row: direct scheme-ID check, then the fallback chain.
pub fn resolve(
    row: &NormalizedSchedule,
    views: &RegistryViews,
    config: &ReconConfig,
) -> Resolution {
    let (direct, matched) = direct_match(row, views, config);
    if matched.is_some() {
        return Resolution { direct, matched };
    }
    let matched = first_success(row, views, &config.thresholds, &FALLBACK_CHAIN);
    if let Some(ref m) = matched {
        debug!(
            "'{}' resolved via {} to {} (score {})",
            row.clean_name, m.method, m.scheme_id, m.score
        );
    }
    Resolution { direct, matched }
}
