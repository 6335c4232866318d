use std::collections::HashMap;

use log::{info, warn};

use crate::config::{RegistryColumns, ReconConfig, SortOrder};
use crate::error::ReconError;
use crate::model::{
    join_status, MatchMethod, MemberFields, MemberRecord, NormalizedSchedule, ReconMeta,
    ReconResult, ReconciledRow, ScheduleRecord, StatusTag, Verdict,
};
use crate::normalize::clean_name;
use crate::registry::RegistryViews;
use crate::resolver::{resolve, DirectCheck, Resolution};
use crate::rules::check_amounts;
use crate::summary::compute_summary;

/// Positional schedule layout: SSN, national ID, contact, scheme ID, name,
/// salary, contribution.
pub const SCHEDULE_COLUMNS: usize = 7;

/// Reconcile a schedule batch against the registry views.
///
/// Total over well-shaped input: every row comes back with a status.
pub fn run(config: &ReconConfig, batch: &[ScheduleRecord], views: &RegistryViews) -> ReconResult {
    let mut rows: Vec<ReconciledRow> = batch
        .iter()
        .map(|record| reconcile_row(record, views, config))
        .collect();

    sort_rows(&mut rows, config.output.sort);

    let summary = compute_summary(&rows);
    info!(
        "reconciled {} rows: {} valid, {} auto-corrected, {} fuzzy, {} mismatched, {} unregistered, {} rejected",
        summary.total_rows,
        summary.valid,
        summary.auto_corrected,
        summary.fuzzy_corrected,
        summary.mismatched,
        summary.unregistered,
        summary.rejected
    );

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            scope: None,
            scoped_members: views.scoped.len(),
            scheme_members: views.scheme_wide.len(),
        },
        summary,
        rows,
    }
}

/// Business check, then identity resolution, folded into one output row.
pub fn reconcile_row(
    record: &ScheduleRecord,
    views: &RegistryViews,
    config: &ReconConfig,
) -> ReconciledRow {
    let norm = NormalizedSchedule::from_record(record);
    let check = check_amounts(&norm, config);
    let mut tags = check.tags;

    let resolution = if check.terminal {
        None
    } else {
        Some(resolve(&norm, views, config))
    };

    if let Some(ref res) = resolution {
        tags.extend(resolution_tags(res));
    }

    let submitted_scheme_id = record.scheme_id.trim().to_string();
    let resolved_scheme_id = match resolution {
        Some(ref res) if res.is_fallback() => res
            .matched
            .as_ref()
            .map(|m| m.scheme_id.clone())
            .unwrap_or_else(|| submitted_scheme_id.clone()),
        _ => submitted_scheme_id.clone(),
    };

    let verdict = verdict_for(&tags, resolution.as_ref());
    let matched = resolution.and_then(|r| r.matched);

    ReconciledRow {
        row_number: record.row_number,
        national_id: record.national_id.clone(),
        ssn: record.ssn.clone(),
        contact: record.contact.clone(),
        member_name: record.member_name.clone(),
        salary: record.salary.clone(),
        contribution: record.contribution.clone(),
        submitted_scheme_id,
        resolved_scheme_id,
        salary_cents: norm.salary_cents,
        contribution_cents: norm.contribution_cents,
        expected_contribution_cents: check.expected_cents,
        status: join_status(&tags),
        tags,
        match_method: matched.as_ref().map(|m| m.method),
        match_score: matched.as_ref().map(|m| m.score),
        verdict,
    }
}

fn resolution_tags(res: &Resolution) -> Vec<StatusTag> {
    let mut tags = Vec::new();
    match res.direct {
        DirectCheck::AssignedToOther { .. } => tags.push(StatusTag::SchemeAssignedToOther),
        DirectCheck::NotFound => tags.push(StatusTag::SchemeNotFound),
        DirectCheck::Skipped | DirectCheck::Confirmed => {}
    }
    match res.matched.as_ref().map(|m| m.method) {
        Some(MatchMethod::SchemeId) => tags.push(StatusTag::SchemeConfirmed),
        Some(MatchMethod::FuzzyName) => tags.push(StatusTag::SchemeFuzzyFilled),
        Some(method) => tags.push(StatusTag::SchemeAutoFilled { method }),
        // A scheme ID that belongs to someone else already says enough.
        None if matches!(res.direct, DirectCheck::AssignedToOther { .. }) => {}
        None => tags.push(StatusTag::Unregistered),
    }
    tags
}

fn verdict_for(tags: &[StatusTag], resolution: Option<&Resolution>) -> Verdict {
    if tags.iter().any(StatusTag::is_business_violation) {
        return Verdict::Rejected;
    }
    let Some(res) = resolution else {
        return Verdict::Rejected;
    };
    match res.matched.as_ref().map(|m| m.method) {
        Some(MatchMethod::SchemeId) => Verdict::Valid,
        Some(MatchMethod::FuzzyName) => Verdict::FuzzyCorrected,
        Some(_) => Verdict::AutoCorrected,
        None if matches!(res.direct, DirectCheck::AssignedToOther { .. }) => Verdict::Mismatched,
        None => Verdict::Unregistered,
    }
}

/// Stable sort; rows with equal keys keep batch order.
pub fn sort_rows(rows: &mut [ReconciledRow], order: SortOrder) {
    rows.sort_by_cached_key(|r| {
        let name = clean_name(&r.member_name);
        match order {
            SortOrder::StatusThenName => (r.status.clone(), name),
            SortOrder::NameThenStatus => (name, r.status.clone()),
        }
    });
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn is_blank_record(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Load a schedule CSV. The header row is skipped; columns are taken by
/// position, never by header text.
///
/// Blank trailing cells past the seventh column are tolerated (spreadsheet
/// exports pad rows); any other column count is a shape error.
pub fn load_schedule_rows(csv_data: &str) -> Result<Vec<ScheduleRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let header_width = significant_width(reader.headers()?);
    if header_width != SCHEDULE_COLUMNS {
        return Err(ReconError::Shape {
            line: 1,
            expected: SCHEDULE_COLUMNS,
            actual: header_width,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank_record(&record) {
            continue;
        }
        let width = significant_width(&record);
        if width != SCHEDULE_COLUMNS {
            return Err(ReconError::Shape {
                line: record.position().map_or(0, |p| p.line()),
                expected: SCHEDULE_COLUMNS,
                actual: width,
            });
        }
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        rows.push(ScheduleRecord {
            row_number: rows.len() + 1,
            ssn: field(0),
            national_id: field(1),
            contact: field(2),
            scheme_id: field(3),
            member_name: field(4),
            salary: field(5),
            contribution: field(6),
        });
    }

    Ok(rows)
}

/// Field count ignoring blank cells past the positional layout.
fn significant_width(record: &csv::StringRecord) -> usize {
    let mut width = record.len();
    while width > SCHEDULE_COLUMNS && record.get(width - 1).is_some_and(|f| f.trim().is_empty()) {
        width -= 1;
    }
    width
}

/// Load a registry dump CSV, mapping fields by header name.
///
/// A column missing from the dump leaves that field blank for every member.
pub fn load_registry_rows(
    csv_data: &str,
    columns: &RegistryColumns,
) -> Result<Vec<MemberRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let idx = |name: &str| -> Option<usize> {
        let found = headers.get(name.trim()).copied();
        if found.is_none() {
            warn!("registry: column '{name}' not found, field left blank");
        }
        found
    };

    let first_name_idx = idx(&columns.first_name);
    let middle_name_idx = idx(&columns.middle_name);
    let last_name_idx = idx(&columns.last_name);
    let scheme_id_idx = idx(&columns.scheme_id);
    let employer_idx = idx(&columns.employer);
    let scheme_type_idx = idx(&columns.scheme_type);
    let national_id_idx = idx(&columns.national_id);
    let ssn_idx = idx(&columns.ssn);
    let contact_idx = idx(&columns.contact);
    let status_idx = idx(&columns.status);

    let mut members = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank_record(&record) {
            continue;
        }
        let field = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .unwrap_or("")
                .to_string()
        };
        members.push(MemberRecord::new(MemberFields {
            first_name: field(first_name_idx),
            middle_name: field(middle_name_idx),
            last_name: field(last_name_idx),
            scheme_id: field(scheme_id_idx),
            employer: field(employer_idx),
            scheme_type: field(scheme_type_idx),
            national_id: field(national_id_idx),
            ssn: field(ssn_idx),
            contact: field(contact_idx),
            status: field(status_idx),
        }));
    }

    Ok(members)
}
