use std::collections::BTreeMap;

use crate::model::{ReconSummary, ReconciledRow, Verdict};

/// Compute summary statistics from reconciled rows.
pub fn compute_summary(rows: &[ReconciledRow]) -> ReconSummary {
    let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut valid = 0;
    let mut auto_corrected = 0;
    let mut fuzzy_corrected = 0;
    let mut mismatched = 0;
    let mut unregistered = 0;
    let mut rejected = 0;
    let mut scheme_ids_filled = 0;

    for r in rows {
        for tag in &r.tags {
            *tag_counts.entry(tag.key().to_string()).or_insert(0) += 1;
        }
        if r.scheme_id_changed() {
            scheme_ids_filled += 1;
        }

        match r.verdict {
            Verdict::Valid => valid += 1,
            Verdict::AutoCorrected => auto_corrected += 1,
            Verdict::FuzzyCorrected => fuzzy_corrected += 1,
            Verdict::Mismatched => mismatched += 1,
            Verdict::Unregistered => unregistered += 1,
            Verdict::Rejected => rejected += 1,
        }
    }

    ReconSummary {
        total_rows: rows.len(),
        valid,
        auto_corrected,
        fuzzy_corrected,
        mismatched,
        unregistered,
        rejected,
        scheme_ids_filled,
        tag_counts,
    }
}
