// Property-based tests for name scoring and row reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use schedval_recon::config::ReconConfig;
use schedval_recon::engine::run;
use schedval_recon::model::{MemberFields, MemberRecord, ScheduleRecord};
use schedval_recon::normalize::{clean_name, format_cents, parse_amount_cents};
use schedval_recon::rules::expected_contribution_cents;
use schedval_recon::similarity::token_sort_ratio;
use schedval_recon::RegistryViews;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_token() -> impl Strategy<Value = String> {
    r"[a-z]{1,8}"
}

fn arb_name() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_token(), 1..4)
}

/// Amounts as spreadsheets export them: signed, grouped, huge, exponent form.
fn arb_amount() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"-?[0-9]{1,6}(\.[0-9]{1,2})?",
        2 => r"-?[0-9]{1,3}(,[0-9]{3}){1,5}(\.[0-9]{2})?",
        2 => r"-?[0-9]{15,19}",
        1 => r"-?[1-9]e[0-9]{1,3}",
        1 => prop::sample::select(vec!["1e300", "-1e300", "inf", "-inf", "9223372036854775807"])
            .prop_map(|s| s.to_string()),
    ]
}

/// Free-form cell: names, identifiers, amounts, junk, blanks.
fn arb_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[A-Za-z ]{0,20}",
        3 => arb_amount(),
        1 => r"1010[0-9]{9}",
        1 => Just("".to_string()),
        1 => Just("nan".to_string()),
    ]
}

fn arb_record() -> impl Strategy<Value = ScheduleRecord> {
    (
        arb_cell(),
        arb_cell(),
        arb_cell(),
        arb_cell(),
        arb_cell(),
        arb_cell(),
        arb_cell(),
    )
        .prop_map(|(ssn, national_id, contact, scheme_id, member_name, salary, contribution)| {
            ScheduleRecord {
                row_number: 0,
                ssn,
                national_id,
                contact,
                scheme_id,
                member_name,
                salary,
                contribution,
            }
        })
}

fn registry() -> RegistryViews {
    let members: Vec<MemberRecord> = [
        ("Ama", "Boateng", "1010000000001"),
        ("Kofi", "Asante", "1010000000002"),
        ("Esi", "Mensah", "1010000000003"),
    ]
    .iter()
    .map(|(first, last, scheme)| {
        MemberRecord::new(MemberFields {
            first_name: first.to_string(),
            last_name: last.to_string(),
            scheme_id: scheme.to_string(),
            ..Default::default()
        })
    })
    .collect();
    RegistryViews::new(members.clone(), members)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn score_is_symmetric(a in arb_name(), b in arb_name()) {
        let (a, b) = (a.join(" "), b.join(" "));
        prop_assert_eq!(token_sort_ratio(&a, &b), token_sort_ratio(&b, &a));
    }

    #[test]
    fn score_ignores_token_order(tokens in arb_name(), other in arb_name()) {
        let forward = tokens.join(" ");
        let mut reversed = tokens.clone();
        reversed.reverse();
        let reversed = reversed.join(" ");
        let other = other.join(" ");
        prop_assert_eq!(token_sort_ratio(&forward, &reversed), 100);
        prop_assert_eq!(token_sort_ratio(&forward, &other), token_sort_ratio(&reversed, &other));
    }

    #[test]
    fn score_is_bounded(a in r"[a-z ]{0,20}", b in r"[a-z ]{0,20}") {
        prop_assert!(token_sort_ratio(&a, &b) <= 100);
    }

    #[test]
    fn clean_name_ignores_case_and_punctuation(tokens in arb_name()) {
        let plain = tokens.join(" ");
        let shouted = tokens
            .iter()
            .map(|t| t.to_uppercase())
            .collect::<Vec<_>>()
            .join(",  ");
        prop_assert_eq!(clean_name(&shouted), clean_name(&plain));
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn formatted_cents_parse_back(cents in 0i64..1_000_000_000) {
        prop_assert_eq!(parse_amount_cents(&format_cents(cents)), Some(cents));
    }

    #[test]
    fn parsed_amounts_stay_in_range(raw in arb_amount()) {
        if let Some(cents) = parse_amount_cents(&raw) {
            prop_assert!(cents > i64::MIN && cents < i64::MAX);
            let expected = expected_contribution_cents(cents, 500);
            prop_assert!(expected.unsigned_abs() <= cents.unsigned_abs() / 20 + 1);
        }
    }

    #[test]
    fn thousands_separators_are_ignored(whole in 1_000i64..1_000_000_000, frac in 0i64..100) {
        let digits = whole.to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let plain = format!("{digits}.{frac:02}");
        let grouped = format!("{grouped}.{frac:02}");
        prop_assert_eq!(parse_amount_cents(&grouped), Some(whole * 100 + frac));
        prop_assert_eq!(parse_amount_cents(&grouped), parse_amount_cents(&plain));
    }

    #[test]
    fn expected_contribution_within_half_cent(salary in 0i64..100_000_000) {
        let expected = expected_contribution_cents(salary, 500);
        prop_assert!((expected * 20 - salary).abs() <= 10);
    }
}

// ---------------------------------------------------------------------------
// Engine totality
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_row_gets_a_status(records in prop::collection::vec(arb_record(), 0..12)) {
        let batch: Vec<ScheduleRecord> = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| { r.row_number = i + 1; r })
            .collect();
        let result = run(&ReconConfig::default(), &batch, &registry());

        prop_assert_eq!(result.rows.len(), batch.len());
        prop_assert_eq!(result.summary.total_rows, batch.len());
        for row in &result.rows {
            prop_assert!(!row.status.is_empty());
            prop_assert!(!row.tags.is_empty());
        }

        let mut numbers: Vec<usize> = result.rows.iter().map(|r| r.row_number).collect();
        numbers.sort_unstable();
        prop_assert_eq!(numbers, (1..=batch.len()).collect::<Vec<_>>());
    }

    #[test]
    fn extreme_amounts_never_abort_the_batch(
        salary in arb_amount(),
        contribution in arb_amount(),
        name in arb_cell(),
    ) {
        let record = ScheduleRecord {
            row_number: 1,
            scheme_id: "1010000000001".into(),
            member_name: name,
            salary,
            contribution,
            ..Default::default()
        };
        let result = run(&ReconConfig::default(), &[record], &registry());
        prop_assert_eq!(result.rows.len(), 1);
        prop_assert!(!result.rows[0].tags.is_empty());
    }

    #[test]
    fn scheme_id_only_changes_on_fallback(records in prop::collection::vec(arb_record(), 1..8)) {
        let result = run(&ReconConfig::default(), &records, &registry());
        for row in &result.rows {
            if row.scheme_id_changed() {
                let method = row.match_method;
                prop_assert!(method.is_some());
                prop_assert!(method != Some(schedval_recon::model::MatchMethod::SchemeId));
            }
        }
    }
}
