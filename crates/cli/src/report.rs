//! Validated schedule export.

use schedval_recon::model::join_marked_status;
use schedval_recon::ReconResult;

use crate::exit_codes::EXIT_RECON_INPUT;
use crate::CliError;

/// Column headers of the validated schedule, in output order.
pub const REPORT_HEADERS: [&str; 9] = [
    "S/N",
    "SSNIT Number",
    "NIA Number",
    "Contact",
    "Scheme Number",
    "Member Name",
    "Salary",
    "Tier2 Contribution",
    "Status",
];

fn csv_err(e: impl std::fmt::Display) -> CliError {
    CliError { code: EXIT_RECON_INPUT, message: format!("CSV write error: {e}"), hint: None }
}

/// Render reconciled rows as CSV, in result order.
///
/// Amounts are written as submitted; the scheme number is the resolved one.
/// The status column carries each tag's severity marker.
pub fn render_csv(result: &ReconResult) -> Result<Vec<u8>, CliError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(REPORT_HEADERS).map_err(csv_err)?;

    for row in &result.rows {
        let status = join_marked_status(&row.tags);
        writer
            .write_record([
                row.row_number.to_string().as_str(),
                row.ssn.trim(),
                row.national_id.trim(),
                row.contact.trim(),
                row.resolved_scheme_id.as_str(),
                row.member_name.trim(),
                row.salary.trim(),
                row.contribution.trim(),
                status.as_str(),
            ])
            .map_err(csv_err)?;
    }

    writer.into_inner().map_err(csv_err)
}
