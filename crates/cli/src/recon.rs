//! `schedval run | validate | options`: schedule reconciliation commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::{debug, info};

use schedval_recon::engine::SCHEDULE_COLUMNS;
use schedval_recon::{
    load_registry_rows, load_schedule_rows, registry_options, MemberRecord, ReconConfig,
    ReconError, RegistryScope, RegistryViews,
};

use crate::exit_codes::{
    EXIT_RECON_EMPTY_SCOPE, EXIT_RECON_FLAGGED, EXIT_RECON_INPUT, EXIT_RECON_INVALID_CONFIG,
};
use crate::report::render_csv;
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile a contribution schedule against the member registry
    #[command(after_help = "\
Schedule columns are positional: SSNIT number, Ghana Card number, contact,
scheme number, member name, basic salary, contribution. The header row is
skipped whatever it says.

Examples:
  schedval run --registry members.csv --schedule march.csv \\
               --employer \"ACME LTD\" --scheme-type \"TIER 2 OCC\"
  schedval run ... --json
  schedval run ... --csv march-validated.csv --output march.json
  schedval run ... --config schedval.toml --strict")]
    Run {
        /// Registry dump (CSV, header-mapped)
        #[arg(long)]
        registry: PathBuf,

        /// Submitted schedule (CSV, 7 positional columns)
        #[arg(long)]
        schedule: PathBuf,

        /// Employer (registry group name) the schedule was submitted for
        #[arg(long, env = "SCHEDVAL_EMPLOYER")]
        employer: String,

        /// Scheme type (registry scheme name) the schedule was submitted for
        #[arg(long, env = "SCHEDVAL_SCHEME_TYPE")]
        scheme_type: String,

        /// TOML config (defaults apply when omitted)
        #[arg(long, env = "SCHEDVAL_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the validated schedule as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Exit non-zero when any row is not valid as submitted
        #[arg(long)]
        strict: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  schedval validate schedval.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// List the employers and scheme types found in a registry dump
    #[command(after_help = "\
Examples:
  schedval options --registry members.csv
  schedval options --registry members.csv --json")]
    Options {
        /// Registry dump (CSV, header-mapped)
        #[arg(long)]
        registry: PathBuf,

        /// TOML config, for custom registry column names
        #[arg(long, env = "SCHEDVAL_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            registry,
            schedule,
            employer,
            scheme_type,
            config,
            json,
            output,
            csv,
            strict,
        } => cmd_recon_run(RunArgs {
            registry,
            schedule,
            scope: RegistryScope { employer, scheme_type },
            config,
            json,
            output,
            csv,
            strict,
        }),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
        ReconCommands::Options { registry, config, json } => {
            cmd_recon_options(registry, config, json)
        }
    }
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn read_input(path: &Path, what: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        recon_err(EXIT_RECON_INPUT, format!("cannot read {what} {}: {e}", path.display()))
    })
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        debug!("no config given, using defaults");
        return Ok(ReconConfig::default());
    };
    let config_str = read_input(path, "config")?;
    ReconConfig::from_toml(&config_str)
        .map_err(|e| recon_err(EXIT_RECON_INVALID_CONFIG, format!("{}: {e}", path.display())))
}

fn load_registry(path: &Path, config: &ReconConfig) -> Result<Vec<MemberRecord>, CliError> {
    let data = read_input(path, "registry")?;
    let members = load_registry_rows(&data, &config.registry.columns)
        .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("registry {}: {e}", path.display())))?;
    info!("loaded {} registry members from {}", members.len(), path.display());
    Ok(members)
}

struct RunArgs {
    registry: PathBuf,
    schedule: PathBuf,
    scope: RegistryScope,
    config: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    strict: bool,
}

fn cmd_recon_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let members = load_registry(&args.registry, &config)?;

    let schedule_data = read_input(&args.schedule, "schedule")?;
    let batch = load_schedule_rows(&schedule_data).map_err(|e| {
        let err = recon_err(EXIT_RECON_INPUT, format!("schedule {}: {e}", args.schedule.display()));
        match e {
            ReconError::Shape { .. } => err.with_hint(format!(
                "schedules need exactly {SCHEDULE_COLUMNS} columns: SSNIT, Ghana Card, contact, \
                 scheme number, name, salary, contribution"
            )),
            _ => err,
        }
    })?;

    let views = RegistryViews::from_registry(&members, &args.scope, config.registry.include_closed);
    if views.scoped.is_empty() {
        return Err(recon_err(
            EXIT_RECON_EMPTY_SCOPE,
            format!(
                "no registry members for employer \"{}\" on scheme \"{}\"",
                args.scope.employer, args.scope.scheme_type
            ),
        )
        .with_hint(format!(
            "list valid selections with: schedval options --registry {}",
            args.registry.display()
        )));
    }

    let mut result = schedval_recon::run(&config, &batch, &views);
    result.meta.scope = Some(args.scope);

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = args.csv {
        let bytes = render_csv(&result)?;
        std::fs::write(path, bytes)
            .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("cannot write CSV: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} rows: {} valid, {} auto-corrected, {} fuzzy-corrected, {} mismatched, {} unregistered, {} rejected",
        s.total_rows,
        s.valid,
        s.auto_corrected,
        s.fuzzy_corrected,
        s.mismatched,
        s.unregistered,
        s.rejected,
    );
    if s.scheme_ids_filled > 0 {
        eprintln!("scheme numbers filled in: {}", s.scheme_ids_filled);
    }

    let flagged = s.total_rows - s.valid;
    if args.strict && flagged > 0 {
        return Err(recon_err(
            EXIT_RECON_FLAGGED,
            format!("{flagged} row(s) not valid as submitted"),
        ));
    }

    Ok(())
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: config '{}' (thresholds strict {} / loose {}, rate {} bps, salary {}..={} cents)",
        config.name,
        config.thresholds.strict,
        config.thresholds.loose,
        config.contribution.rate_bps,
        config.salary.min_cents,
        config.salary.max_cents,
    );
    Ok(())
}

fn cmd_recon_options(
    registry: PathBuf,
    config: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let members = load_registry(&registry, &config)?;
    let options = registry_options(&members);

    if json_output {
        let json_str = serde_json::to_string_pretty(&options)
            .map_err(|e| recon_err(EXIT_RECON_INPUT, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    println!("employers:");
    for employer in &options.employers {
        println!("  {employer}");
    }
    println!("scheme types:");
    for scheme_type in &options.scheme_types {
        println!("  {scheme_type}");
    }
    Ok(())
}
