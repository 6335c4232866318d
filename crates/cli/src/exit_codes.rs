//! CLI Exit Code Registry
//!
//! Single source of truth for `schedval` exit codes. Scripts that wrap the
//! validator branch on these, so treat them as part of the shell contract.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | recon            | Schedule reconciliation codes            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (60-69)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 60;

/// Input could not be read, or a schedule row has the wrong column count.
pub const EXIT_RECON_INPUT: u8 = 61;

/// The employer / scheme-type selection matched no registry members.
pub const EXIT_RECON_EMPTY_SCOPE: u8 = 62;

/// `--strict` was given and at least one row is not valid as submitted.
pub const EXIT_RECON_FLAGGED: u8 = 63;
