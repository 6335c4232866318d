//! `schedval-recon`: contribution schedule reconciliation engine.
//!
//! Pure engine crate: receives a schedule batch and registry views, returns
//! every row classified and annotated. No CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod similarity;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{load_registry_rows, load_schedule_rows, run};
pub use error::ReconError;
pub use model::{MemberRecord, ReconResult, ReconciledRow, ScheduleRecord, StatusTag, Verdict};
pub use registry::{registry_options, RegistryScope, RegistryViews};
