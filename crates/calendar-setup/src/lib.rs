/// Provisioning tool for the church calendar's hosted events table.
///
/// Connects to the store, checks for the table, optionally creates it,
/// loads the sample events and prints a verification summary.
pub mod config;
pub mod instructions;
pub mod orchestrator;
pub mod provision;
pub mod seed;
pub mod verify;

pub use config::{ConfigError, Mode, SeedPolicy, Settings};
pub use orchestrator::{Orchestrator, Outcome, RunReport, Step, StepFailure};
