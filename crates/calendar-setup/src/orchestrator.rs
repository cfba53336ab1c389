use std::future::Future;
use std::io::Write;

use anyhow::Result;
use calendar_db::{ErrorKind, EventStore, StoreError};
use calendar_types::NewEvent;
use tracing::{debug, error, info, warn};

use crate::config::{Mode, SeedPolicy};
use crate::instructions;
use crate::provision::{self, ProvisionReport};
use crate::seed;
use crate::verify::{self, Summary, TableState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Connected,
    TableAbsent,
    Provisioned,
    TableExisting,
    Seeded,
    Verified,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every stage ran. Step failures, if any, are in `RunReport::failures`.
    Completed,
    /// The table is missing and was not created; instructions were printed.
    SetupRequired,
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ExistenceCheck,
    Schema,
    Seed,
    Verify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub message: String,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    pub failures: Vec<StepFailure>,
    pub provision: Option<ProvisionReport>,
    pub inserted: Option<usize>,
    pub summary: Option<Summary>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            outcome: Outcome::Completed,
            failures: Vec::new(),
            provision: None,
            inserted: None,
            summary: None,
        }
    }

    /// A run that stopped before connecting, such as on bad configuration.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Aborted(reason.into()),
            ..Self::new()
        }
    }

    fn fail(&mut self, step: Step, message: impl Into<String>) {
        self.failures.push(StepFailure {
            step,
            message: message.into(),
        });
    }

    /// 0 clean run, 1 completed with step failures, 2 setup required,
    /// 3 aborted.
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            Outcome::Completed if self.failures.is_empty() => 0,
            Outcome::Completed => 1,
            Outcome::SetupRequired => 2,
            Outcome::Aborted(_) => 3,
        }
    }
}

/// Sequences connect, existence check, provisioning, seeding and
/// verification. Only a failed connection stops the run early; every other
/// failure is recorded and the remaining stages still run.
pub struct Orchestrator {
    mode: Mode,
    seed: SeedPolicy,
    project_ref: Option<String>,
    samples: Vec<NewEvent>,
}

impl Orchestrator {
    pub fn new(mode: Mode, seed: SeedPolicy) -> Self {
        Self {
            mode,
            seed,
            project_ref: None,
            samples: seed::sample_events(),
        }
    }

    /// Project reference shown in the manual setup steps.
    pub fn with_project_ref(mut self, project_ref: Option<String>) -> Self {
        self.project_ref = project_ref;
        self
    }

    /// Progress lines go to `out`.
    pub async fn run<S, C, W>(&self, connect: C, out: &mut W) -> Result<RunReport>
    where
        S: EventStore,
        C: Future<Output = Result<S, StoreError>>,
        W: Write,
    {
        let mut report = RunReport::new();

        writeln!(out, "Church calendar database setup ({})", self.mode)?;
        writeln!(out, "Connecting to the store...")?;
        let store = match connect.await {
            Ok(store) => store,
            Err(e) => {
                error!(error = %e, "Connection failed");
                writeln!(out, "[fail] Connection failed: {}", e)?;
                report.outcome = Outcome::Aborted(format!("connection failed: {}", e));
                return Ok(report);
            }
        };
        writeln!(out, "[ok] Connected")?;

        let mut stage = Stage::Connected;
        while stage != Stage::Done {
            debug!(?stage, "Entering stage");
            stage = match stage {
                Stage::Connected => self.check_table(&store, &mut report, out).await?,
                Stage::TableAbsent => self.handle_absent(&store, &mut report, out).await?,
                Stage::Provisioned => self.recheck_table(&store, &mut report, out).await?,
                Stage::TableExisting => self.seed_table(&store, &mut report, out).await?,
                Stage::Seeded => self.verify_table(&store, &mut report, out).await?,
                Stage::Verified => {
                    self.finish(&report, out)?;
                    Stage::Done
                }
                Stage::Done => Stage::Done,
            };
        }

        Ok(report)
    }

    async fn check_table<S: EventStore, W: Write>(
        &self,
        store: &S,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        writeln!(out, "Checking for the events table...")?;
        match verify::table_state(store).await {
            Ok(TableState::Present) => {
                writeln!(out, "[ok] events table exists")?;
                Ok(Stage::TableExisting)
            }
            Ok(TableState::Absent) => {
                writeln!(out, "[--] events table does not exist")?;
                Ok(Stage::TableAbsent)
            }
            Err(e) => self.existence_failed(e, report, out),
        }
    }

    /// A connection-class failure ends the run as aborted. Anything else is
    /// recorded, the manual steps are printed and the run halts as
    /// setup-required.
    fn existence_failed<W: Write>(
        &self,
        e: StoreError,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        writeln!(out, "[fail] Could not check the events table: {}", e)?;
        if e.kind() == ErrorKind::Connection {
            error!(error = %e, "Connection lost during existence check");
            report.outcome = Outcome::Aborted(format!("connection failed: {}", e));
            return Ok(Stage::Done);
        }

        warn!(error = %e, "Existence check failed");
        report.fail(Step::ExistenceCheck, e.to_string());
        self.show_instructions(out)?;
        report.outcome = Outcome::SetupRequired;
        Ok(Stage::Done)
    }

    async fn handle_absent<S: EventStore, W: Write>(
        &self,
        store: &S,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        if self.mode != Mode::AutoProvision {
            self.show_instructions(out)?;
            report.outcome = Outcome::SetupRequired;
            return Ok(Stage::Done);
        }

        writeln!(out, "Creating schema...")?;
        let provisioned = provision::provision(store).await;
        for outcome in &provisioned.outcomes {
            match &outcome.result {
                Ok(()) => writeln!(out, "[ok] {}", outcome.description)?,
                Err(e) => writeln!(out, "[fail] {}: {}", outcome.description, e)?,
            }
        }
        writeln!(out, "{}", provisioned)?;

        if !provisioned.is_complete() {
            let failed = provisioned.total() - provisioned.succeeded();
            report.fail(Step::Schema, format!("{} of {} schema statements failed", failed, provisioned.total()));
            // DDL through the REST layer is best effort; always offer the manual path.
            self.show_instructions(out)?;
        }
        report.provision = Some(provisioned);
        Ok(Stage::Provisioned)
    }

    async fn recheck_table<S: EventStore, W: Write>(
        &self,
        store: &S,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        match verify::table_state(store).await {
            Ok(TableState::Present) => {
                writeln!(out, "[ok] events table is ready")?;
                Ok(Stage::TableExisting)
            }
            Ok(TableState::Absent) => {
                writeln!(out, "[--] events table still does not exist")?;
                report.outcome = Outcome::SetupRequired;
                Ok(Stage::Done)
            }
            Err(e) => self.existence_failed(e, report, out),
        }
    }

    async fn seed_table<S: EventStore, W: Write>(
        &self,
        store: &S,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        if self.mode == Mode::CheckOnly {
            return Ok(Stage::Seeded);
        }

        let insert = match self.seed {
            SeedPolicy::Never => false,
            SeedPolicy::Always => true,
            SeedPolicy::IfEmpty => match store.count_events(None).await {
                Ok(0) => true,
                Ok(existing) => {
                    writeln!(out, "[--] Table already holds {} events, skipping sample data", existing)?;
                    false
                }
                Err(e) => {
                    warn!(error = %e, "Row count before seeding failed");
                    writeln!(out, "[fail] Could not count existing events: {}", e)?;
                    report.fail(Step::Seed, e.to_string());
                    false
                }
            },
        };

        if insert {
            writeln!(out, "Inserting sample events...")?;
            match seed::load(store, &self.samples).await {
                Ok(inserted) => {
                    writeln!(out, "[ok] Inserted {} sample events", inserted)?;
                    report.inserted = Some(inserted);
                }
                Err(e) => {
                    writeln!(out, "[fail] Sample insert failed: {}", e)?;
                    report.fail(Step::Seed, e.to_string());
                }
            }
        }

        Ok(Stage::Seeded)
    }

    async fn verify_table<S: EventStore, W: Write>(
        &self,
        store: &S,
        report: &mut RunReport,
        out: &mut W,
    ) -> Result<Stage> {
        writeln!(out, "Verifying stored events...")?;
        match verify::summarize(store).await {
            Ok(summary) => {
                write!(out, "{}", summary)?;
                for failure in &summary.failures {
                    report.fail(Step::Verify, failure.clone());
                }
                report.summary = Some(summary);
            }
            Err(e) => {
                warn!(error = %e, "Verification failed");
                writeln!(out, "[fail] Verification failed: {}", e)?;
                report.fail(Step::Verify, e.to_string());
            }
        }
        Ok(Stage::Verified)
    }

    fn finish<W: Write>(&self, report: &RunReport, out: &mut W) -> Result<()> {
        if report.failures.is_empty() {
            info!("Setup finished");
            writeln!(out, "Setup complete.")?;
        } else {
            warn!(failures = report.failures.len(), "Setup finished with failures");
            writeln!(out, "Setup finished with {} failed step(s).", report.failures.len())?;
        }
        Ok(())
    }

    fn show_instructions<W: Write>(&self, out: &mut W) -> Result<()> {
        let text = instructions::render(self.project_ref.as_deref(), &self.samples);
        write!(out, "{}", text)?;
        Ok(())
    }
}
