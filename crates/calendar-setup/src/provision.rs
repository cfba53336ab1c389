use std::fmt;

use calendar_db::schema::{STATEMENTS, SchemaStatement};
use calendar_db::{EventStore, StoreError};
use tracing::{info, warn};

/// Result of one schema statement.
#[derive(Debug)]
pub struct StatementOutcome {
    pub description: &'static str,
    pub result: Result<(), StoreError>,
}

#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub outcomes: Vec<StatementOutcome>,
}

impl ProvisionReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.total()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} schema statements succeeded", self.succeeded(), self.total())
    }
}

/// Applies the full schema catalogue.
pub async fn provision<S: EventStore>(store: &S) -> ProvisionReport {
    apply(store, &STATEMENTS).await
}

/// Runs each statement once, in order. A failure is recorded and the next
/// statement is still attempted.
pub async fn apply<S: EventStore>(store: &S, statements: &[SchemaStatement]) -> ProvisionReport {
    let mut report = ProvisionReport::default();

    for statement in statements {
        let result = store.execute_sql(statement.sql).await;
        match &result {
            Ok(()) => info!(step = statement.description, "Schema statement applied"),
            Err(e) => warn!(
                step = statement.description,
                kind = ?e.kind(),
                error = %e,
                "Schema statement failed"
            ),
        }
        report.outcomes.push(StatementOutcome {
            description: statement.description,
            result,
        });
    }

    info!("{}", report);
    report
}
