use std::fmt;

use calendar_db::{EventQuery, EventStore, StoreError};
use calendar_types::Category;
use chrono::NaiveDate;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Absent,
    Present,
}

/// Bounded read against the events table. A missing relation is a normal
/// answer here, not an error.
pub async fn table_state<S: EventStore>(store: &S) -> Result<TableState, StoreError> {
    match store.select_events(&EventQuery::probe()).await {
        Ok(_) => Ok(TableState::Present),
        Err(e) if e.is_table_absent() => {
            debug!(error = %e, "events table is absent");
            Ok(TableState::Absent)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstEvent {
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: u64,
    pub first: Option<FirstEvent>,
    pub by_category: Vec<(Category, u64)>,
    /// Queries that failed after the total was counted.
    pub failures: Vec<String>,
}

impl Summary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count_for(&self, category: Category) -> Option<u64> {
        self.by_category
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
    }
}

/// Counts rows overall and per reported category, one query per category.
/// Only a failed total is an error; later failures are kept in the summary
/// next to the counts that did succeed.
pub async fn summarize<S: EventStore>(store: &S) -> Result<Summary, StoreError> {
    let total = store.count_events(None).await?;
    let mut failures = Vec::new();

    let first = match store.select_events(&EventQuery::probe()).await {
        Ok(rows) => rows.into_iter().next().map(|event| FirstEvent {
            title: event.title,
            date: event.date,
        }),
        Err(e) => {
            warn!(error = %e, "First event lookup failed");
            failures.push(format!("first event: {}", e));
            None
        }
    };

    let mut by_category = Vec::with_capacity(Category::REPORTED.len());
    for category in Category::REPORTED {
        match store.count_events(Some(category)).await {
            Ok(count) => by_category.push((category, count)),
            Err(e) => {
                warn!(%category, error = %e, "Category count failed");
                failures.push(format!("{} count: {}", category, e));
            }
        }
    }

    Ok(Summary {
        total,
        first,
        by_category,
        failures,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Events stored: {}", self.total)?;
        if let Some(first) = &self.first {
            writeln!(f, "First event: {} ({})", first.title, first.date)?;
        }
        writeln!(f, "Events per category:")?;
        for (category, count) in &self.by_category {
            writeln!(f, "  - {}: {}", category, count)?;
        }
        for failure in &self.failures {
            writeln!(f, "[fail] {}", failure)?;
        }
        Ok(())
    }
}
