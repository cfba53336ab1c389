#![allow(dead_code)]
//! In-memory `EventStore` that behaves like the hosted store closely enough
//! for the provisioning flow: DDL bookkeeping, enum-typed rows, exact counts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use calendar_db::schema::STATEMENTS;
use calendar_db::{EventQuery, EventStore, StoreError};
use calendar_types::{Category, Event, NewEvent};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

#[derive(Clone, Copy)]
pub enum ReadFailure {
    Timeout,
    Internal,
}

impl ReadFailure {
    fn error(self) -> StoreError {
        match self {
            Self::Timeout => StoreError::Timeout(Duration::from_secs(15)),
            Self::Internal => api_error(500, "XX000", "internal error"),
        }
    }
}

#[derive(Default)]
struct Inner {
    table_exists: bool,
    applied: HashSet<String>,
    rows: Vec<Event>,
    executed: Vec<String>,
    sql_function_missing: bool,
    reject_inserts: bool,
    fail_counts: bool,
    fail_count_for: Option<Category>,
    read_failure: Option<ReadFailure>,
    selects: usize,
    counts: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

fn api_error(status: u16, code: &str, message: &str) -> StoreError {
    let body = json!({ "code": code, "message": message, "details": null, "hint": null });
    StoreError::from_response(status, &body.to_string())
}

fn missing_table() -> StoreError {
    api_error(404, "42P01", "relation \"events\" does not exist")
}

impl MemoryStore {
    /// Fresh project: no table, SQL function available.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Project where a previous run already applied the whole schema.
    pub fn with_table() -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.table_exists = true;
            inner.applied = STATEMENTS.iter().map(|s| s.sql.to_string()).collect();
        }
        store
    }

    pub fn without_sql_function(self) -> Self {
        self.inner.lock().unwrap().sql_function_missing = true;
        self
    }

    pub fn rejecting_inserts(self) -> Self {
        self.inner.lock().unwrap().reject_inserts = true;
        self
    }

    pub fn failing_counts(self) -> Self {
        self.inner.lock().unwrap().fail_counts = true;
        self
    }

    /// Only the count for `category` fails.
    pub fn failing_count_for(self, category: Category) -> Self {
        self.inner.lock().unwrap().fail_count_for = Some(category);
        self
    }

    /// Every select fails with `failure`.
    pub fn failing_reads(self, failure: ReadFailure) -> Self {
        self.inner.lock().unwrap().read_failure = Some(failure);
        self
    }

    pub fn with_rows(self, events: &[NewEvent]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            for event in events {
                let row = materialize(event);
                inner.rows.push(row);
            }
        }
        self
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn rows_in(&self, category: Category) -> usize {
        self.inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|row| row.category == category)
            .count()
    }

    pub fn table_exists(&self) -> bool {
        self.inner.lock().unwrap().table_exists
    }

    /// Every SQL statement that reached the store, successful or not.
    pub fn executed(&self) -> Vec<String> {
        self.inner.lock().unwrap().executed.clone()
    }

    pub fn count_queries(&self) -> usize {
        self.inner.lock().unwrap().counts
    }
}

fn materialize(event: &NewEvent) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: event.title.clone(),
        date: event.date,
        start_time: event.start_time,
        end_time: event.end_time,
        category: event.category,
        description: event.description.clone(),
        location: event.location.clone(),
        is_all_day: event.is_all_day,
        reminder: event.reminder,
        recurring: event.recurring,
        created_at: now,
        updated_at: now,
    }
}

fn needs_table(sql: &str) -> bool {
    sql.contains("ON events") || sql.starts_with("ALTER TABLE events")
}

fn is_idempotent(sql: &str) -> bool {
    sql.contains("IF NOT EXISTS") || sql.starts_with("CREATE OR REPLACE") || sql.starts_with("ALTER")
}

impl EventStore for MemoryStore {
    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.sql_function_missing {
            return Err(api_error(404, "PGRST202", "Could not find the function public.exec_sql(sql)"));
        }

        let sql = sql.trim();
        inner.executed.push(sql.to_string());

        if needs_table(sql) && !inner.table_exists {
            return Err(missing_table());
        }
        if !is_idempotent(sql) && !inner.applied.insert(sql.to_string()) {
            let code = if sql.starts_with("CREATE TABLE") { "42P07" } else { "42710" };
            return Err(api_error(400, code, "object already exists"));
        }
        if sql.starts_with("CREATE TABLE events") {
            inner.table_exists = true;
        }
        Ok(())
    }

    async fn select_events(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.selects += 1;
        if let Some(failure) = inner.read_failure {
            return Err(failure.error());
        }
        if !inner.table_exists {
            return Err(missing_table());
        }

        let mut rows: Vec<Event> = inner
            .rows
            .iter()
            .filter(|row| query.category.is_none_or(|c| row.category == c))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.date, row.created_at));
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert_events(&self, events: &[NewEvent]) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.table_exists {
            return Err(missing_table());
        }
        if inner.reject_inserts {
            return Err(api_error(
                400,
                "22P02",
                "invalid input value for enum church_category",
            ));
        }
        if let Some(bad) = events.iter().find(|e| e.validate().is_err()) {
            return Err(api_error(400, "23514", &format!("row {:?} violates check constraint", bad.title)));
        }

        inner.rows.extend(events.iter().map(materialize));
        Ok(events.len())
    }

    async fn count_events(&self, category: Option<Category>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts += 1;
        if inner.fail_counts || (category.is_some() && category == inner.fail_count_for) {
            return Err(api_error(500, "XX000", "internal error"));
        }
        if !inner.table_exists {
            return Err(missing_table());
        }

        let count = inner
            .rows
            .iter()
            .filter(|row| category.is_none_or(|c| row.category == c))
            .count();
        Ok(count as u64)
    }
}
