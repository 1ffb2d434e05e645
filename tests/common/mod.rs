#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sql_proxy::prelude::*;
use tokio::sync::{Notify, Semaphore};

/// In-memory `DbConnection` that records every statement it is asked to run.
#[derive(Default)]
pub struct FakeConnection {
    executed: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
    fail_marker: Option<String>,
    gate: Option<Arc<Semaphore>>,
    started: Arc<Notify>,
    rows: Mutex<ResultSet>,
    closed: AtomicBool,
    used_after_close: AtomicUsize,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any statement whose rendered text contains `marker`.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Make every `execute` wait for a permit from `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_rows(self, columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        let mut rs = ResultSet::with_capacity(rows.len());
        rs.set_column_names(Arc::new(columns.iter().map(|c| (*c).to_string()).collect()));
        for row in rows {
            rs.add_row_values(row);
        }
        *self.rows.lock().unwrap() = rs;
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn used_after_close(&self) -> usize {
        self.used_after_close.load(Ordering::SeqCst)
    }

    /// Wait until some `execute` call has started.
    pub async fn wait_for_execute(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.started.notified())
            .await
            .expect("worker never started executing");
    }
}

#[async_trait]
impl DbConnection for FakeConnection {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Sqlite
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, SqlProxyError> {
        if self.is_closed() {
            self.used_after_close.fetch_add(1, Ordering::SeqCst);
        }
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| SqlProxyError::ExecutionError(e.to_string()))?
                .forget();
        }
        let rendered = statement.to_string();
        if let Some(marker) = &self.fail_marker
            && rendered.contains(marker.as_str())
        {
            return Err(SqlProxyError::ExecutionError(format!(
                "simulated failure for {rendered}"
            )));
        }
        self.executed.lock().unwrap().push(rendered);
        Ok(1)
    }

    async fn query(&self, statement: &Statement) -> Result<ResultSet, SqlProxyError> {
        if self.is_closed() {
            self.used_after_close.fetch_add(1, Ordering::SeqCst);
        }
        self.queries.lock().unwrap().push(statement.to_string());
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn close(&self) -> Result<(), SqlProxyError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn insert_seq(table: &str, seq: usize) -> MutationRequest {
    MutationRequest::insert(table, vec![FieldValue::new("seq", seq.to_string())])
}

pub fn rendered_insert(table: &str, seq: usize) -> String {
    format!("INSERT INTO {table} (seq) VALUES ('{seq}')")
}

/// Poll `cond` until it holds or a few seconds pass.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
