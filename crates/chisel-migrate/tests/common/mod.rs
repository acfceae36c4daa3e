//! Recording executor shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chisel_core::{ExecuteError, Executor, Rows, Value};

/// Executor double that records statements and replays queued result sets.
#[derive(Debug, Default)]
pub struct MockExecutor {
    executed: Mutex<Vec<String>>,
    queries: Mutex<VecDeque<Rows>>,
    fail_matching: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result set for the next `query` call.
    pub fn queue(&self, rows: Rows) {
        self.queries.lock().unwrap().push_back(rows);
    }

    /// Queues an existence-probe answer.
    pub fn queue_exists(&self, exists: bool) {
        self.queue(Rows::new(
            vec!["exists".into()],
            vec![vec![Value::Boolean(exists)]],
        ));
    }

    /// Makes every `execute` whose statement contains `needle` fail.
    pub fn fail_matching(&self, needle: &str) {
        self.fail_matching.lock().unwrap().push(needle.to_string());
    }

    /// Returns every statement passed to `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Executor for MockExecutor {
    async fn execute(&self, statement: &str, _args: &[Value]) -> Result<u64, ExecuteError> {
        if self
            .fail_matching
            .lock()
            .unwrap()
            .iter()
            .any(|needle| statement.contains(needle.as_str()))
        {
            return Err(ExecuteError(format!("injected failure for {statement}")));
        }
        self.executed.lock().unwrap().push(statement.to_string());
        Ok(1)
    }

    async fn query(&self, _statement: &str, _args: &[Value]) -> Result<Rows, ExecuteError> {
        self.queries
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ExecuteError(String::from("no queued result set")))
    }
}

/// Builds one system-catalog attribute row in introspection order.
#[allow(dead_code)]
pub fn attribute_row(
    name: &str,
    nullable: bool,
    primary_key: bool,
    unique: bool,
    type_name: &str,
    max_length: Option<i64>,
) -> Vec<Value> {
    vec![
        Value::Text(name.to_string()),
        Value::Boolean(nullable),
        Value::Boolean(primary_key),
        Value::Boolean(unique),
        Value::Text(type_name.to_string()),
        max_length.map_or(Value::Null, Value::Integer),
    ]
}

/// Column names matching the introspection query's projection.
#[allow(dead_code)]
pub fn attribute_columns() -> Vec<String> {
    [
        "column_name",
        "nullable",
        "primary_key",
        "is_unique",
        "data_type",
        "character_maximum_length",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
