//! Recording executor shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chisel_core::{ExecuteError, Executor, Rows, Value};

/// Executor double that records statements and replays queued result sets.
#[derive(Debug, Default)]
pub struct MockExecutor {
    executed: Mutex<Vec<(String, Vec<Value>)>>,
    queries: Mutex<VecDeque<Rows>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result set for the next `query` call.
    #[allow(dead_code)]
    pub fn queue(&self, rows: Rows) {
        self.queries.lock().unwrap().push_back(rows);
    }

    /// Returns every statement passed to `execute`, with its arguments.
    #[allow(dead_code)]
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.lock().unwrap().clone()
    }
}

impl Executor for MockExecutor {
    async fn execute(&self, statement: &str, args: &[Value]) -> Result<u64, ExecuteError> {
        self.executed
            .lock()
            .unwrap()
            .push((statement.to_string(), args.to_vec()));
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
