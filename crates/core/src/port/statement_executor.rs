// Statement Executor Port
// Runs one parsed migration statement against the store

use crate::error::Result;
use async_trait::async_trait;

/// Executes a single SQL statement.
///
/// Transaction and rollback semantics belong to the implementation; the
/// migration runner only sees success or failure.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Fail the Nth call (1-based) with message
        FailOnCall(usize, String),
        /// Fail any statement containing the needle
        FailMatching(String),
    }

    /// Records every statement it is asked to execute
    #[derive(Clone)]
    pub struct MockStatementExecutor {
        behavior: MockBehavior,
        executed: Arc<Mutex<Vec<String>>>,
    }

    impl MockStatementExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                executed: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail_on_call(call: usize, message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailOnCall(call, message.into()))
        }

        pub fn new_fail_matching(needle: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailMatching(needle.into()))
        }

        /// Statements submitted so far, including a failing one
        pub fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.executed.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatementExecutor for MockStatementExecutor {
        async fn execute(&self, statement: &str) -> Result<()> {
            let call = {
                let mut executed = self.executed.lock().unwrap();
                executed.push(statement.to_string());
                executed.len()
            };

            match &self.behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::FailOnCall(n, msg) if *n == call => {
                    Err(AppError::Database(msg.clone()))
                }
                MockBehavior::FailOnCall(..) => Ok(()),
                MockBehavior::FailMatching(needle) if statement.contains(needle.as_str()) => Err(
                    AppError::Database(format!("statement rejected: {}", needle)),
                ),
                MockBehavior::FailMatching(_) => Ok(()),
            }
        }
    }
}
