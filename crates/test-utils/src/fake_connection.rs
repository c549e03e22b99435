use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use pf::errors::Result;
use pf::shell::RemoteConnection;

/// A fake remote connection that:
/// - records every composite command submitted to it
/// - returns a canned exit code instead of opening a real connection.
pub struct FakeConnection {
    target: String,
    exit_code: i32,
    submitted: Arc<Mutex<Vec<String>>>,
}

impl FakeConnection {
    pub fn new(target: &str, exit_code: i32, submitted: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            target: target.to_string(),
            exit_code,
            submitted,
        }
    }
}

impl RemoteConnection for FakeConnection {
    fn target(&self) -> &str {
        &self.target
    }

    fn run<'a>(
        &'a self,
        command: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        let submitted = Arc::clone(&self.submitted);
        let exit_code = self.exit_code;
        let command = command.to_string();

        Box::pin(async move {
            {
                let mut guard = submitted.lock().unwrap();
                guard.push(command);
            }
            Ok(exit_code)
        })
    }
}
