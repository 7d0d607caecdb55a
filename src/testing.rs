//! Test doubles for processes and pauses

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::delay::Delay;
use crate::kubectl::{CommandOutput, CommandRunner, KubectlError};

/// Delay that records requested pauses instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// One recorded process invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl RecordedCall {
    /// Args joined with spaces, for readable assertions
    pub fn line(&self) -> String {
        self.args.join(" ")
    }
}

struct Rule {
    prefix: Vec<String>,
    outputs: VecDeque<CommandOutput>,
}

/// Scripted command runner
///
/// Responses are matched by argument prefix. A rule with several outputs
/// hands them out in order and then repeats the last one. Unmatched
/// commands succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `outputs`, in order
    pub fn respond(&self, prefix: &[&str], outputs: Vec<CommandOutput>) -> &Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| (*s).to_string()).collect(),
            outputs: outputs.into(),
        });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded invocations as space-joined arg lines
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::line).collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, KubectlError> {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            stdin: stdin.map(str::to_string),
        });

        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .iter_mut()
            .find(|rule| args.starts_with(&rule.prefix));

        let output = match rule {
            Some(rule) if rule.outputs.len() > 1 => rule.outputs.pop_front(),
            Some(rule) => rule.outputs.front().cloned(),
            None => None,
        };

        Ok(output.unwrap_or_else(|| CommandOutput::ok("")))
    }
}
