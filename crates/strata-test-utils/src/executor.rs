//! Scripted in-memory executor for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use strata_core::{parse_affected_rows, Error, MutationOutcome, Result, SqlExecutor};

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Failure { exit_code: i32, stderr: String },
}

#[derive(Debug)]
struct Rule {
    needle: String,
    /// Responses pop front-to-back; the last one repeats forever.
    responses: Mutex<VecDeque<Response>>,
}

/// An in-memory [`SqlExecutor`] that answers statements from canned rules.
///
/// Rules match by substring, in registration order; the first match wins.
/// Register `decompress_chunk` before `compress_chunk` — the former contains
/// the latter as a substring. Statements matching no rule succeed with empty
/// output, the behavior of a statement that affects nothing.
///
/// Every statement is recorded. Calls to [`SqlExecutor::execute`] are
/// additionally tracked with an in-flight gauge (and an optional artificial
/// delay) so tests can assert how many mutation steps ran concurrently.
#[derive(Debug)]
pub struct ScriptedExecutor {
    rules: Vec<Rule>,
    log: Mutex<Vec<String>>,
    execute_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    /// Starts building a scripted executor.
    pub fn builder() -> ScriptedExecutorBuilder {
        ScriptedExecutorBuilder {
            rules: Vec::new(),
            execute_delay: None,
        }
    }

    /// All statements seen so far, in arrival order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Statements containing `needle`, in arrival order.
    pub fn statements_matching(&self, needle: &str) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| sql.contains(needle))
            .collect()
    }

    /// High-water mark of concurrent [`SqlExecutor::execute`] calls.
    pub fn max_concurrent_executions(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, sql: &str) -> Result<String> {
        self.log.lock().unwrap().push(sql.to_string());

        for rule in &self.rules {
            if !sql.contains(&rule.needle) {
                continue;
            }
            let mut responses = rule.responses.lock().unwrap();
            let response = if responses.len() > 1 {
                responses.pop_front().expect("non-empty response queue")
            } else {
                responses.front().expect("non-empty response queue").clone()
            };
            return match response {
                Response::Output(output) => Ok(output),
                Response::Failure { exit_code, stderr } => Err(Error::execution(exit_code, stderr)),
            };
        }

        Ok(String::new())
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn query(&self, sql: &str) -> Result<String> {
        self.respond(sql).map(|output| output.trim().to_string())
    }

    async fn execute(&self, sql: &str) -> Result<MutationOutcome> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.execute_delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.respond(sql);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result.map(|output| MutationOutcome {
            rows_affected: parse_affected_rows(&output),
            command_tag: output.trim().to_string(),
        })
    }
}

/// Builder for [`ScriptedExecutor`].
#[derive(Debug)]
pub struct ScriptedExecutorBuilder {
    rules: Vec<Rule>,
    execute_delay: Option<Duration>,
}

impl ScriptedExecutorBuilder {
    /// Answers every statement containing `needle` with `output`.
    #[must_use]
    pub fn on(mut self, needle: impl Into<String>, output: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            responses: Mutex::new(VecDeque::from([Response::Output(output.into())])),
        });
        self
    }

    /// Answers successive matching statements with successive outputs; the
    /// last output repeats once the earlier ones are consumed.
    #[must_use]
    pub fn on_seq<I, S>(mut self, needle: impl Into<String>, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let responses: VecDeque<Response> = outputs
            .into_iter()
            .map(|output| Response::Output(output.into()))
            .collect();
        assert!(!responses.is_empty(), "on_seq requires at least one output");
        self.rules.push(Rule {
            needle: needle.into(),
            responses: Mutex::new(responses),
        });
        self
    }

    /// Fails every statement containing `needle` with the given stderr text.
    #[must_use]
    pub fn fail_on(mut self, needle: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            responses: Mutex::new(VecDeque::from([Response::Failure {
                exit_code: 1,
                stderr: stderr.into(),
            }])),
        });
        self
    }

    /// Delays every `execute` call, forcing overlap so the in-flight gauge
    /// observes real concurrency (pair with a paused-clock runtime).
    #[must_use]
    pub fn execute_delay(mut self, delay: Duration) -> Self {
        self.execute_delay = Some(delay);
        self
    }

    /// Finalizes the executor.
    pub fn build(self) -> ScriptedExecutor {
        ScriptedExecutor {
            rules: self.rules,
            log: Mutex::new(Vec::new()),
            execute_delay: self.execute_delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}
