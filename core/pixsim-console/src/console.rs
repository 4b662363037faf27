//! A console session: the namespace plus its log.

use crate::config::ConsoleConfig;
use crate::history::CommandLog;
use crate::namespace::Namespace;
use pixsim_types::ConsoleEntry;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Console {
    namespace: Namespace,
    log: CommandLog,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            log: CommandLog::new(&config),
            namespace: Namespace::new(config),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut CommandLog {
        &mut self.log
    }

    /// Evaluates one line and logs it.
    ///
    /// Deferred operation results are awaited before the outcome is logged.
    /// Errors end up as `error` entries; they are never returned. `None`
    /// means the line was blank.
    pub async fn submit(&mut self, line: &str) -> Option<ConsoleEntry> {
        self.log.record_input(line)?;
        debug!(command = %line.trim(), "evaluating");

        let result = match self.namespace.evaluate(line) {
            Ok(outcome) => outcome.resolve().await,
            Err(e) => Err(e),
        };
        Some(self.log.record_result(result).clone())
    }
}
