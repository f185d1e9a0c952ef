//! Progress reporting.
//!
//! Pipeline stages narrate what they do through a [`Reporter`] instead of
//! writing to the console, so callers decide where the narration goes.

use std::fmt;

/// Pipeline stage a progress message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Scan,
    Optimize,
    Emit,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prepare => "prepare",
            Stage::Scan => "scan",
            Stage::Optimize => "optimize",
            Stage::Emit => "emit",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Receives progress messages from the pipeline
pub trait Reporter {
    fn report(&self, stage: Stage, message: &str);
}

/// Forwards progress to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, stage: Stage, message: &str) {
        tracing::info!(%stage, "{}", message);
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _stage: Stage, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Prepare.to_string(), "prepare");
        assert_eq!(Stage::Write.to_string(), "write");
    }
}
