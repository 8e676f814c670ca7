//! Per-step outcome counts.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// The steps of a run, in the order they execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    List,
    Decode,
    Fingerprint,
    Frames,
    Assemble,
}

impl Step {
    pub const ALL: [Step; 5] = [Self::List, Self::Decode, Self::Fingerprint, Self::Frames, Self::Assemble];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Decode => "decode",
            Self::Fingerprint => "fingerprint",
            Self::Frames => "frames",
            Self::Assemble => "assemble",
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.pad(self.as_str())
    }
}

/// How a single item finished, when it didn't fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Nothing to do: output already present, input too short, or a clip
    /// without any resolvable frame.
    Skipped,
}

/// The first item of a batch that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Source path, relative to the cache root where there is one.
    pub path: String,
    pub reason: String,
}

/// Aggregate outcome of one step.
///
/// Item failures are counted, never enumerated; only the first one keeps
/// its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub step: Step,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub first_failure: Option<Failure>,
}

impl BatchReport {
    pub fn new(step: Step) -> Self {
        Self { step, succeeded: 0, skipped: 0, failed: 0, first_failure: None }
    }

    pub fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Done => self.succeeded += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        if self.first_failure.is_none() {
            self.first_failure = Some(Failure { path: path.into(), reason: reason.into() });
        }
    }

    /// Fold another report for the same step into this one.
    ///
    /// The receiver's first failure is kept if both have one.
    pub fn merge(&mut self, other: BatchReport) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        if self.first_failure.is_none() {
            self.first_failure = other.first_failure;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// One summary line, plus a warning for the first failure if any.
    pub fn log(&self) {
        tracing::info!(
            step = %self.step,
            succeeded = self.succeeded,
            skipped = self.skipped,
            failed = self.failed,
            "step finished"
        );
        if let Some(failure) = &self.first_failure {
            tracing::warn!(
                step = %self.step,
                failed = self.failed,
                path = %failure.path,
                reason = %failure.reason,
                "first failure"
            );
        }
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:<11} {} succeeded, {} skipped, {} failed",
            self.step, self.succeeded, self.skipped, self.failed
        )?;
        if let Some(failure) = &self.first_failure {
            write!(f, " (first failure: {}: {})", failure.path, failure.reason)?;
        }
        Ok(())
    }
}
