//! Caller-owned batch state.

use std::sync::Arc;

use crate::codec::ImageCodec;
use crate::error::Error;
use crate::job::{Artifact, ConversionJob, TargetVariant};
use crate::pipeline::{BatchPipeline, CancellationToken};

/// Counts over a session's jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Jobs with an artifact.
    pub succeeded: usize,
    /// Jobs that failed.
    pub failed: usize,
    /// Jobs not processed yet.
    pub pending: usize,
}

impl BatchSummary {
    /// Total number of jobs.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.pending
    }
}

/// An ordered collection of sources and their conversion results.
///
/// Sources accumulate across runs until [`BatchSession::clear`]; each run
/// processes only the jobs added since the previous one.
#[derive(Debug, Default)]
pub struct BatchSession {
    jobs: Vec<ConversionJob>,
}

impl BatchSession {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a source for the next run.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        variant: TargetVariant,
    ) {
        self.jobs.push(ConversionJob::new(name, bytes, variant));
    }

    /// Run all pending jobs through `pipeline`.
    pub fn run<C: ImageCodec>(&mut self, pipeline: &BatchPipeline<C>) -> BatchSummary {
        self.run_cancellable(pipeline, &CancellationToken::new())
    }

    /// Run all pending jobs, honoring `cancel`.
    pub fn run_cancellable<C: ImageCodec>(
        &mut self,
        pipeline: &BatchPipeline<C>,
        cancel: &CancellationToken,
    ) -> BatchSummary {
        let jobs = std::mem::take(&mut self.jobs);
        self.jobs = pipeline.run_cancellable(jobs, cancel);
        self.summary()
    }

    /// All jobs in submission order.
    #[must_use]
    pub fn jobs(&self) -> &[ConversionJob] {
        &self.jobs
    }

    /// Successful artifacts in submission order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.jobs.iter().filter_map(ConversionJob::artifact)
    }

    /// Failed jobs with their errors, in submission order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.jobs
            .iter()
            .filter_map(|j| j.failure().map(|e| (j.source_name(), e)))
    }

    /// Count jobs by state.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for job in &self.jobs {
            if job.artifact().is_some() {
                summary.succeeded += 1;
            } else if job.failure().is_some() {
                summary.failed += 1;
            } else {
                summary.pending += 1;
            }
        }
        summary
    }

    /// Drop every job and artifact.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }
}
