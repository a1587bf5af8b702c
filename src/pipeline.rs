//! Concurrent batch conversion.
//!
//! Every pending job is handed to rayon at once. A failing job records its
//! error and leaves its siblings alone; the returned jobs keep input order.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::codec::{ImageCodec, PngCodec};
use crate::error::{Error, Result};
use crate::job::{ConversionJob, TargetVariant};

/// Options for [`BatchPipeline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Dedicated worker count. `None` uses rayon's global pool.
    pub threads: Option<NonZeroUsize>,
}

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Checked before each job starts. Jobs already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs [`ConversionJob`]s concurrently through an [`ImageCodec`].
pub struct BatchPipeline<C = PngCodec> {
    codec: C,
    pool: Option<rayon::ThreadPool>,
}

impl BatchPipeline<PngCodec> {
    /// A PNG pipeline on rayon's global pool.
    #[must_use]
    pub fn png() -> Self {
        Self {
            codec: PngCodec,
            pool: None,
        }
    }
}

impl<C: ImageCodec> BatchPipeline<C> {
    /// Create a pipeline for `codec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ThreadPool`] if a dedicated pool was requested and
    /// could not be built.
    pub fn new(codec: C, opts: PipelineOptions) -> Result<Self> {
        let pool = match opts.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n.get())
                    .thread_name(|i| format!("premult-{i}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(Self { codec, pool })
    }

    /// The codec used for decode and standard encode.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Process every pending job. See [`BatchPipeline::run_cancellable`].
    #[must_use]
    pub fn run(&self, jobs: Vec<ConversionJob>) -> Vec<ConversionJob> {
        self.run_cancellable(jobs, &CancellationToken::new())
    }

    /// Build one job per `(name, bytes)` source, all targeting `variant`, and run them.
    #[must_use]
    pub fn run_sources<I, N, B>(&self, sources: I, variant: TargetVariant) -> Vec<ConversionJob>
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<Arc<[u8]>>,
    {
        let jobs = sources
            .into_iter()
            .map(|(name, bytes)| ConversionJob::new(name, bytes, variant))
            .collect();
        self.run(jobs)
    }

    /// Process every pending job, skipping jobs that have not started once
    /// `cancel` is set. Skipped jobs settle as [`Error::Cancelled`], so the
    /// result always holds one settled job per input, in input order.
    /// Jobs that were already settled are returned untouched.
    #[must_use]
    #[tracing::instrument(skip_all, fields(jobs = jobs.len()))]
    pub fn run_cancellable(
        &self,
        mut jobs: Vec<ConversionJob>,
        cancel: &CancellationToken,
    ) -> Vec<ConversionJob> {
        match &self.pool {
            Some(pool) => pool.install(|| self.process(&mut jobs, cancel)),
            None => self.process(&mut jobs, cancel),
        }

        let failed = jobs.iter().filter(|j| j.failure().is_some()).count();
        tracing::info!(total = jobs.len(), failed, "batch finished");
        jobs
    }

    fn process(&self, jobs: &mut [ConversionJob], cancel: &CancellationToken) {
        let codec: &dyn ImageCodec = &self.codec;
        jobs.par_iter_mut()
            .filter(|job| job.is_pending())
            .for_each(|job| {
                if cancel.is_cancelled() {
                    job.settle(Err(Error::Cancelled));
                    return;
                }
                let result = job.convert(codec);
                match &result {
                    Ok(artifact) => tracing::debug!(
                        source = job.source_name(),
                        output = %artifact.filename,
                        bytes = artifact.bytes.len(),
                        "converted"
                    ),
                    Err(e) => tracing::warn!(
                        source = job.source_name(),
                        kind = ?e.kind(),
                        "conversion failed: {e}"
                    ),
                }
                job.settle(result);
            });
    }
}
