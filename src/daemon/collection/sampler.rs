use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    daemon::{
        processing::summarize::Summarizer,
        storage::{
            entities::{ActivitySample, SampleKind, SampleWindow, WindowSummary},
            summary_storage::SummarySink,
        },
    },
    utils::clock::Clock,
};

use super::capture::ActivityCapture;

pub const DEFAULT_SAMPLING_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_WINDOW_THRESHOLD: usize = 15;

#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Time between two ticks. Every sample is attributed this much time.
    pub period: Duration,
    /// Number of samples that makes a window. Must be at least 1.
    pub threshold: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_SAMPLING_PERIOD,
            threshold: DEFAULT_WINDOW_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplerStatus {
    pub running: bool,
    pub last_message: Option<String>,
}

/// Samples user activity on a fixed period and summarizes every full window of samples.
///
/// There should be one sampler per process, owned by whoever runs the daemon. `start` and
/// `stop` are idempotent. Nothing that goes wrong inside a tick escapes it: failures are logged
/// and the latest one can be read through [ActivitySampler::status].
///
/// Every tick runs in its own task, so a slow capture or summarizer never delays the timer.
/// Results of ticks that finish after `stop` are thrown away.
#[derive(Clone)]
pub struct ActivitySampler {
    inner: Arc<SamplerInner>,
}

struct SamplerInner {
    config: SamplerConfig,
    capture: Box<dyn ActivityCapture>,
    summarizer: Box<dyn Summarizer>,
    sink: Box<dyn SummarySink>,
    clock: Box<dyn Clock>,
    state: Mutex<SamplerState>,
}

#[derive(Default)]
struct SamplerState {
    run: Option<ActiveRun>,
    /// Bumped on every start so ticks of an older run can recognize themselves.
    generation: u64,
    buffer: Vec<ActivitySample>,
    last_message: Option<String>,
}

struct ActiveRun {
    generation: u64,
    cancel: CancellationToken,
}

impl SamplerState {
    fn is_current(&self, generation: u64) -> bool {
        matches!(&self.run, Some(run) if run.generation == generation)
    }
}

impl ActivitySampler {
    pub fn new(
        config: SamplerConfig,
        capture: Box<dyn ActivityCapture>,
        summarizer: Box<dyn Summarizer>,
        sink: Box<dyn SummarySink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(SamplerInner {
                config,
                capture,
                summarizer,
                sink,
                clock,
                state: Mutex::new(SamplerState::default()),
            }),
        }
    }

    /// Starts the timer. The first sample is taken one period from now. Has to be called from
    /// within a tokio runtime.
    pub fn start(&self) {
        let mut state = self.inner.lock_state();
        if state.run.is_some() {
            debug!("Sampler is already running");
            return;
        }

        state.generation += 1;
        state.buffer.clear();
        let cancel = CancellationToken::new();
        state.run = Some(ActiveRun {
            generation: state.generation,
            cancel: cancel.clone(),
        });
        let generation = state.generation;
        drop(state);

        info!(
            "Starting sampler every {:?}, summarizing every {} samples",
            self.inner.config.period, self.inner.config.threshold
        );
        let first_tick = self.inner.clock.instant() + self.inner.config.period;
        tokio::spawn(
            self.inner
                .clone()
                .run_timer(generation, first_tick, cancel)
                .instrument(info_span!("sampler", generation)),
        );
    }

    /// Stops the timer and drops whatever was collected for the current window.
    pub fn stop(&self) {
        let mut state = self.inner.lock_state();
        let Some(run) = state.run.take() else {
            debug!("Sampler is not running");
            return;
        };
        run.cancel.cancel();
        state.buffer.clear();
        info!("Stopped sampler");
    }

    pub fn status(&self) -> SamplerStatus {
        let state = self.inner.lock_state();
        SamplerStatus {
            running: state.run.is_some(),
            last_message: state.last_message.clone(),
        }
    }
}

impl SamplerInner {
    fn lock_state(&self) -> MutexGuard<'_, SamplerState> {
        // The state stays consistent even if a holder panicked: every critical section is a
        // handful of plain assignments.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Executes the timer loop. Each tick is spawned separately so the cadence doesn't depend on
    /// how long capturing or summarizing takes.
    async fn run_timer(
        self: Arc<Self>,
        generation: u64,
        first_tick: tokio::time::Instant,
        cancel: CancellationToken,
    ) {
        let mut tick_point = first_tick;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sampler timer cancelled");
                    return;
                }
                _ = self.clock.sleep_until(tick_point) => ()
            }
            tick_point += self.config.period;

            tokio::spawn(
                self.clone()
                    .tick(generation)
                    .instrument(info_span!("tick", generation)),
            );
        }
    }

    async fn tick(self: Arc<Self>, generation: u64) {
        let timestamp = self.clock.time();
        let captured = self.capture.capture().await;

        let window = {
            let mut state = self.lock_state();
            if !state.is_current(generation) {
                debug!("Discarding capture of a stopped run");
                return;
            }

            match captured {
                Ok(description) => {
                    // Captures can finish out of order; the buffer stays in tick order.
                    let position = state
                        .buffer
                        .partition_point(|sample| sample.timestamp <= timestamp);
                    state.buffer.insert(
                        position,
                        ActivitySample {
                            timestamp,
                            description,
                            kind: SampleKind::ScreenCapture,
                            duration: chrono::Duration::from_std(self.config.period)
                                .unwrap_or(chrono::Duration::MAX),
                        },
                    );
                }
                Err(e) => {
                    error!("Encountered an error during capture {e:?}");
                    state.last_message = Some(format!("Capture failed: {e}"));
                    return;
                }
            }
            debug!("Buffered {} samples", state.buffer.len());

            // Taking the buffer under the same lock as the length check keeps the next tick from
            // seeing a window that is already on its way to the summarizer.
            if state.buffer.len() >= self.config.threshold {
                SampleWindow::new(std::mem::take(&mut state.buffer))
            } else {
                None
            }
        };

        if let Some(window) = window {
            self.flush(generation, window).await;
        }
    }

    async fn flush(&self, generation: u64, window: SampleWindow) {
        info!("Summarizing a window of {} samples", window.len());
        let message = match self.summarizer.summarize(&window).await {
            Ok(text) => {
                let summary = WindowSummary::new(&window, text);
                match self.sink.store(summary).await {
                    Ok(()) => {
                        info!("Stored summary of {} samples", window.len());
                        format!("Summarized {} samples", window.len())
                    }
                    Err(e) => {
                        error!("Failed to store summary {e:?}");
                        format!("Storing summary failed: {e}")
                    }
                }
            }
            Err(e) => {
                // The window is gone for good. Re-sending it would only grow the next payload.
                error!("Failed to summarize window of {} samples {e:?}", window.len());
                format!("Summarize failed: {e}")
            }
        };

        let mut state = self.lock_state();
        if state.is_current(generation) {
            state.last_message = Some(message);
        } else {
            warn!("Sampler stopped while summarizing, dropping status update");
        }
    }
}
