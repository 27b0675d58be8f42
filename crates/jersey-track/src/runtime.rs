//! Background analysis worker fed by a camera callback.
//!
//! The camera thread calls [`AnalyzerRuntime::submit`] for every frame. Every
//! other arrival is dropped up front, and frames arriving while the worker is
//! still busy are dropped too, so the camera never blocks and never queues
//! more than one frame.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use jersey_track_core::PlanarYuvFrame;
use jersey_track_detect::{NumberLocator, RosterFilter, TextRecognizer};
use jersey_track_tracker::TrackedPlayer;

use crate::FrameAnalyzer;

const WORKER_NAME: &str = "jersey-track-analyzer";

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("failed to spawn analysis worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// What happened to a submitted frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Handed to the worker.
    Queued,
    /// Dropped by the every-Nth-frame throttle.
    Throttled,
    /// Dropped because the previous frame is still being analyzed.
    Busy,
    /// The worker has stopped.
    Closed,
}

type StartedFn = Box<dyn FnMut() + Send>;
type TrackedFn = Box<dyn FnMut(Vec<TrackedPlayer>) + Send>;

/// Hooks invoked on the worker thread.
#[derive(Default)]
pub struct RuntimeCallbacks {
    on_processing_started: Option<StartedFn>,
    on_players_tracked: Option<TrackedFn>,
}

impl RuntimeCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per analyzed frame, before analysis starts.
    pub fn on_processing_started(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_processing_started = Some(Box::new(f));
        self
    }

    /// Called with the tracker output of every successfully analyzed frame.
    pub fn on_players_tracked(
        mut self,
        f: impl FnMut(Vec<TrackedPlayer>) + Send + 'static,
    ) -> Self {
        self.on_players_tracked = Some(Box::new(f));
        self
    }
}

/// Owns the worker thread that runs a [`FrameAnalyzer`].
pub struct AnalyzerRuntime {
    sender: Option<SyncSender<PlanarYuvFrame>>,
    worker: Option<JoinHandle<()>>,
    busy: Arc<AtomicBool>,
    reset_requested: Arc<AtomicBool>,
    roster: Arc<RwLock<RosterFilter>>,
    throttle_every: u64,
    arrivals: u64,
}

impl AnalyzerRuntime {
    /// Move `analyzer` onto a new worker thread.
    ///
    /// The throttle period comes from the analyzer's config and the initial
    /// roster filter from the analyzer itself.
    pub fn spawn<L, R>(
        analyzer: FrameAnalyzer<L, R>,
        callbacks: RuntimeCallbacks,
    ) -> Result<Self, RuntimeError>
    where
        L: NumberLocator + Send + 'static,
        R: TextRecognizer + Send + 'static,
    {
        let throttle_every = u64::from(analyzer.config().throttle_every.max(1));
        let roster = Arc::new(RwLock::new(analyzer.roster_filter().clone()));
        let busy = Arc::new(AtomicBool::new(false));
        let reset_requested = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::sync_channel::<PlanarYuvFrame>(1);

        let worker = {
            let busy = Arc::clone(&busy);
            let reset_requested = Arc::clone(&reset_requested);
            let roster = Arc::clone(&roster);
            thread::Builder::new()
                .name(WORKER_NAME.to_string())
                .spawn(move || {
                    let mut analyzer = analyzer;
                    let RuntimeCallbacks {
                        mut on_processing_started,
                        mut on_players_tracked,
                    } = callbacks;

                    for frame in receiver {
                        if reset_requested.swap(false, Ordering::AcqRel) {
                            analyzer.reset_tracking();
                        }
                        let current = roster
                            .read()
                            .unwrap_or_else(PoisonError::into_inner)
                            .clone();
                        analyzer.set_roster_filter(current);

                        if let Some(started) = on_processing_started.as_mut() {
                            started();
                        }
                        let outcome = {
                            let _busy = BusyGuard(&busy);
                            panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(&frame)))
                        };
                        drop(frame);

                        match outcome {
                            Ok(Ok(report)) => {
                                if let Some(tracked) = on_players_tracked.as_mut() {
                                    tracked(report.players);
                                }
                            }
                            Ok(Err(err)) => log::error!("frame analysis failed: {err}"),
                            Err(payload) => {
                                log::error!(
                                    "frame analysis panicked: {}",
                                    panic_message(payload.as_ref())
                                );
                                analyzer.reset_tracking();
                            }
                        }
                    }
                    log::debug!("analysis worker stopped");
                })?
        };

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            busy,
            reset_requested,
            roster,
            throttle_every,
            arrivals: 0,
        })
    }

    /// Offer a frame to the worker. Never blocks; dropped frames are released
    /// before this returns.
    pub fn submit(&mut self, frame: PlanarYuvFrame) -> SubmitOutcome {
        let arrival = self.arrivals;
        self.arrivals = self.arrivals.wrapping_add(1);
        if arrival % self.throttle_every != 0 {
            return SubmitOutcome::Throttled;
        }

        let Some(sender) = self.sender.as_ref() else {
            return SubmitOutcome::Closed;
        };
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::Busy;
        }
        match sender.try_send(frame) {
            Ok(()) => SubmitOutcome::Queued,
            Err(TrySendError::Full(_)) => SubmitOutcome::Busy,
            Err(TrySendError::Disconnected(_)) => {
                self.busy.store(false, Ordering::Release);
                SubmitOutcome::Closed
            }
        }
    }

    /// Replace the roster; the next analyzed frame uses it.
    pub fn set_roster_filter(&self, roster: RosterFilter) {
        *self.roster.write().unwrap_or_else(PoisonError::into_inner) = roster;
    }

    /// Forget all tracked players before the next analyzed frame.
    pub fn reset_tracking(&self) {
        self.reset_requested.store(true, Ordering::Release);
    }

    /// True while a frame is queued or being analyzed.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Stop accepting frames, let the worker finish its current frame and
    /// join it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("analysis worker panicked");
            }
        }
    }
}

/// Clears the busy flag when the frame is done, even if analysis unwound.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

impl Drop for AnalyzerRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}
