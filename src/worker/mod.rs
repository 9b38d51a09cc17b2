pub mod capture;
pub mod playback;
pub mod timer;

use crate::error::{WorkerError, WorkerKind, WorkerResult};
use crate::log_event::{self, LogEvent};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub use capture::{Capture, CaptureOptions};
pub use playback::Playback;
pub use timer::CountdownTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// What a worker actually drives: the capture or playback primitive plus
/// whatever has to be set up around it.
///
/// Futures are not `Send` because audio stream handles are not.
#[async_trait(?Send)]
pub trait Strategy {
    /// Handed back by a successful stop.
    type Output;

    fn kind(&self) -> WorkerKind;

    /// File being written or played, for log lines.
    fn target(&self) -> Option<&Path>;

    async fn engage(&mut self) -> WorkerResult<()>;

    fn disengage(&mut self);

    fn is_engaged(&self) -> bool;

    /// Undo whatever a failed `engage` left behind.
    async fn rollback(&mut self) {}

    /// Called once the primitive is quiet.
    async fn finish(&mut self) -> WorkerResult<Self::Output>;
}

/// Start/stop lifecycle around a strategy, with an optional time limit.
///
/// `start` and `stop` take `&mut self`; callers that need to control one
/// worker from several tasks must wrap it themselves.
pub struct Worker<S: Strategy> {
    strategy: S,
    timer: CountdownTimer,
    state: WorkerState,
}

impl<S: Strategy> Worker<S> {
    /// `duration` is in units of `unit`; zero means no limit.
    pub fn new(strategy: S, duration: u64, unit: Duration) -> Self {
        let mut timer = CountdownTimer::new(unit);
        timer.arm(duration);
        Self {
            strategy,
            timer,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == WorkerState::Running
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Change the time limit for the next session.
    pub fn set_duration(&mut self, duration: u64) -> WorkerResult<()> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning(self.strategy.kind()));
        }
        self.timer.arm(duration);
        Ok(())
    }

    pub async fn start(&mut self) -> WorkerResult<()> {
        let kind = self.strategy.kind();
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning(kind));
        }

        self.timer.reset();

        if let Err(e) = self.strategy.engage().await {
            self.strategy.rollback().await;
            return Err(e);
        }

        if !self.strategy.is_engaged() {
            self.strategy.disengage();
            self.strategy.rollback().await;
            return Err(WorkerError::cannot_start(
                kind,
                "device did not report running after start",
            ));
        }

        self.state = WorkerState::Running;
        log_event::emit(started_event(kind), self.target_label());
        if !self.timer.is_unbounded() {
            log_event::emit(
                LogEvent::TimerArmed,
                format_args!("{} x {:?}", self.timer.duration(), self.timer.unit()),
            );
        }

        Ok(())
    }

    /// Stop the running session. If the device will not go quiet the worker
    /// stays `Running` and the call can be retried.
    pub async fn stop(&mut self) -> WorkerResult<S::Output> {
        let kind = self.strategy.kind();
        if !self.is_running() {
            return Err(WorkerError::AlreadyStopped(kind));
        }

        self.strategy.disengage();
        if self.strategy.is_engaged() {
            return Err(WorkerError::CannotStop(kind));
        }

        self.state = WorkerState::Stopped;
        log_event::emit(stopped_event(kind), self.target_label());

        self.strategy.finish().await
    }

    /// Drive the countdown until it stops the worker.
    ///
    /// Returns `Ok(None)` straight away for an unbounded worker, and also when
    /// the worker is stopped by other means while ticking.
    pub async fn run(&mut self) -> WorkerResult<Option<S::Output>> {
        if self.timer.is_unbounded() {
            return Ok(None);
        }

        while self.is_running() {
            self.timer.tick().await;

            let timer = self.timer;
            let stopping = timer.auto_stop(|| {
                log_event::emit(LogEvent::AutoStop, format_args!("after {}", timer.elapsed()));
                self.stop()
            });
            if let Some(stopping) = stopping {
                return stopping.await.map(Some);
            }
        }

        Ok(None)
    }

    fn target_label(&self) -> String {
        self.strategy
            .target()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }
}

fn started_event(kind: WorkerKind) -> LogEvent {
    match kind {
        WorkerKind::Capture => LogEvent::RecordingStarted,
        WorkerKind::Playback => LogEvent::PlaybackStarted,
    }
}

fn stopped_event(kind: WorkerKind) -> LogEvent {
    match kind {
        WorkerKind::Capture => LogEvent::RecordingStopped,
        WorkerKind::Playback => LogEvent::PlaybackStopped,
    }
}
