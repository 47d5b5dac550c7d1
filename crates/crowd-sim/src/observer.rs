//! Step observer trait for progress reporting and data collection.

use crowd_core::Tick;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Visualization layers typically read
/// the agent store from `on_step_end` — all access is `&self` on the sim by
/// then, read-only by construction.
pub trait StepObserver {
    /// Called at the very start of each step, before spawning.
    fn on_step_start(&mut self, _tick: Tick) {}

    /// Called once per spawn source that fired this step.
    fn on_spawn(&mut self, _tick: Tick, _source: &str, _count: usize) {}

    /// Called after integration, before the clock advances.
    fn on_step_end(&mut self, _tick: Tick, _agent_count: usize) {}
}

/// A [`StepObserver`] that does nothing.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}
