//! Persistent generators — spawn repeatedly over the run.
//!
//! `should_generate(dt)` is polled once per step and is **edge-triggered**:
//! it returns `true` exactly once per met condition and re-arms only when
//! the condition is met again (next interval elapsed, next schedule entry
//! reached, next external trigger).  After a `true`, `spawn_rate()` reports
//! the batch size and `position`/`orientation` are indexed `0..spawn_rate()`
//! for that batch.

use crowd_core::{SimRng, Vec2};

use crate::generator::{AgentGenerator, RectGridGenerator, SpawnNoise};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A generator that keeps producing agents over the course of the run.
pub trait PersistentGenerator: AgentGenerator {
    /// Poll the trigger condition.  Consuming: a `true` result arms one
    /// spawn batch and the next poll is `false` until the condition is met
    /// again.  `dt` is the timestep of the step being processed.
    fn should_generate(&mut self, dt: f32) -> bool;

    /// Number of agents to spawn for the batch armed by the last `true`
    /// poll.
    fn spawn_rate(&self) -> usize;

    /// Downcast hook used by the control surface to reach an
    /// [`ExternalGenerator`] through a `dyn PersistentGenerator`.
    fn as_external_mut(&mut self) -> Option<&mut ExternalGenerator> {
        None
    }
}

// ── ConstantRateGenerator ────────────────────────────────────────────────────

/// Spawns `rate` agents at a fixed point every `interval` seconds.
pub struct ConstantRateGenerator {
    position: Vec2,
    noise: SpawnNoise,
    interval: f32,
    rate: usize,
    elapsed: f32,
    generated: usize,
}

impl ConstantRateGenerator {
    pub fn new(position: Vec2, interval: f32, rate: usize) -> Self {
        Self {
            position,
            noise: SpawnNoise::position(0.25),
            interval,
            rate,
            elapsed: 0.0,
            generated: 0,
        }
    }

    pub fn with_noise(mut self, noise: SpawnNoise) -> Self {
        self.noise = noise;
        self
    }
}

impl AgentGenerator for ConstantRateGenerator {
    fn agent_count(&self) -> usize {
        self.generated
    }

    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(i < self.rate, "constant-rate generator indexed at {i} beyond batch {}", self.rate);
        self.noise.apply_position(self.position, rng)
    }
}

impl PersistentGenerator for ConstantRateGenerator {
    fn should_generate(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            // Carry the remainder so long-run spawn frequency stays exact.
            self.elapsed -= self.interval;
            self.generated += self.rate;
            return true;
        }
        false
    }

    fn spawn_rate(&self) -> usize {
        self.rate
    }
}

// ── TimedGenerator ───────────────────────────────────────────────────────────

/// Spawns per a schedule of `(time, count)` entries, in a grid template.
///
/// Each entry fires exactly once, at the first step whose simulated time
/// reaches it; entries are consumed in time order.
pub struct TimedGenerator {
    template: RectGridGenerator,
    /// Sorted ascending by time.
    schedule: Vec<(f32, usize)>,
    next: usize,
    time: f32,
    /// Batch size armed by the last fired entry.
    pending: usize,
    generated: usize,
}

impl TimedGenerator {
    /// `schedule` is sorted by time on construction.
    pub fn new(template: RectGridGenerator, mut schedule: Vec<(f32, usize)>) -> Self {
        schedule.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { template, schedule, next: 0, time: 0.0, pending: 0, generated: 0 }
    }
}

impl AgentGenerator for TimedGenerator {
    fn agent_count(&self) -> usize {
        self.generated
    }

    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(i < self.pending, "timed generator indexed at {i} beyond batch {}", self.pending);
        self.template.position(i, rng)
    }
}

impl PersistentGenerator for TimedGenerator {
    fn should_generate(&mut self, dt: f32) -> bool {
        self.time += dt;
        if let Some(&(at, count)) = self.schedule.get(self.next) {
            if self.time >= at {
                self.next += 1;
                self.pending = count;
                self.generated += count;
                return true;
            }
        }
        false
    }

    fn spawn_rate(&self) -> usize {
        self.pending
    }
}

// ── ExternalGenerator ────────────────────────────────────────────────────────

/// Spawn slots pushed in from outside the simulator, armed by
/// [`trigger`](Self::trigger).
///
/// The embedding code pushes `(position, orientation)` slots, then calls
/// `trigger()`; the next step's poll consumes the whole slot list as one
/// batch.  Triggering again re-arms the same list (the slot list is a
/// reusable template, not a queue); `clear_slots` empties it.
pub struct ExternalGenerator {
    slots: Vec<(Vec2, Vec2)>,
    noise: SpawnNoise,
    /// Index of the first unconsumed slot; `slots.len()` when disarmed.
    consumed: usize,
    /// Batch bounds captured when the trigger is consumed.
    batch_base: usize,
    batch_len: usize,
    generated: usize,
}

impl ExternalGenerator {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            noise: SpawnNoise::none(),
            consumed: 0,
            batch_base: 0,
            batch_len: 0,
            generated: 0,
        }
    }

    pub fn with_noise(mut self, noise: SpawnNoise) -> Self {
        self.noise = noise;
        self
    }

    /// Push a spawn slot with an explicit orientation.
    pub fn push_slot(&mut self, position: Vec2, orientation: Vec2) {
        self.slots.push((position, orientation.normalize_or(Vec2::UNIT_Y)));
    }

    /// Push a spawn slot facing +Y (the position-only embedding call).
    pub fn push_position(&mut self, position: Vec2) {
        self.push_slot(position, Vec2::UNIT_Y);
    }

    /// Drop all slots (and any armed batch).
    pub fn clear_slots(&mut self) {
        self.slots.clear();
        self.consumed = 0;
        self.batch_len = 0;
        self.batch_base = 0;
    }

    /// Arm a spawn of the current slot list.
    pub fn trigger(&mut self) {
        self.consumed = 0;
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Default for ExternalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentGenerator for ExternalGenerator {
    fn agent_count(&self) -> usize {
        self.generated
    }

    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(i < self.batch_len, "external generator indexed at {i} beyond batch {}", self.batch_len);
        self.noise.apply_position(self.slots[self.batch_base + i].0, rng)
    }

    fn orientation(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(i < self.batch_len, "external generator indexed at {i} beyond batch {}", self.batch_len);
        self.noise.apply_orientation(self.slots[self.batch_base + i].1, rng)
    }
}

impl PersistentGenerator for ExternalGenerator {
    fn should_generate(&mut self, _dt: f32) -> bool {
        if self.consumed < self.slots.len() {
            self.batch_base = self.consumed;
            self.batch_len = self.slots.len() - self.consumed;
            self.consumed = self.slots.len();
            self.generated += self.batch_len;
            return true;
        }
        false
    }

    fn spawn_rate(&self) -> usize {
        self.batch_len
    }

    fn as_external_mut(&mut self) -> Option<&mut ExternalGenerator> {
        Some(self)
    }
}
