//! The base generator contract and the bulk (initial-population) variants.

use crowd_core::{SimRng, Vec2};

// ── SpawnNoise ───────────────────────────────────────────────────────────────

/// Bounded random perturbation applied to template positions and
/// orientations, so grid and point spawns do not produce degenerate
/// overlapping agents.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnNoise {
    /// Maximum positional offset in metres (uniform in a disc).
    pub radius: f32,
    /// Maximum orientation perturbation in radians (uniform in ±).
    pub angle: f32,
}

impl SpawnNoise {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn position(radius: f32) -> Self {
        Self { radius, angle: 0.0 }
    }

    /// Perturb a template position.
    pub fn apply_position(&self, p: Vec2, rng: &mut SimRng) -> Vec2 {
        if self.radius <= 0.0 {
            return p;
        }
        // Uniform over the disc: sqrt-distributed radius.
        let r = self.radius * rng.gen_range(0.0_f32..=1.0).sqrt();
        let theta = rng.gen_range(0.0_f32..std::f32::consts::TAU);
        p + Vec2::new(theta.cos(), theta.sin()) * r
    }

    /// Perturb a template orientation (stays unit length).
    pub fn apply_orientation(&self, o: Vec2, rng: &mut SimRng) -> Vec2 {
        if self.angle <= 0.0 {
            return o;
        }
        o.rotated(rng.gen_range(-self.angle..=self.angle))
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A population template: how many agents, and where each one starts.
///
/// # Panics
///
/// `position`/`orientation` with `i >= agent_count()` is a programming or
/// configuration error, not a runtime condition — implementations panic.
pub trait AgentGenerator: Send + Sync {
    /// Number of agents this generator contributes (for bulk variants) or
    /// has contributed so far (for persistent variants).
    fn agent_count(&self) -> usize;

    /// Starting position for the `i`-th agent of the current batch, with
    /// noise applied.
    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2;

    /// Starting orientation for the `i`-th agent of the current batch.
    /// Defaults to +Y.
    fn orientation(&self, _i: usize, _rng: &mut SimRng) -> Vec2 {
        Vec2::UNIT_Y
    }
}

// ── ExplicitGenerator ────────────────────────────────────────────────────────

/// A literal list of spawn positions.
pub struct ExplicitGenerator {
    positions: Vec<Vec2>,
    noise: SpawnNoise,
}

impl ExplicitGenerator {
    pub fn new(positions: Vec<Vec2>) -> Self {
        Self { positions, noise: SpawnNoise::none() }
    }

    pub fn with_noise(mut self, noise: SpawnNoise) -> Self {
        self.noise = noise;
        self
    }
}

impl AgentGenerator for ExplicitGenerator {
    fn agent_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(
            i < self.positions.len(),
            "explicit generator indexed at {i} beyond population {}",
            self.positions.len()
        );
        self.noise.apply_position(self.positions[i], rng)
    }
}

// ── RectGridGenerator ────────────────────────────────────────────────────────

/// A rotated rectangular lattice of spawn positions.
///
/// Agent `i` occupies column `i % x_count`, row `i / x_count`, offset from
/// `anchor` and rotated by `rotation` radians about it.
pub struct RectGridGenerator {
    pub anchor: Vec2,
    /// Spacing between columns (metres).
    pub x_spacing: f32,
    /// Spacing between rows (metres).
    pub y_spacing: f32,
    pub x_count: usize,
    pub y_count: usize,
    /// Counter-clockwise rotation of the lattice about `anchor`.
    pub rotation: f32,
    pub noise: SpawnNoise,
}

impl RectGridGenerator {
    pub fn new(anchor: Vec2, x_spacing: f32, y_spacing: f32, x_count: usize, y_count: usize) -> Self {
        Self {
            anchor,
            x_spacing,
            y_spacing,
            x_count,
            y_count,
            rotation: 0.0,
            noise: SpawnNoise::none(),
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_noise(mut self, noise: SpawnNoise) -> Self {
        self.noise = noise;
        self
    }

    /// Lattice position of slot `i`, before noise.
    fn slot(&self, i: usize) -> Vec2 {
        let col = (i % self.x_count) as f32;
        let row = (i / self.x_count) as f32;
        let local = Vec2::new(col * self.x_spacing, row * self.y_spacing);
        self.anchor + local.rotated(self.rotation)
    }
}

impl AgentGenerator for RectGridGenerator {
    fn agent_count(&self) -> usize {
        self.x_count * self.y_count
    }

    fn position(&self, i: usize, rng: &mut SimRng) -> Vec2 {
        assert!(
            i < self.agent_count(),
            "grid generator indexed at {i} beyond population {}",
            self.agent_count()
        );
        self.noise.apply_position(self.slot(i), rng)
    }
}
