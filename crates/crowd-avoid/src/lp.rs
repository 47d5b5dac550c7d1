//! Incremental half-plane intersection in velocity space.
//!
//! The resolver's optimization problem — "closest admissible velocity to the
//! preferred velocity, inside the max-speed disc, left of every constraint
//! line" — is a tiny 2-D linear program.  It is solved incrementally: walk
//! the constraints in order, and whenever the current optimum violates one,
//! re-optimize on that constraint's boundary subject to all earlier
//! constraints (a 1-D sub-problem on the line).
//!
//! When the constraint set is mutually infeasible (dense crowds), the
//! fallback program finds the velocity minimizing the maximum violation
//! depth across the violated constraints — the "least-bad" velocity.
//! Obstacle constraints are never relaxed: walls are hard, other agents are
//! not.
//!
//! All functions return finite velocities for every input; degenerate
//! constraint geometry falls through to the previous best estimate rather
//! than erroring.

use crowd_core::Vec2;

use crate::OrcaLine;

const EPSILON: f32 = 1e-5;

/// 1-D sub-problem: optimize along the boundary of `lines[index]`, subject
/// to constraints `lines[..index]` and the speed disc.
///
/// `optimize_dir = false` finds the closest point to `opt_vel`;
/// `optimize_dir = true` maximizes in the direction of `opt_vel` (used by
/// the infeasibility fallback).
///
/// Returns `false` when the sub-problem is itself infeasible; `result` is
/// left untouched in that case.
pub fn solve_on_line(
    lines: &[OrcaLine],
    index: usize,
    max_speed: f32,
    opt_vel: Vec2,
    optimize_dir: bool,
    result: &mut Vec2,
) -> bool {
    let line = &lines[index];
    let dot = line.point.dot(line.dir);
    let disc = dot * dot + max_speed * max_speed - line.point.length_sq();
    if disc < 0.0 {
        // The speed disc lies entirely on the infeasible side of this line.
        return false;
    }

    let sq = disc.sqrt();
    let mut t_left = -dot - sq;
    let mut t_right = -dot + sq;

    for prev in &lines[..index] {
        let denom = line.dir.det(prev.dir);
        let numer = prev.dir.det(line.point - prev.point);

        if denom.abs() <= EPSILON {
            // Parallel boundaries: either redundant or contradictory.
            if numer < 0.0 {
                return false;
            }
            continue;
        }

        // On the line v(t) = point + t·dir, constraint `prev` reads
        // t·denom ≤ numer: an upper bound when denom > 0, lower otherwise.
        let t = numer / denom;
        if denom > 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }
        if t_left > t_right {
            return false;
        }
    }

    let t = if optimize_dir {
        // Extreme feasible point in the direction of opt_vel.
        if line.dir.dot(opt_vel) > 0.0 { t_right } else { t_left }
    } else {
        // Closest feasible point on the boundary to opt_vel.
        line.dir.dot(opt_vel - line.point).clamp(t_left, t_right)
    };
    *result = line.point + line.dir * t;
    true
}

/// 2-D program: walk all constraint lines, repairing the optimum whenever a
/// line is violated.
///
/// Returns `lines.len()` on full success, or the index of the first
/// constraint that could not be satisfied; `result` then holds the optimum
/// of the feasible prefix.
pub fn solve_half_planes(
    lines: &[OrcaLine],
    max_speed: f32,
    opt_vel: Vec2,
    optimize_dir: bool,
    result: &mut Vec2,
) -> usize {
    if optimize_dir {
        // opt_vel is a direction in this mode; start at the disc boundary.
        *result = opt_vel * max_speed;
    } else if result.length_sq() > max_speed * max_speed {
        *result = result.normalize() * max_speed;
    }

    for i in 0..lines.len() {
        if lines[i].violation(*result) > 0.0 {
            let saved = *result;
            if !solve_on_line(lines, i, max_speed, opt_vel, optimize_dir, result) {
                *result = saved;
                return i;
            }
        }
    }
    lines.len()
}

/// Infeasibility fallback: minimize the maximum violation depth over the
/// constraints from `begin` onward.
///
/// `num_fixed` is the count of leading constraints (obstacles) that stay
/// hard: the fallback projects the remaining constraints but never trades
/// violation against the fixed prefix.
pub fn minimize_violation(
    lines: &[OrcaLine],
    num_fixed: usize,
    begin: usize,
    max_speed: f32,
    result: &mut Vec2,
) {
    let mut depth = 0.0_f32;

    for i in begin..lines.len() {
        if lines[i].violation(*result) <= depth {
            continue;
        }

        // Project every relaxable constraint before `i` onto the boundary of
        // constraint `i`; the fixed prefix is carried over unchanged.
        let mut proj: Vec<OrcaLine> = lines[..num_fixed].to_vec();
        for j in num_fixed..i {
            let denom = lines[i].dir.det(lines[j].dir);
            let point = if denom.abs() <= EPSILON {
                if lines[i].dir.dot(lines[j].dir) > 0.0 {
                    // Same direction: constraint j is subsumed by i.
                    continue;
                }
                // Opposite direction: split the difference.
                (lines[i].point + lines[j].point) * 0.5
            } else {
                let t = lines[j].dir.det(lines[i].point - lines[j].point) / denom;
                lines[i].point + lines[i].dir * t
            };
            proj.push(OrcaLine::new(
                point,
                (lines[j].dir - lines[i].dir).normalize(),
            ));
        }

        // Optimize perpendicular to constraint i (deeper into its feasible
        // side), i.e. reduce i's violation as much as the others allow.
        let saved = *result;
        if solve_half_planes(&proj, max_speed, lines[i].dir.perp(), true, result) < proj.len() {
            // Numerically infeasible sub-problem; keep the previous best.
            *result = saved;
        }
        depth = lines[i].violation(*result);
    }
}
