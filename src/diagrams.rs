//! Closed-form internal-force diagram reconstruction.
//!
//! The solver reports frame forces at the two end stations only. For a
//! member whose distributed load is absent or uniform, shear varies
//! linearly along the span, so the bending moment follows from
//! integrating dM/dx = V analytically. That turns two sparse samples into
//! a smooth quadratic diagram without another solver call.

use tracing::debug;

use crate::model::StructuralModel;
use crate::results::{AnalysisResults, FrameForces, FrameResult};

/// Default number of evenly spaced stations per frame
pub const DEFAULT_NUM_POINTS: usize = 21;

/// Replace each frame's two-station forces with `num_points` stations.
///
/// Axial force and torsion interpolate linearly; so do both shears. The
/// moments integrate the linear shear field: in normalized station t and
/// length L, `M3(t) = M3_i + V2_i*(t*L) + (V2_j - V2_i)*(t*L)*t/2`, and
/// M2 likewise from V3.
///
/// Enrichment is best effort: frames whose geometry cannot be resolved,
/// or with fewer than two stations, keep their original result unchanged.
/// A successful analysis is never downgraded here.
pub fn enrich_frame_results(
    results: &mut AnalysisResults,
    model: &StructuralModel,
    num_points: usize,
) {
    if num_points < 2 {
        return;
    }

    for (frame_id, fr) in results.frame_results.iter_mut() {
        if fr.forces.len() < 2 {
            debug!(frame_id, stations = fr.forces.len(), "too few stations, keeping sparse result");
            continue;
        }
        let Ok(length) = model.frame_length(*frame_id) else {
            debug!(frame_id, "frame missing from model, keeping sparse result");
            continue;
        };
        if !length.is_finite() || length < 1e-10 {
            debug!(frame_id, length, "degenerate frame length, keeping sparse result");
            continue;
        }

        let Some(forces_i) = fr.forces.first().copied() else {
            continue;
        };
        let Some(forces_j) = fr.forces.last().copied() else {
            continue;
        };

        *fr = reconstruct(*frame_id, &forces_i, &forces_j, length, num_points);
    }
    debug!(frames = results.frame_results.len(), num_points, "enriched frame diagrams");
}

fn reconstruct(
    frame_id: u32,
    forces_i: &FrameForces,
    forces_j: &FrameForces,
    length: f64,
    num_points: usize,
) -> FrameResult {
    let dv2 = forces_j.v2 - forces_i.v2;
    let dv3 = forces_j.v3 - forces_i.v3;

    let mut forces = Vec::with_capacity(num_points);
    for i in 0..num_points {
        let t = i as f64 / (num_points - 1) as f64;
        let x = t * length;

        forces.push(FrameForces {
            location: t,
            p: forces_i.p + t * (forces_j.p - forces_i.p),
            t: forces_i.t + t * (forces_j.t - forces_i.t),
            v2: forces_i.v2 + t * dv2,
            v3: forces_i.v3 + t * dv3,
            m3: forces_i.m3 + forces_i.v2 * x + dv2 * x * t / 2.0,
            m2: forces_i.m2 + forces_i.v3 * x + dv3 * x * t / 2.0,
        });
    }

    FrameResult { frame_id, forces }
}
