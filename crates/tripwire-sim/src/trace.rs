//! Line traces against axis-aligned colliders.
//!
//! Segment-vs-box slab test over every collider the mask can see. The
//! nearest entry wins; ties go to the lowest handle so results do not depend
//! on archetype iteration order.

use glam::DVec3;
use hecs::World;

use tripwire_core::enums::TraceMask;
use tripwire_core::types::{EntityHandle, Pose};
use tripwire_device::host::TraceResult;

use crate::components::{Collider, ColliderKind};
use crate::host::handle_of;

/// Where a segment meets a box.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Contact {
    /// The segment starts inside the box.
    Inside,
    /// The segment enters the box at `fraction` through a face with `normal`.
    Enter { fraction: f64, normal: DVec3 },
}

fn mask_sees(mask: TraceMask, kind: ColliderKind) -> bool {
    match mask {
        TraceMask::Shot => true,
        TraceMask::Solid => kind == ColliderKind::Solid,
    }
}

/// Slab test of the segment `from + t * delta`, `t` in `[0, 1)`.
fn segment_vs_box(from: DVec3, delta: DVec3, min: DVec3, max: DVec3) -> Option<Contact> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    let mut normal = DVec3::ZERO;

    for axis in 0..3 {
        let origin = from[axis];
        let d = delta[axis];
        if d.abs() < 1e-12 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        let mut face = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            face = 1.0;
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = DVec3::ZERO;
            normal[axis] = face;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        // Starts inside only if it is still inside just after the start.
        return (t_exit > 0.0).then_some(Contact::Inside);
    }
    (t_enter < 1.0).then_some(Contact::Enter {
        fraction: t_enter,
        normal,
    })
}

/// Trace `from -> to` through every collider visible to `mask`.
pub fn trace_line(
    world: &World,
    from: DVec3,
    to: DVec3,
    mask: TraceMask,
    ignore: &[EntityHandle],
) -> TraceResult {
    let delta = to - from;
    let mut inside: Option<EntityHandle> = None;
    let mut nearest: Option<(f64, EntityHandle, DVec3)> = None;

    let mut query = world.query::<(&Pose, &Collider)>();
    for (entity, (pose, collider)) in query.iter() {
        let handle = handle_of(entity);
        if ignore.contains(&handle) || !mask_sees(mask, collider.kind) {
            continue;
        }

        let min = pose.position - collider.half_extents;
        let max = pose.position + collider.half_extents;
        match segment_vs_box(from, delta, min, max) {
            Some(Contact::Inside) => {
                if inside.map_or(true, |h| handle < h) {
                    inside = Some(handle);
                }
            }
            Some(Contact::Enter { fraction, normal }) => {
                let closer = nearest.map_or(true, |(f, h, _)| {
                    fraction < f || (fraction == f && handle < h)
                });
                if closer {
                    nearest = Some((fraction, handle, normal));
                }
            }
            None => {}
        }
    }

    if let Some(handle) = inside {
        return TraceResult {
            entity: Some(handle),
            fraction: 0.0,
            start_solid: true,
            end_pos: from,
            normal: DVec3::ZERO,
        };
    }

    match nearest {
        Some((fraction, handle, normal)) => TraceResult {
            entity: Some(handle),
            fraction,
            start_solid: false,
            end_pos: from + delta * fraction,
            normal,
        },
        None => TraceResult::clear(to),
    }
}
