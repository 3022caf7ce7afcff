use crate::body::BoxBody;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Separation axis chosen by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, v: DVec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    fn of_mut(self, v: &mut DVec2) -> &mut f64 {
        match self {
            Axis::X => &mut v.x,
            Axis::Y => &mut v.y,
        }
    }
}

/// The correction [`resolve`] applied to a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub axis: Axis,
    /// Penetration depth along `axis` before correction.
    pub depth: f64,
}

/// Edge-based AABB intersection. Strict: boxes that only touch do not overlap.
pub fn overlaps(a: &BoxBody, b: &BoxBody) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Separate two overlapping boxes along their shallower axis and bounce them.
///
/// Each non-static box moves half the penetration depth away from the other,
/// whether or not the partner is static. On the chosen axis two dynamic boxes
/// swap velocities scaled by `restitution`; against a static box the dynamic
/// one reflects with `-restitution`. Mass plays no part. Equal depths resolve
/// on Y.
///
/// Returns `None` without touching either box when the center/half-extent
/// depth is negative on some axis. That metric can disagree with
/// [`overlaps`], so the check stays even for pre-filtered pairs.
pub fn resolve(a: &mut BoxBody, b: &mut BoxBody, restitution: f64) -> Option<Contact> {
    let delta = a.center() - b.center();
    let overlap_x = (a.width() / 2.0 + b.width() / 2.0) - delta.x.abs();
    let overlap_y = (a.height() / 2.0 + b.height() / 2.0) - delta.y.abs();

    if overlap_x < 0.0 || overlap_y < 0.0 {
        return None;
    }

    let (axis, depth) = if overlap_x < overlap_y {
        (Axis::X, overlap_x)
    } else {
        (Axis::Y, overlap_y)
    };

    let half = depth / 2.0;
    let push = if axis.of(delta) > 0.0 { half } else { -half };
    if !a.is_static() {
        *axis.of_mut(&mut a.body.position) += push;
    }
    if !b.is_static() {
        *axis.of_mut(&mut b.body.position) -= push;
    }

    match (a.is_static(), b.is_static()) {
        (false, false) => {
            let va = axis.of(a.body.velocity);
            let vb = axis.of(b.body.velocity);
            *axis.of_mut(&mut a.body.velocity) = vb * restitution;
            *axis.of_mut(&mut b.body.velocity) = va * restitution;
        }
        (true, false) => *axis.of_mut(&mut b.body.velocity) *= -restitution,
        (false, true) => *axis.of_mut(&mut a.body.velocity) *= -restitution,
        (true, true) => {}
    }

    Some(Contact { axis, depth })
}
