//! Physical dimensions shared by every generator.
//!
//! Map space measures distance in city blocks; heights are measured in
//! world units (meters). These constants convert between the two.

/// World units spanned by one map unit along X.
pub const BLOCK_WIDTH: f32 = 100.0;

/// World units spanned by one map unit along Z.
pub const BLOCK_DEPTH: f32 = 100.0;

/// Width of a street, in world units.
pub const STREET_WIDTH: f32 = 12.0;

/// Depth of a street, in world units.
pub const STREET_DEPTH: f32 = 12.0;

/// Fraction of a road edge at each end that belongs to the flat intersection pad.
pub const HALF_STREET_WIDTH_FRACTION: f32 = (STREET_WIDTH / 2.0) / BLOCK_WIDTH;

/// Fraction of a road edge at each end that belongs to the flat intersection pad (Z axis).
pub const HALF_STREET_DEPTH_FRACTION: f32 = (STREET_DEPTH / 2.0) / BLOCK_DEPTH;

/// Default map units per terrain grid step.
///
/// At 0.5, every integer and half-integer map point lands on a grid sample.
pub const DEFAULT_TERRAIN_SCALE: f32 = 0.5;

/// Probability that decays from 1.0 at `t = 0` to 0.0 at `t = 1`, going
/// negative past that.
///
/// Shared by road branching and zoning so both thin out at the same rate.
pub fn decay_probability(t: f32) -> f32 {
    (0.5f32.powf(t) - 0.5) * 2.0
}

/// Probability for something `distance` blocks from a center, where
/// everything inside `decay_begins` is certain and `half_extent` is where the
/// probability reaches zero.
pub fn distance_decay_probability(distance: f32, decay_begins: f32, half_extent: f32) -> f32 {
    if distance <= decay_begins {
        return 1.0;
    }
    let range = (half_extent - decay_begins).max(1.0);
    decay_probability((distance - decay_begins) / range)
}
