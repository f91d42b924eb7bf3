//! Diamond-square fractal heightmap.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::tilemap::Tilemap;

/// Generate a `width` x `height` fractal heightmap.
///
/// The fractal runs on the smallest `2^n + 1` square covering the requested
/// size with its corners at 0, and the centered window is cropped out. Every
/// level displaces new points by up to `jitter`, and `jitter` is multiplied
/// by `jitter_decay` before the next, finer level.
pub fn generate(
    width: usize,
    height: usize,
    jitter: f32,
    jitter_decay: f32,
    rng: &mut ChaCha8Rng,
) -> Tilemap<f32> {
    let mut size = 1;
    while size + 1 < width.max(height) {
        size *= 2;
    }
    let side = size + 1;

    let mut map = Tilemap::new_with(side, side, 0.0f32);
    let mut step = size;
    let mut jitter = jitter;

    while step > 1 {
        let half = step / 2;

        // Diamond step: center of each square
        for y in (half..side).step_by(step) {
            for x in (half..side).step_by(step) {
                let sum = *map.get(x - half, y - half)
                    + *map.get(x + half, y - half)
                    + *map.get(x - half, y + half)
                    + *map.get(x + half, y + half);
                map.set(x, y, sum / 4.0 + displacement(jitter, rng));
            }
        }

        // Square step: midpoint of each edge, averaging whichever neighbors exist
        for y in (0..side).step_by(half) {
            let x_start = if (y / half) % 2 == 0 { half } else { 0 };
            for x in (x_start..side).step_by(step) {
                let mut sum = 0.0;
                let mut count = 0.0;
                if x >= half {
                    sum += *map.get(x - half, y);
                    count += 1.0;
                }
                if x + half < side {
                    sum += *map.get(x + half, y);
                    count += 1.0;
                }
                if y >= half {
                    sum += *map.get(x, y - half);
                    count += 1.0;
                }
                if y + half < side {
                    sum += *map.get(x, y + half);
                    count += 1.0;
                }
                map.set(x, y, sum / count + displacement(jitter, rng));
            }
        }

        step = half;
        jitter *= jitter_decay;
    }

    map.crop((side - width) / 2, (side - height) / 2, width, height)
}

fn displacement(jitter: f32, rng: &mut ChaCha8Rng) -> f32 {
    rng.gen_range(-1.0f32..=1.0) * jitter
}
