//! Utility functions for erosion calculations
//!
//! Provides gradient calculation, bilinear interpolation, and erosion brush utilities.
//! Positions are in grid space and clamp at the map edges.

use crate::tilemap::Tilemap;

/// Corner samples and fractional offsets around a grid-space position.
fn cell_corners(heightmap: &Tilemap<f32>, x: f32, y: f32) -> ([f32; 4], f32, f32) {
    let x = x.clamp(0.0, heightmap.width as f32 - 1.001);
    let y = y.clamp(0.0, heightmap.height as f32 - 1.001);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(heightmap.width - 1);
    let y1 = (y0 + 1).min(heightmap.height - 1);

    let corners = [
        *heightmap.get(x0, y0),
        *heightmap.get(x1, y0),
        *heightmap.get(x0, y1),
        *heightmap.get(x1, y1),
    ];
    (corners, x.fract(), y.fract())
}

/// Sample height at a floating-point position using bilinear interpolation.
pub fn height_at(heightmap: &Tilemap<f32>, x: f32, y: f32) -> f32 {
    let ([h00, h10, h01, h11], fx, fy) = cell_corners(heightmap, x, y);
    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;
    h0 * (1.0 - fy) + h1 * fy
}

/// Calculate gradient at a floating-point position using bilinear interpolation.
/// Returns (grad_x, grad_y) pointing in the direction of steepest ascent.
pub fn gradient_at(heightmap: &Tilemap<f32>, x: f32, y: f32) -> (f32, f32) {
    let ([h00, h10, h01, h11], fx, fy) = cell_corners(heightmap, x, y);

    let grad_x = (h10 - h00) * (1.0 - fy) + (h11 - h01) * fy;
    let grad_y = (h01 - h00) * (1.0 - fx) + (h11 - h10) * fx;

    (grad_x, grad_y)
}

/// Create a circular brush of normalized weights for spreading erosion.
pub fn create_erosion_brush(radius: usize) -> Vec<(i32, i32, f32)> {
    if radius == 0 {
        return vec![(0, 0, 1.0)];
    }

    let mut brush = Vec::new();
    let r = radius as i32;
    let r_sq = (r * r) as f32;
    let mut total_weight = 0.0;

    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq <= r_sq {
                let weight = (1.0 - dist_sq / r_sq).max(0.0);
                brush.push((dx, dy, weight));
                total_weight += weight;
            }
        }
    }

    for (_, _, w) in brush.iter_mut() {
        *w /= total_weight;
    }

    brush
}

/// Add `amount` (negative to remove) spread across the brush footprint.
/// Brush cells that fall off the map are dropped.
pub fn apply_brush(
    heightmap: &mut Tilemap<f32>,
    brush: &[(i32, i32, f32)],
    x: usize,
    y: usize,
    amount: f32,
) {
    for &(dx, dy, weight) in brush {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if heightmap.contains(nx, ny) {
            *heightmap.get_mut(nx as usize, ny as usize) += amount * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_weights_sum_to_one() {
        for radius in 0..4 {
            let total: f32 = create_erosion_brush(radius).iter().map(|&(_, _, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_gradient_points_uphill() {
        let mut map = Tilemap::new_with(4, 4, 0.0f32);
        for y in 0..4 {
            for x in 0..4 {
                map.set(x, y, x as f32 * 2.0);
            }
        }
        let (gx, gy) = gradient_at(&map, 1.5, 1.5);
        assert!((gx - 2.0).abs() < 1e-5);
        assert!(gy.abs() < 1e-5);
        assert!((height_at(&map, 1.5, 2.0) - 3.0).abs() < 1e-5);
    }
}
