//! Terrain field: land and water heights on a regular grid, queried in map space.
//!
//! Map space is origin-centered and measured in blocks. Grid space is the
//! dense column/row index. With a scale of `s` map units per grid step:
//!
//! ```text
//! column = (x - min_x) / s        x = min_x + column * s
//! row    = (z - min_z) / s        z = min_z + row * s
//! ```
//!
//! Queries between samples interpolate linearly along an axis the point lies
//! on, or bilinearly when the point is off-grid in both axes.

pub mod diamond_square;
pub mod generator;
pub mod river;

pub use generator::{generate_base_heightmap, generate_terrain};

use crate::tilemap::Tilemap;

/// One terrain sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainCell {
    pub land_height: f32,
    /// Depth of standing water above the land; 0 means dry
    pub water_height: f32,
}

impl TerrainCell {
    pub fn height(&self) -> f32 {
        self.land_height + self.water_height
    }
}

/// Read-only heightmap with water, addressed in map space.
#[derive(Clone, Debug)]
pub struct Terrain {
    cells: Tilemap<TerrainCell>,
    scale: f32,
    min_x: f32,
    max_x: f32,
    min_z: f32,
    max_z: f32,
}

impl Terrain {
    /// Wrap a grid of cells spaced `scale` map units apart, centered on the origin.
    pub fn new(cells: Tilemap<TerrainCell>, scale: f32) -> Self {
        assert!(cells.width > 0 && cells.height > 0, "terrain grid must not be empty");
        assert!(scale > 0.0, "terrain scale must be positive");

        let half_x = (cells.width - 1) as f32 * scale / 2.0;
        let half_z = (cells.height - 1) as f32 * scale / 2.0;
        Self {
            cells,
            scale,
            min_x: -half_x,
            max_x: half_x,
            min_z: -half_z,
            max_z: half_z,
        }
    }

    /// Build a terrain from separate land and water layers of the same size.
    pub fn from_layers(land: &Tilemap<f32>, water: &Tilemap<f32>, scale: f32) -> Self {
        assert_eq!((land.width, land.height), (water.width, water.height), "layer sizes differ");
        let mut cells = Tilemap::new(land.width, land.height);
        for (x, y, cell) in cells.iter_mut() {
            *cell = TerrainCell {
                land_height: *land.get(x, y),
                water_height: *water.get(x, y),
            };
        }
        Self::new(cells, scale)
    }

    /// A dry terrain at constant height, `column_count` x `row_count` blocks.
    pub fn flat(column_count: usize, row_count: usize, height: f32, scale: f32) -> Self {
        let steps = (1.0 / scale).round().max(1.0) as usize;
        let cells = Tilemap::new_with(
            column_count * steps + 1,
            row_count * steps + 1,
            TerrainCell { land_height: height, water_height: 0.0 },
        );
        Self::new(cells, scale)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min_x(&self) -> f32 {
        self.min_x
    }

    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    pub fn min_z(&self) -> f32 {
        self.min_z
    }

    pub fn max_z(&self) -> f32 {
        self.max_z
    }

    /// Number of grid columns.
    pub fn column_count(&self) -> usize {
        self.cells.width
    }

    /// Number of grid rows.
    pub fn row_count(&self) -> usize {
        self.cells.height
    }

    pub fn cells(&self) -> &Tilemap<TerrainCell> {
        &self.cells
    }

    pub fn map_to_grid(&self, x: f32, z: f32) -> (f32, f32) {
        ((x - self.min_x) / self.scale, (z - self.min_z) / self.scale)
    }

    pub fn is_point_in_bounds(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Land plus water height, or `None` outside the terrain.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.interpolate(x, z, |cell| cell.height())
    }

    pub fn land_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.interpolate(x, z, |cell| cell.land_height)
    }

    pub fn water_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.interpolate(x, z, |cell| cell.water_height)
    }

    /// In bounds and free of standing water.
    pub fn is_dry_at(&self, x: f32, z: f32) -> bool {
        matches!(self.water_height_at(x, z), Some(w) if w <= 0.0)
    }

    /// In bounds and under water.
    pub fn is_underwater_at(&self, x: f32, z: f32) -> bool {
        matches!(self.water_height_at(x, z), Some(w) if w > 0.0)
    }

    fn interpolate(&self, x: f32, z: f32, sample: impl Fn(&TerrainCell) -> f32) -> Option<f32> {
        if !self.is_point_in_bounds(x, z) {
            return None;
        }

        let (gx, gz) = self.map_to_grid(x, z);
        let (column, fx) = split_axis(gx, self.cells.width);
        let (row, fz) = split_axis(gz, self.cells.height);
        let at = |c: usize, r: usize| sample(self.cells.get(c, r));

        let value = match (fx == 0.0, fz == 0.0) {
            (true, true) => at(column, row),
            (false, true) => lerp(at(column, row), at(column + 1, row), fx),
            (true, false) => lerp(at(column, row), at(column, row + 1), fz),
            (false, false) => {
                let top = lerp(at(column, row), at(column + 1, row), fx);
                let bottom = lerp(at(column, row + 1), at(column + 1, row + 1), fx);
                lerp(top, bottom, fz)
            }
        };
        Some(value)
    }
}

/// Integer index and fractional offset along one axis, kept inside `len` samples.
fn split_axis(position: f32, len: usize) -> (usize, f32) {
    let last = len - 1;
    let index = position.floor().max(0.0) as usize;
    if index >= last {
        (last, 0.0)
    } else {
        (index, position - index as f32)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
