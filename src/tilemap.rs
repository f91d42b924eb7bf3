/// A dense 2D grid addressed by column and row. Edges do not wrap.
#[derive(Clone, Debug)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "tile ({}, {}) out of range", x, y);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether signed coordinates fall inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// 4-connected neighbors, clipped at the edges.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (width, height) = (self.width, self.height);
        [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dx, dy)| {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                    Some((nx as usize, ny as usize))
                } else {
                    None
                }
            })
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Copy the `width` x `height` window whose top-left corner is at (`x0`, `y0`).
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                data.push(self.get(x, y).clone());
            }
        }
        Self { width, height, data }
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value in the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        (min_h, max_h)
    }

    /// Mean absolute difference between horizontally and vertically adjacent cells.
    pub fn roughness(&self) -> f32 {
        let mut total = 0.0f64;
        let mut count = 0usize;
        for (x, y, &h) in self.iter() {
            if x + 1 < self.width {
                total += (h - *self.get(x + 1, y)).abs() as f64;
                count += 1;
            }
            if y + 1 < self.height {
                total += (h - *self.get(x, y + 1)).abs() as f64;
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { (total / count as f64) as f32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_clip_at_corner() {
        let map: Tilemap<f32> = Tilemap::new(3, 3);
        let corner: Vec<_> = map.neighbors(0, 0).collect();
        assert_eq!(corner.len(), 2);
        assert!(corner.contains(&(1, 0)));
        assert!(corner.contains(&(0, 1)));
        assert_eq!(map.neighbors(1, 1).count(), 4);
    }

    #[test]
    fn test_crop_keeps_values() {
        let mut map = Tilemap::new_with(4, 4, 0.0f32);
        map.set(2, 1, 7.0);
        let cropped = map.crop(1, 1, 2, 2);
        assert_eq!(cropped.width, 2);
        assert_eq!(*cropped.get(1, 0), 7.0);
    }

    #[test]
    fn test_min_max_and_roughness() {
        let mut map = Tilemap::new_with(2, 1, 1.0f32);
        map.set(1, 0, 3.0);
        assert_eq!(map.min_max(), (1.0, 3.0));
        assert!((map.roughness() - 2.0).abs() < 1e-6);
    }
}
