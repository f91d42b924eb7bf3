//! Lot layout catalog
//!
//! Each layout splits a block into rectangular lots, given as fractions of
//! the block's buildable area. `left`/`right` run along X and `top`/`bottom`
//! along Z, so a lot with `top == 0.0` faces the street on the block's top
//! edge.

/// A rectangular share of a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lot {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Tallest building this lot may hold, regardless of the block's cap
    pub max_stories: u32,
}

impl Lot {
    const fn new(left: f32, top: f32, right: f32, bottom: f32, max_stories: u32) -> Self {
        Self { left, top, right, bottom, max_stories }
    }

    const fn uncapped(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right, bottom, u32::MAX)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn depth(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.depth()
    }

    pub fn touches_top(&self) -> bool {
        self.top == 0.0
    }

    pub fn touches_bottom(&self) -> bool {
        self.bottom == 1.0
    }

    pub fn touches_left(&self) -> bool {
        self.left == 0.0
    }

    pub fn touches_right(&self) -> bool {
        self.right == 1.0
    }
}

/// One way to subdivide a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LotLayout {
    pub name: &'static str,
    /// Largest spread between block corner land heights this layout tolerates
    pub max_corner_steepness: f32,
    pub lots: &'static [Lot],
}

const SINGLE: &[Lot] = &[Lot::uncapped(0.0, 0.0, 1.0, 1.0)];

const HALVES_SIDE_BY_SIDE: &[Lot] = &[
    Lot::uncapped(0.0, 0.0, 0.5, 1.0),
    Lot::uncapped(0.5, 0.0, 1.0, 1.0),
];

const HALVES_STACKED: &[Lot] = &[
    Lot::uncapped(0.0, 0.0, 1.0, 0.5),
    Lot::uncapped(0.0, 0.5, 1.0, 1.0),
];

const THIRDS: &[Lot] = &[
    Lot::new(0.0, 0.0, 1.0 / 3.0, 1.0, 20),
    Lot::new(1.0 / 3.0, 0.0, 2.0 / 3.0, 1.0, 20),
    Lot::new(2.0 / 3.0, 0.0, 1.0, 1.0, 20),
];

const QUARTERS: &[Lot] = &[
    Lot::uncapped(0.0, 0.0, 0.5, 0.5),
    Lot::uncapped(0.5, 0.0, 1.0, 0.5),
    Lot::uncapped(0.0, 0.5, 0.5, 1.0),
    Lot::uncapped(0.5, 0.5, 1.0, 1.0),
];

const FIVE: &[Lot] = &[
    Lot::new(0.0, 0.0, 1.0 / 3.0, 0.5, 10),
    Lot::new(1.0 / 3.0, 0.0, 2.0 / 3.0, 0.5, 10),
    Lot::new(2.0 / 3.0, 0.0, 1.0, 0.5, 10),
    Lot::uncapped(0.0, 0.5, 0.5, 1.0),
    Lot::uncapped(0.5, 0.5, 1.0, 1.0),
];

const DENSE: &[Lot] = &[
    Lot::new(0.0, 0.0, 0.2, 0.25, 6),
    Lot::new(0.2, 0.0, 0.4, 0.25, 6),
    Lot::new(0.4, 0.0, 0.6, 0.25, 6),
    Lot::new(0.6, 0.0, 0.8, 0.25, 6),
    Lot::new(0.8, 0.0, 1.0, 0.25, 6),
    Lot::new(0.0, 0.25, 0.2, 0.5, 4),
    Lot::new(0.0, 0.5, 0.2, 0.75, 4),
    Lot::new(0.2, 0.25, 0.8, 0.75, 2),
    Lot::new(0.8, 0.25, 1.0, 0.5, 4),
    Lot::new(0.8, 0.5, 1.0, 0.75, 4),
    Lot::new(0.0, 0.75, 0.2, 1.0, 6),
    Lot::new(0.2, 0.75, 0.4, 1.0, 6),
    Lot::new(0.4, 0.75, 0.6, 1.0, 6),
    Lot::new(0.6, 0.75, 0.8, 1.0, 6),
    Lot::new(0.8, 0.75, 1.0, 1.0, 6),
];

/// Every layout a block may be zoned with, drawn from uniformly.
pub const LAYOUTS: &[LotLayout] = &[
    LotLayout { name: "single", max_corner_steepness: 2.5, lots: SINGLE },
    LotLayout { name: "halves side by side", max_corner_steepness: 4.0, lots: HALVES_SIDE_BY_SIDE },
    LotLayout { name: "halves stacked", max_corner_steepness: 4.0, lots: HALVES_STACKED },
    LotLayout { name: "thirds", max_corner_steepness: 5.0, lots: THIRDS },
    LotLayout { name: "quarters", max_corner_steepness: 6.0, lots: QUARTERS },
    LotLayout { name: "five", max_corner_steepness: 6.0, lots: FIVE },
    LotLayout { name: "dense", max_corner_steepness: 8.0, lots: DENSE },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lots_fill_block_exactly() {
        for layout in LAYOUTS {
            let area: f32 = layout.lots.iter().map(Lot::area).sum();
            assert!((area - 1.0).abs() < 1e-5, "{} covers {}", layout.name, area);
            for lot in layout.lots {
                assert!(lot.left >= 0.0 && lot.right <= 1.0 && lot.left < lot.right);
                assert!(lot.top >= 0.0 && lot.bottom <= 1.0 && lot.top < lot.bottom);
            }
        }
    }

    #[test]
    fn test_lots_do_not_overlap() {
        for layout in LAYOUTS {
            for (i, a) in layout.lots.iter().enumerate() {
                for b in &layout.lots[i + 1..] {
                    let overlap_x = a.right.min(b.right) - a.left.max(b.left);
                    let overlap_z = a.bottom.min(b.bottom) - a.top.max(b.top);
                    assert!(overlap_x <= 1e-6 || overlap_z <= 1e-6, "{} has overlapping lots", layout.name);
                }
            }
        }
    }

    #[test]
    fn test_catalog_lot_counts() {
        let counts: Vec<usize> = LAYOUTS.iter().map(|l| l.lots.len()).collect();
        assert_eq!(counts, vec![1, 2, 2, 3, 4, 5, 15]);
    }

    #[test]
    fn test_dense_center_lot_is_interior() {
        let center = DENSE[7];
        assert!(!center.touches_top() && !center.touches_bottom());
        assert!(!center.touches_left() && !center.touches_right());
        assert!(DENSE[0].touches_top() && DENSE[0].touches_left());
    }
}
