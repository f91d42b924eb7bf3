//! ASCII rendering for generated cities
//!
//! The map is drawn at half-block resolution: even columns and rows fall on
//! intersections, odd ones on streets between them or on block interiors.

use crate::road_network::GradeType;
use crate::world::WorldData;

/// Get ASCII character for land height within the terrain's range (10-level gradient)
pub fn height_char(height: f32, min: f32, max: f32) -> char {
    const CHARS: &[char] = &[' ', '.', ',', ':', ';', '-', '=', '+', '*', '^'];
    let normalized = ((height - min) / (max - min).max(f32::EPSILON)).clamp(0.0, 1.0);
    let idx = (normalized * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for the tallest building on a block
pub fn building_char(stories: u32) -> char {
    match stories {
        0 => ' ',
        1..=3 => 'o',
        4..=9 => 'O',
        10..=24 => 'B',
        _ => '@',
    }
}

/// Render a city map to an ASCII string
pub fn render_ascii_map(world: &WorldData) -> String {
    let terrain = &world.terrain;
    let network = &world.road_network;
    let (min_height, max_height) = terrain
        .cells()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), (_, _, cell)| (lo.min(cell.land_height), hi.max(cell.land_height)));

    let min_x = terrain.min_x().ceil() as i32;
    let max_x = terrain.max_x().floor() as i32;
    let min_z = terrain.min_z().ceil() as i32;
    let max_z = terrain.max_z().floor() as i32;
    let width = ((max_x - min_x) * 2 + 1).max(0) as usize;
    let height = ((max_z - min_z) * 2 + 1).max(0) as usize;

    let mut result = String::with_capacity((width + 1) * height);
    for row in 0..height as i32 {
        for column in 0..width as i32 {
            let x = min_x + column.div_euclid(2);
            let z = min_z + row.div_euclid(2);
            let on_x = column % 2 == 0;
            let on_z = row % 2 == 0;

            let road = match (on_x, on_z) {
                (true, true) => network.intersection(x, z).map(|i| match i.grade_type {
                    GradeType::Surface => '+',
                    GradeType::Bridge => '#',
                }),
                (false, true) => network.edge_between(x, z, x + 1, z).map(|e| match e.grade_type {
                    GradeType::Surface => '-',
                    GradeType::Bridge => '=',
                }),
                (true, false) => network.edge_between(x, z, x, z + 1).map(|e| match e.grade_type {
                    GradeType::Surface => '|',
                    GradeType::Bridge => 'H',
                }),
                (false, false) => world
                    .buildings
                    .block_at_coordinates(x, z)
                    .and_then(|b| b.iter().map(|b| b.stories).max())
                    .map(building_char),
            };

            let map_x = min_x as f32 + column as f32 / 2.0;
            let map_z = min_z as f32 + row as f32 / 2.0;
            let ch = road.unwrap_or_else(|| {
                if terrain.is_underwater_at(map_x, map_z) {
                    '~'
                } else {
                    terrain
                        .land_height_at(map_x, map_z)
                        .map_or(' ', |h| height_char(h, min_height, max_height))
                }
            });
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Generate legend for map characters
pub fn legend() -> String {
    [
        "+ intersection   # bridge intersection",
        "- | street       = H bridge",
        "o O B @ buildings (1-3, 4-9, 10-24, 25+ stories)",
        "~ water          .:;-=+*^ land, low to high",
    ]
    .join("\n")
}

/// Print the ASCII map to stdout
pub fn print_ascii_map(world: &WorldData) {
    println!("{}", render_ascii_map(world));
    println!("{}", legend());
}
