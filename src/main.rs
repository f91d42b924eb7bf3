use clap::Parser;
use tracing_subscriber::EnvFilter;

use city_generator::ascii;
use city_generator::config::CityConfig;
use city_generator::erosion::{ErosionParams, ErosionPreset};
use city_generator::map_export::{self, MapExportConfig};
use city_generator::road_network::GradeType;
use city_generator::seeds::WorldSeeds;
use city_generator::world;

#[derive(Parser, Debug)]
#[command(name = "city_generator")]
#[command(about = "Generate procedural cities with terrain, roads and buildings")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file; command line options override it
    #[arg(short, long)]
    config: Option<String>,

    /// Terrain width in blocks
    #[arg(short = 'W', long)]
    columns: Option<usize>,

    /// Terrain depth in blocks
    #[arg(short = 'H', long)]
    rows: Option<usize>,

    /// Number of neighborhoods
    #[arg(short, long)]
    neighborhoods: Option<usize>,

    /// Probability of a river (0-1)
    #[arg(long)]
    river_probability: Option<f32>,

    /// Maximum building height in stories
    #[arg(long)]
    max_stories: Option<u32>,

    /// Generate terrain and neighborhoods only
    #[arg(long)]
    no_roads: bool,

    /// Build roads but no lots or buildings
    #[arg(long)]
    no_zoning: bool,

    /// Erosion preset: none, minimal, normal, dramatic
    #[arg(short, long)]
    erosion: Option<ErosionPreset>,

    /// Print an ASCII map to stdout
    #[arg(long)]
    ascii: bool,

    /// Export a top-down PNG map (specify output path)
    #[arg(long)]
    export_png: Option<String>,

    /// Pixels per block for PNG export
    #[arg(long, default_value = "8")]
    png_scale: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CityConfig::from_json_file(path)?,
        None => CityConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(seed);
    println!("Generating city with seed: {}", seed);
    println!(
        "Terrain: {}x{} blocks, {} neighborhoods requested",
        config.terrain.column_count, config.terrain.row_count, config.neighborhoods.count
    );

    let world = world::generate_world(&config, &seeds)?;

    let (width, depth) = world.size_in_blocks();
    let bridge_edges = world
        .road_network
        .intersections()
        .flat_map(|(_, _, i)| i.edges().iter())
        .filter(|e| e.grade_type == GradeType::Bridge)
        .count()
        / 2;
    println!();
    println!("=== City Summary ===");
    println!("Size: {}x{} blocks", width, depth);
    println!(
        "Erosion: {:.1} eroded, {:.1} deposited",
        world.erosion_stats.total_eroded, world.erosion_stats.total_deposited
    );
    println!("Neighborhoods: {}", world.neighborhoods.len());
    for (i, n) in world.neighborhoods.iter().enumerate() {
        println!("  {}. center ({}, {})", i + 1, n.center_x(), n.center_z());
    }
    println!(
        "Roads: {} intersections, {} edges ({} bridge spans)",
        world.road_network.intersection_count(),
        world.road_network.edge_count(),
        bridge_edges
    );
    println!("Zoned blocks: {}", world.zoned_blocks.len());
    println!("Buildings: {}", world.buildings.building_count());
    if let Some(tallest) = world.buildings.tallest() {
        let (x, z) = tallest.center();
        println!(
            "Tallest: {} stories ({:.1}m) at ({:.2}, {:.2})",
            tallest.stories, tallest.height, x, z
        );
    }

    if args.ascii {
        println!();
        ascii::print_ascii_map(&world);
    }

    if let Some(path) = &args.export_png {
        let export_config = MapExportConfig { pixels_per_block: args.png_scale, ..Default::default() };
        map_export::export_city_map(&world, path, &export_config)?;
        println!("Exported map to {}", path);
    }

    Ok(())
}

fn apply_overrides(config: &mut CityConfig, args: &Args) {
    if let Some(columns) = args.columns {
        config.terrain.column_count = columns;
    }
    if let Some(rows) = args.rows {
        config.terrain.row_count = rows;
    }
    if let Some(count) = args.neighborhoods {
        config.neighborhoods.count = count;
    }
    if let Some(probability) = args.river_probability {
        config.terrain.probability_of_river = probability;
    }
    if let Some(max_stories) = args.max_stories {
        config.zoned_blocks.max_building_stories = max_stories;
    }
    if let Some(preset) = args.erosion {
        config.terrain.erosion = ErosionParams::from_preset(preset);
    }
    if args.no_roads {
        config.road_network.is_present = false;
    }
    if args.no_zoning {
        config.zoned_blocks.is_present = false;
    }
}
