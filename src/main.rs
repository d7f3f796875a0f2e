use std::path::PathBuf;

use clap::Parser;

use sphere_world::error::Result;
use sphere_world::map_export::{self, MapMode};
use sphere_world::params::{GenerationParams, FACE_SIZE};
use sphere_world::seeds::WorldSeeds;
use sphere_world::world::World;

#[derive(Parser, Debug)]
#[command(name = "sphere_world")]
#[command(about = "Generate a spherical world of land, rivers, lakes and biomes")]
struct Args {
    /// Random seed (uses the clock if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Latitude band spacing of the mesh in degrees (smaller = more cells)
    #[arg(short = 'f', long, default_value_t = FACE_SIZE, value_parser = positive_degrees)]
    face_size: f64,

    /// Load a saved world instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the world to a text file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Export an equirectangular PNG map
    #[arg(long)]
    export_map: Option<PathBuf>,

    /// Width of the exported map in pixels (height is half)
    #[arg(long, default_value = "1024")]
    map_width: u32,

    /// What the exported map shows
    #[arg(long, value_enum, default_value_t = MapMode::Biome)]
    map_mode: MapMode,

    /// Write world statistics as JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

/// Band spacing must be a positive, finite number of degrees.
fn positive_degrees(s: &str) -> std::result::Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("{:?} is not a number", s))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("face size must be positive, got {}", v))
    }
}

fn run(args: Args) -> Result<()> {
    let world = match &args.load {
        Some(path) => World::load(path)?,
        None => {
            let seeds = match args.seed {
                Some(seed) => WorldSeeds::from_master(seed),
                None => WorldSeeds::from_clock(),
            };
            let params = GenerationParams::with_face_size(args.face_size);
            World::generate_with_seeds(seeds, &params)?
        }
    };

    let stats = world.stats();
    println!(
        "{} cells: {} land, {} ocean, {} lake; {} landmasses (largest {})",
        stats.cells, stats.land_cells, stats.ocean_cells, stats.lake_cells, stats.landmasses, stats.largest_landmass
    );
    if let Some(seeds) = world.seeds() {
        println!("Seed: {}", seeds.master);
    }

    if let Some(path) = &args.save {
        world.save(path)?;
    }
    if let Some(path) = &args.export_map {
        map_export::export_map(&world, path, args.map_width, args.map_mode)?;
    }
    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&stats)?;
        std::fs::write(path, json)?;
        log::info!("Wrote stats to {}", path.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_size_must_be_positive() {
        assert_eq!(positive_degrees("2.5"), Ok(2.5));
        assert!(positive_degrees("0").is_err());
        assert!(positive_degrees("-3").is_err());
        assert!(positive_degrees("inf").is_err());
        assert!(positive_degrees("abc").is_err());
    }

    #[test]
    fn test_cli_rejects_zero_face_size() {
        assert!(Args::try_parse_from(["sphere_world", "--face-size", "0"]).is_err());
        assert!(Args::try_parse_from(["sphere_world", "-f", "-1"]).is_err());
        let args = Args::try_parse_from(["sphere_world", "--seed", "42"]).unwrap();
        assert_eq!(args.face_size, FACE_SIZE);
    }
}
