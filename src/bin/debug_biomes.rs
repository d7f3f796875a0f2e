//! Debug script to output a world's biomes as an ASCII map

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;

use sphere_world::biomes::{land_biomes, Biome, LAKE, OCEAN, RIVER};
use sphere_world::map_export::pixel_coord;
use sphere_world::params::GenerationParams;
use sphere_world::world::World;

const LAND_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn biome_char(biome: &Biome, land: &[&'static Biome]) -> char {
    if *biome == OCEAN {
        return '~';
    }
    if *biome == LAKE {
        return 'o';
    }
    if *biome == RIVER {
        return '=';
    }
    land.iter()
        .position(|b| *b == biome)
        .and_then(|i| LAND_CHARS.chars().nth(i))
        .unwrap_or('?')
}

fn main() {
    env_logger::init();

    let width = 144u32;
    let height = 72u32;
    let seed = 12345u64;

    let world = World::generate(seed, &GenerationParams::with_face_size(4.0)).unwrap();
    let land = land_biomes();

    let mut file = File::create("biome_debug.txt").unwrap();
    writeln!(file, "=== BIOME DEBUG MAP ({}x{}) seed={} ===", width, height, seed).unwrap();
    writeln!(file).unwrap();

    writeln!(file, "LEGEND:").unwrap();
    writeln!(file, "  ~ = Ocean  o = Lake  = = River").unwrap();
    for biome in &land {
        writeln!(file, "  {} = {}", biome_char(biome, &land), biome.name).unwrap();
    }
    writeln!(file).unwrap();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    writeln!(file, "BIOME MAP:").unwrap();
    for y in 0..height {
        let mut line = String::new();
        for x in 0..width {
            let (lon, lat) = pixel_coord(x, y, width, height);
            let Some(biome) = world.cell_at(lon, lat).and_then(|id| world.biome(id)) else {
                line.push(' ');
                continue;
            };
            line.push(biome_char(biome, &land));
            *counts.entry(biome.name).or_insert(0) += 1;
        }
        writeln!(file, "{}", line).unwrap();
    }

    writeln!(file).unwrap();
    writeln!(file, "BIOME COUNTS (pixels):").unwrap();
    let total = (width * height) as f32;
    for (name, count) in &counts {
        writeln!(file, "  {:<24} {:>6} ({:.1}%)", name, count, *count as f32 / total * 100.0).unwrap();
    }

    println!("Wrote biome_debug.txt ({} cells, {} landmasses)", world.cells().len(), world.landmasses().len());
}
