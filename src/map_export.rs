//! Equirectangular map export
//!
//! Each pixel is colored by the cell under its center: longitude runs left
//! to right from 0 to 360, polar latitude top to bottom from 0 to 180.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::cell::CellType;
use crate::error::Result;
use crate::world::World;

/// What the exported map shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MapMode {
    /// Biome colors
    #[default]
    Biome,
    /// Land height as grayscale over dark water
    Height,
    /// Landmass colors, water in black
    Landmass,
    /// Accumulated foehn on land as grayscale
    Foehn,
    /// Aridity in red and height in green on land
    Aridity,
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Biome => write!(f, "biome"),
            Self::Height => write!(f, "height"),
            Self::Landmass => write!(f, "landmass"),
            Self::Foehn => write!(f, "foehn"),
            Self::Aridity => write!(f, "aridity"),
        }
    }
}

const WATER_SHADE: Rgb<u8> = Rgb([10, 20, 60]);

/// Coordinate at the center of pixel (x, y) of a `width` × `height` map.
pub fn pixel_coord(x: u32, y: u32, width: u32, height: u32) -> (f64, f64) {
    let lon = (x as f64 + 0.5) / width as f64 * 360.0;
    let lat = (y as f64 + 0.5) / height as f64 * 180.0;
    (lon, lat)
}

/// Largest land values, used to stretch land fields over the full color range
#[derive(Clone, Copy, Debug)]
struct LandRange {
    height: f32,
    aridity: f32,
    foehn: f32,
}

impl LandRange {
    fn of(world: &World) -> Self {
        let mut range = Self {
            height: f32::EPSILON,
            aridity: f32::EPSILON,
            foehn: f32::EPSILON,
        };
        for c in world.cells().iter().filter(|c| c.is(CellType::Land)) {
            range.height = range.height.max(c.height);
            range.aridity = range.aridity.max(c.aridity);
            range.foehn = range.foehn.max(c.foehn);
        }
        range
    }
}

fn channel(value: f32, max: f32) -> u8 {
    ((value / max).clamp(0.0, 1.0) * 255.0) as u8
}

fn pixel_color(world: &World, id: usize, mode: MapMode, range: LandRange) -> Rgb<u8> {
    let Some(cell) = world.cell(id) else {
        return Rgb([0, 0, 0]);
    };
    let land = cell.is(CellType::Land);
    match mode {
        MapMode::Biome => world.biome(id).map_or(Rgb([0, 0, 0]), |b| Rgb(b.color)),
        MapMode::Landmass => match cell.landmass.and_then(|l| world.landmasses().get(l)) {
            Some(lm) => Rgb(lm.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8)),
            None => Rgb([0, 0, 0]),
        },
        _ if !land => WATER_SHADE,
        MapMode::Height => {
            let g = channel(cell.height, range.height);
            Rgb([g, g, g])
        }
        MapMode::Foehn => {
            let g = channel(cell.foehn, range.foehn);
            Rgb([g, g, g])
        }
        MapMode::Aridity => Rgb([channel(cell.aridity, range.aridity), channel(cell.height, range.height), 0]),
    }
}

/// Render the world into an image `width` pixels wide and half as tall.
pub fn render_map(world: &World, width: u32, mode: MapMode) -> RgbImage {
    let width = width.max(2);
    let height = width / 2;
    let range = LandRange::of(world);

    let mut img = ImageBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let (lon, lat) = pixel_coord(x, y, width, height);
            let color = world
                .cell_at(lon, lat)
                .map_or(Rgb([0, 0, 0]), |id| pixel_color(world, id, mode, range));
            img.put_pixel(x, y, color);
        }
    }
    img
}

/// Render and save the map as a PNG.
pub fn export_map(world: &World, path: &Path, width: u32, mode: MapMode) -> Result<()> {
    let img = render_map(world, width, mode);
    img.save(path)?;
    log::info!(
        "Exported {} map ({}x{}) to {}",
        mode,
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GenerationParams;
    use image::GenericImageView;

    #[test]
    fn test_pixel_coords_cover_the_globe() {
        let (lon, lat) = pixel_coord(0, 0, 360, 180);
        assert!((lon - 0.5).abs() < 1e-9 && (lat - 0.5).abs() < 1e-9);
        let (lon, lat) = pixel_coord(359, 179, 360, 180);
        assert!((lon - 359.5).abs() < 1e-9 && (lat - 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_render_and_export() {
        let world = World::generate(7, &GenerationParams::with_face_size(8.0)).unwrap();
        let img = render_map(&world, 64, MapMode::Biome);
        assert_eq!((img.width(), img.height()), (64, 32));

        let (lon, lat) = pixel_coord(10, 20, 64, 32);
        let id = world.cell_at(lon, lat).unwrap();
        assert_eq!(img.get_pixel(10, 20).0, world.biome(id).unwrap().color);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        export_map(&world, &path, 32, MapMode::Height).unwrap();
        let reread = image::open(&path).unwrap();
        assert_eq!(reread.width(), 32);
        assert_eq!(reread.height(), 16);
    }

    #[test]
    fn test_foehn_and_aridity_modes() {
        let world = World::generate(7, &GenerationParams::with_face_size(8.0)).unwrap();
        let foehn = render_map(&world, 64, MapMode::Foehn);
        let aridity = render_map(&world, 64, MapMode::Aridity);
        let range = LandRange::of(&world);

        for y in 0..32 {
            for x in 0..64 {
                let (lon, lat) = pixel_coord(x, y, 64, 32);
                let c = world.cell(world.cell_at(lon, lat).unwrap()).unwrap();
                if c.is(CellType::Land) {
                    let g = channel(c.foehn, range.foehn);
                    assert_eq!(foehn.get_pixel(x, y).0, [g, g, g]);
                    let a = aridity.get_pixel(x, y).0;
                    assert_eq!(a[0], channel(c.aridity, range.aridity));
                    assert_eq!(a[2], 0);
                } else {
                    assert_eq!(foehn.get_pixel(x, y), &WATER_SHADE);
                    assert_eq!(aridity.get_pixel(x, y), &WATER_SHADE);
                }
            }
        }
    }

    #[test]
    fn test_channel_stretches_and_clamps() {
        assert_eq!(channel(0.0, 2.0), 0);
        assert_eq!(channel(2.0, 2.0), 255);
        assert_eq!(channel(5.0, 2.0), 255);
        assert_eq!(channel(-1.0, 2.0), 0);
    }
}
