//! Biome lookup from height, aridity and foehn.
//!
//! Land cells index a 6 × 7 table: rows go from lowland to highland, columns
//! from driest to wettest. Water cells map to fixed records.

use serde::Serialize;

use crate::cell::CellType;

/// A named biome with its map color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Biome {
    pub name: &'static str,
    pub color: [u8; 3],
}

impl Biome {
    const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self { name, color: [r, g, b] }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// BIOME RECORDS
// =============================================================================

pub const OCEAN: Biome = Biome::new("Ocean", 0, 0, 128);
pub const LAKE: Biome = Biome::new("Lake", 128, 128, 255);
pub const RIVER: Biome = Biome::new("River", 64, 96, 255);

pub const SALT_PAN: Biome = Biome::new("Salt Pan", 254, 229, 226);
pub const SAVANNA: Biome = Biome::new("Savanna", 228, 232, 202);
pub const SEASONAL_FOREST: Biome = Biome::new("Seasonal Forest", 169, 204, 164);
pub const TROPICAL_RAIN_FOREST: Biome = Biome::new("Tropical Rain Forest", 120, 186, 139);
pub const SWAMP: Biome = Biome::new("Swamp", 59, 117, 23);
pub const MARSH: Biome = Biome::new("Marsh", 111, 163, 95);
pub const HYPERARID_DESERT: Biome = Biome::new("Hyperarid Desert", 230, 189, 114);
pub const SUBTROPICAL_DESERT: Biome = Biome::new("Subtropical Desert", 233, 221, 199);
pub const PLAIN: Biome = Biome::new("Plain", 221, 230, 154);
pub const GRASSLAND: Biome = Biome::new("Grassland", 224, 252, 196);
pub const FOREST: Biome = Biome::new("Forest", 123, 159, 59);
pub const RAIN_FOREST: Biome = Biome::new("Rain Forest", 164, 196, 168);
pub const ARID_DESERT: Biome = Biome::new("Arid Desert", 230, 222, 148);
pub const STEPPE: Biome = Biome::new("Steppe", 255, 215, 162);
pub const PRAIRIE: Biome = Biome::new("Prairie", 252, 235, 132);
pub const SHRUBLAND: Biome = Biome::new("Shrubland", 178, 227, 165);
pub const XERIC_SHRUBLAND: Biome = Biome::new("Xeric Shrubland", 211, 241, 143);
pub const MONTANE_FOREST: Biome = Biome::new("Montane Forest", 204, 212, 187);
pub const TAIGA: Biome = Biome::new("Taiga", 177, 206, 124);
pub const BOREAL_FOREST: Biome = Biome::new("Boreal Forest", 213, 221, 213);
pub const SCORCHED: Biome = Biome::new("Scorched", 187, 169, 165);
pub const BOREAL_TUNDRA: Biome = Biome::new("Boreal Tundra", 221, 221, 187);
pub const TUNDRA: Biome = Biome::new("Tundra", 249, 255, 249);
pub const ICE_CAPS: Biome = Biome::new("Ice Caps", 231, 252, 255);
pub const COLD_DESERT: Biome = Biome::new("Cold Desert", 240, 239, 236);
pub const POLAR_DESERT: Biome = Biome::new("Polar Desert", 246, 240, 242);

/// Land biomes by height row and moisture column (driest first)
#[rustfmt::skip]
pub static BIOME_TABLE: [[Biome; 7]; 6] = [
    [SALT_PAN,         SALT_PAN,           SAVANNA,         SAVANNA,       SEASONAL_FOREST, MARSH,                SWAMP],
    [HYPERARID_DESERT, SUBTROPICAL_DESERT, PLAIN,           PLAIN,         SEASONAL_FOREST, TROPICAL_RAIN_FOREST, TROPICAL_RAIN_FOREST],
    [ARID_DESERT,      STEPPE,             PRAIRIE,         PRAIRIE,       GRASSLAND,       FOREST,               RAIN_FOREST],
    [ARID_DESERT,      STEPPE,             XERIC_SHRUBLAND, GRASSLAND,     GRASSLAND,       FOREST,               RAIN_FOREST],
    [SCORCHED,         COLD_DESERT,        XERIC_SHRUBLAND, SHRUBLAND,     TAIGA,           MONTANE_FOREST,       BOREAL_FOREST],
    [SCORCHED,         POLAR_DESERT,       BOREAL_TUNDRA,   BOREAL_TUNDRA, TUNDRA,          TUNDRA,               ICE_CAPS],
];

/// Height row of the table
fn height_row(height: f32) -> usize {
    (height * 6.0).clamp(0.0, 5.0) as usize
}

/// Dryness bucket, 0 (wet) to 6 (dry)
fn dryness(aridity: f32, foehn: f32) -> usize {
    (aridity * 5.0 + foehn * 0.25).clamp(0.0, 6.0) as usize
}

/// Biome of a cell with the given fields.
pub fn classify_biome(height: f32, aridity: f32, foehn: f32, cell_type: CellType) -> &'static Biome {
    match cell_type {
        CellType::Flowing => &RIVER,
        CellType::Stagnant | CellType::InlandLake => &LAKE,
        CellType::Water | CellType::Ocean | CellType::DeepOcean => &OCEAN,
        CellType::Land => &BIOME_TABLE[height_row(height)][6 - dryness(aridity, foehn)],
    }
}

/// Every distinct land biome in table order.
pub fn land_biomes() -> Vec<&'static Biome> {
    let mut out: Vec<&'static Biome> = Vec::new();
    for row in BIOME_TABLE.iter() {
        for biome in row {
            if !out.contains(&biome) {
                out.push(biome);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_biome() {
        let a = classify_biome(0.4, 0.3, 0.1, CellType::Land);
        let b = classify_biome(0.4, 0.3, 0.1, CellType::Land);
        assert_eq!(a, b);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_water_types() {
        assert_eq!(classify_biome(1.0, 1.0, 1.0, CellType::Flowing), &RIVER);
        assert_eq!(classify_biome(0.0, 0.0, 0.0, CellType::Stagnant), &LAKE);
        assert_eq!(classify_biome(0.0, 0.0, 0.0, CellType::InlandLake), &LAKE);
        for t in [CellType::Water, CellType::Ocean, CellType::DeepOcean] {
            assert_eq!(classify_biome(0.5, 0.5, 0.0, t), &OCEAN);
        }
    }

    #[test]
    fn test_table_corners() {
        // Low and wet
        assert_eq!(classify_biome(0.0, 0.0, 0.0, CellType::Land), &SWAMP);
        // Low and dry
        assert_eq!(classify_biome(0.0, 5.0, 0.0, CellType::Land), &SALT_PAN);
        // High and wet
        assert_eq!(classify_biome(2.0, 0.0, 0.0, CellType::Land), &ICE_CAPS);
        // High and dry
        assert_eq!(classify_biome(2.0, 5.0, 0.0, CellType::Land), &SCORCHED);
    }

    #[test]
    fn test_foehn_dries_the_cell() {
        let wet = classify_biome(0.5, 0.0, 0.0, CellType::Land);
        let dried = classify_biome(0.5, 0.0, 8.0, CellType::Land);
        assert_eq!(wet, &RAIN_FOREST);
        assert_eq!(dried, &GRASSLAND);
    }

    #[test]
    fn test_negative_inputs_clamp() {
        assert_eq!(classify_biome(-3.0, -3.0, -10.0, CellType::Land), &SWAMP);
    }

    #[test]
    fn test_land_biomes_unique() {
        let all = land_biomes();
        assert_eq!(all.len(), 26);
        assert!(!all.contains(&&OCEAN));
    }
}
