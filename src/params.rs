//! World generation parameters and configuration

// =============================================================================
// DEFAULT CONSTANTS
// =============================================================================

/// Latitude band spacing of the sample grid, in degrees.
pub const FACE_SIZE: f64 = 2.0;

/// Number of continental island origins.
pub const ISLAND_SEED_COUNT: usize = 16;

/// Flood depth (in cells) grown outward from every cell inside an island disc.
pub const ISLAND_BRANCHING_SIZE: usize = 4;

/// Water extents smaller than this many cells dry out into land.
pub const INLAND_LAKE_SIZE: usize = 64;

pub const HEIGHT_MULTIPLIER: f32 = 1.0;
pub const ARIDITY_MULTIPLIER: f32 = 2.0;

/// Strength lost per hop of foehn propagation.
pub const WIND_DECREMENT: f64 = 0.025;

/// Latitude distance (degrees) at which the foehn falloff kernel reaches zero.
pub const WIND_BAND: f64 = 10.0;

/// One land cell in this many becomes a spring.
pub const SPRING_CHANCE: u32 = 128;

/// Global world generation parameters
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    // =========================================================================
    // Mesh
    // =========================================================================
    /// Latitude band spacing in degrees; smaller means more cells
    pub face_size: f64,

    // =========================================================================
    // Land / water
    // =========================================================================
    pub island_seed_count: usize,
    /// Island disc radius range in radians
    pub island_radius: (f64, f64),
    pub island_branching: usize,
    /// Water farther than this (radians) from land may become deep ocean
    pub deep_ocean_distance: f64,
    /// Half-width of the noise band that selects deep-ocean cells
    pub deep_ocean_band: f64,
    /// (max roots, max flood depth) for the first deep-ocean pool
    pub deep_islands_primary: (usize, f64),
    /// (max roots, max flood depth) for the second deep-ocean pool
    pub deep_islands_secondary: (usize, f64),
    pub inland_lake_size: usize,

    // =========================================================================
    // Fields
    // =========================================================================
    pub height_multiplier: f32,
    pub aridity_multiplier: f32,
    pub spring_chance: u32,
    pub wind_decrement: f64,
    pub wind_band: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            face_size: FACE_SIZE,
            island_seed_count: ISLAND_SEED_COUNT,
            island_radius: (0.1, 0.5),
            island_branching: ISLAND_BRANCHING_SIZE,
            deep_ocean_distance: 0.2,
            deep_ocean_band: 0.1,
            deep_islands_primary: (64, 4.0),
            deep_islands_secondary: (32, 8.0),
            inland_lake_size: INLAND_LAKE_SIZE,
            height_multiplier: HEIGHT_MULTIPLIER,
            aridity_multiplier: ARIDITY_MULTIPLIER,
            spring_chance: SPRING_CHANCE,
            wind_decrement: WIND_DECREMENT,
            wind_band: WIND_BAND,
        }
    }
}

impl GenerationParams {
    /// Defaults with a different mesh resolution.
    pub fn with_face_size(face_size: f64) -> Self {
        Self {
            face_size,
            ..Default::default()
        }
    }
}
