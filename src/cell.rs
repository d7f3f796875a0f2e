//! Cells of the world mesh and the landmasses grouping them.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::coords::Spherical;

/// Surface classification of a cell.
///
/// The discriminants are the integer codes used by the persisted format and
/// must stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    Land = 0,
    #[default]
    Water = 1,
    Ocean = 2,
    DeepOcean = 3,
    /// River head, transient during the hydrology simulation
    Flowing = 4,
    /// Basin being filled, transient during the hydrology simulation
    Stagnant = 5,
    InlandLake = 6,
}

impl CellType {
    pub fn all() -> &'static [Self] {
        &[
            Self::Land,
            Self::Water,
            Self::Ocean,
            Self::DeepOcean,
            Self::Flowing,
            Self::Stagnant,
            Self::InlandLake,
        ]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::all().get(code as usize).copied()
    }

    /// Open sea in any of its generation stages.
    pub fn is_sea(self) -> bool {
        matches!(self, Self::Water | Self::Ocean | Self::DeepOcean)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Land => "Land",
            Self::Water => "Water",
            Self::Ocean => "Ocean",
            Self::DeepOcean => "Deep Ocean",
            Self::Flowing => "River",
            Self::Stagnant => "Stagnant",
            Self::InlandLake => "Inland Lake",
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One spherical triangle of the world surface.
#[derive(Clone, Debug)]
pub struct Cell {
    vertices: [Spherical; 3],
    center: Spherical,
    center_c: DVec3,
    pub cell_type: CellType,
    pub height: f32,
    pub aridity: f32,
    pub foehn: f32,
    /// Indices of the cells sharing an edge with this one
    pub neighbors: Vec<usize>,
    /// Index into the world's landmass list, for land cells
    pub landmass: Option<usize>,
}

impl Cell {
    pub fn new(a: Spherical, b: Spherical, c: Spherical) -> Self {
        let center_c = (a.to_unit() + b.to_unit() + c.to_unit()) / 3.0;
        let center_c = center_c.try_normalize().unwrap_or(DVec3::Z);
        Self {
            vertices: [a, b, c],
            center: Spherical::from_vec(center_c),
            center_c,
            cell_type: CellType::default(),
            height: 0.0,
            aridity: 0.0,
            foehn: 0.0,
            neighbors: Vec::with_capacity(3),
            landmass: None,
        }
    }

    pub fn vertices(&self) -> &[Spherical; 3] {
        &self.vertices
    }

    /// Centroid in spherical coordinates
    pub fn center(&self) -> Spherical {
        self.center
    }

    /// Centroid as a unit vector
    pub fn center_c(&self) -> DVec3 {
        self.center_c
    }

    pub fn is(&self, cell_type: CellType) -> bool {
        self.cell_type == cell_type
    }
}

/// A maximal connected group of land cells.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Landmass {
    pub id: usize,
    /// Display color, RGB in [0, 1]
    pub color: [f32; 3],
    pub members: Vec<usize>,
}

impl Landmass {
    pub fn new(id: usize, color: [f32; 3]) -> Self {
        Self {
            id,
            color,
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// True when `cell` has at least one neighbor of `cell_type`.
pub fn borders(cells: &[Cell], cell: usize, cell_type: CellType) -> bool {
    cells[cell].neighbors.iter().any(|&n| cells[n].cell_type == cell_type)
}
