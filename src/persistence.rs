//! Plain-text world snapshots
//!
//! One line per cell, tab separated:
//!
//! ```text
//! id  type  height  aridity  foehn  a.lon  a.lat  b.lon  b.lat  c.lon  c.lat  neighbor...
//! ```
//!
//! Cell ids are dense and equal to the line's position among non-blank
//! lines. Type codes are the stable `CellType` discriminants.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::cell::{Cell, CellType};
use crate::coords::Spherical;
use crate::error::{Result, WorldError};

/// Fields before the neighbor list
const FIXED_FIELDS: usize = 11;

/// Write every cell as one line.
pub fn write_cells<W: Write>(cells: &[Cell], mut out: W) -> Result<()> {
    for (id, cell) in cells.iter().enumerate() {
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            id,
            cell.cell_type.code(),
            cell.height,
            cell.aridity,
            cell.foehn
        )?;
        for v in cell.vertices() {
            write!(out, "\t{}\t{}", v.lon, v.lat)?;
        }
        for n in &cell.neighbors {
            write!(out, "\t{}", n)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_cells(cells: &[Cell], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_cells(cells, BufWriter::new(file))
}

fn field<T: FromStr>(fields: &[&str], at: usize, line: usize, name: &str) -> Result<T> {
    fields[at]
        .trim()
        .parse()
        .map_err(|_| WorldError::format(line, format!("invalid {} {:?}", name, fields[at])))
}

/// Parse a snapshot. Nothing is returned unless every line is valid.
pub fn parse_cells(text: &str) -> Result<Vec<Cell>> {
    let mut cells = Vec::new();
    let mut lines = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split('\t').collect();
        if fields.len() < FIXED_FIELDS {
            return Err(WorldError::format(
                line,
                format!("expected at least {} fields, found {}", FIXED_FIELDS, fields.len()),
            ));
        }

        let id: usize = field(&fields, 0, line, "id")?;
        if id != cells.len() {
            return Err(WorldError::format(line, format!("id {} out of sequence, expected {}", id, cells.len())));
        }
        let code: u8 = field(&fields, 1, line, "type code")?;
        let cell_type =
            CellType::from_code(code).ok_or_else(|| WorldError::format(line, format!("unknown type code {}", code)))?;

        let mut vertices = [Spherical::default(); 3];
        for (k, v) in vertices.iter_mut().enumerate() {
            let lon = field(&fields, 5 + 2 * k, line, "longitude")?;
            let lat = field(&fields, 6 + 2 * k, line, "latitude")?;
            *v = Spherical::new(lon, lat);
        }

        let mut cell = Cell::new(vertices[0], vertices[1], vertices[2]);
        cell.cell_type = cell_type;
        cell.height = field(&fields, 2, line, "height")?;
        cell.aridity = field(&fields, 3, line, "aridity")?;
        cell.foehn = field(&fields, 4, line, "foehn")?;
        cell.neighbors = (FIXED_FIELDS..fields.len())
            .map(|k| field(&fields, k, line, "neighbor id"))
            .collect::<Result<_>>()?;

        cells.push(cell);
        lines.push(line);
    }

    let count = cells.len();
    for (cell, &line) in cells.iter().zip(&lines) {
        if let Some(&bad) = cell.neighbors.iter().find(|&&n| n >= count) {
            return Err(WorldError::format(line, format!("neighbor id {} out of range ({} cells)", bad, count)));
        }
    }

    Ok(cells)
}

pub fn load_cells(path: &Path) -> Result<Vec<Cell>> {
    let text = std::fs::read_to_string(path)?;
    parse_cells(&text)
}
