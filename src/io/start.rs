//! Starting configuration reader
//!
//! One particle per line as `x y z`. Blank lines are skipped.

use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{McError, Result};

/// Read positions from `path`
///
/// When `expected` is given the file must hold exactly that many particles.
pub fn read_starting_positions(path: &Path, expected: Option<usize>) -> Result<Vec<Vector3<f64>>> {
    let file = File::open(path).map_err(|e| McError::io(path, e))?;
    parse_starting_positions(BufReader::new(file), path, expected)
}

/// Parse positions from any reader; `path` only labels errors
pub fn parse_starting_positions<R: BufRead>(
    reader: R,
    path: &Path,
    expected: Option<usize>,
) -> Result<Vec<Vector3<f64>>> {
    let error = |message: String| McError::StartingConfiguration {
        path: path.to_path_buf(),
        message,
    };

    let mut positions = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| McError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let coords = trimmed
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| error(format!("line {}: {}", line_no + 1, e)))?;
        if coords.len() != 3 {
            return Err(error(format!(
                "line {}: expected 3 coordinates, found {}",
                line_no + 1,
                coords.len()
            )));
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(error(format!(
                "line {}: coordinates must be finite numbers",
                line_no + 1
            )));
        }
        positions.push(Vector3::new(coords[0], coords[1], coords[2]));
    }

    if let Some(n) = expected {
        if positions.len() != n {
            return Err(error(format!(
                "expected {} particles, found {}",
                n,
                positions.len()
            )));
        }
    }

    Ok(positions)
}
