//! Helpers that produce cell lists for [`hex_defence_core::Command::LoadMap`].

use hex_defence_core::{CellSpec, HexCoordinate, OffsetCoordinate, PathingRole, TileKind};

/// Errors raised while parsing a text layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The layout contained no cells.
    #[error("layout contains no cells")]
    Empty,
    /// A token did not start with a known tile character.
    #[error("unknown tile `{token}` at row {row}, column {column}")]
    UnknownTile {
        /// Zero-based row of the token.
        row: usize,
        /// Zero-based column of the token.
        column: usize,
        /// Offending token.
        token: String,
    },
    /// The height suffix of a token was not an integer.
    #[error("invalid height in `{token}` at row {row}, column {column}")]
    InvalidHeight {
        /// Zero-based row of the token.
        row: usize,
        /// Zero-based column of the token.
        column: usize,
        /// Offending token.
        token: String,
    },
}

/// Generates a rectangular grid of offset rows.
///
/// When `centered` is set the grid straddles the origin, putting the extra
/// row or column on the positive side for odd sizes.
#[must_use]
pub fn generate_grid(width: u32, height: u32, centered: bool, tile: TileKind) -> Vec<CellSpec> {
    let (columns, rows) = (span(width, centered), span(height, centered));
    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for row in rows {
        for column in columns.clone() {
            let coordinates = HexCoordinate::from_offset(OffsetCoordinate::new(column, row));
            cells.push(CellSpec::new(coordinates, tile, PathingRole::Normal));
        }
    }
    cells
}

fn span(size: u32, centered: bool) -> std::ops::Range<i32> {
    let size = i32::try_from(size).unwrap_or(i32::MAX);
    if centered {
        let half = size / 2;
        -half..size - half
    } else {
        0..size
    }
}

/// Parses whitespace separated tile tokens, one offset row per line.
///
/// Each token starts with a tile character followed by an optional height:
/// `.` empty, `g` grass, `w` water, `p` path, `s` spawn path and `d`
/// destination path. `g2` is a grass cell raised two steps.
pub fn parse_layout<S: AsRef<str>>(rows: &[S]) -> Result<Vec<CellSpec>, LayoutError> {
    let mut cells = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        for (column, token) in line.as_ref().split_whitespace().enumerate() {
            cells.push(parse_token(row, column, token)?);
        }
    }

    if cells.is_empty() {
        return Err(LayoutError::Empty);
    }
    Ok(cells)
}

fn parse_token(row: usize, column: usize, token: &str) -> Result<CellSpec, LayoutError> {
    let mut chars = token.chars();
    let kind = chars.next().unwrap_or('.');
    let (tile, role) = match kind {
        '.' => (TileKind::Empty, PathingRole::Normal),
        'g' => (TileKind::Grass, PathingRole::Normal),
        'w' => (TileKind::Water, PathingRole::Normal),
        'p' => (TileKind::Path, PathingRole::Normal),
        's' => (TileKind::Path, PathingRole::Spawn),
        'd' => (TileKind::Path, PathingRole::Destination),
        _ => {
            return Err(LayoutError::UnknownTile {
                row,
                column,
                token: token.to_owned(),
            })
        }
    };

    let suffix = chars.as_str();
    let height = if suffix.is_empty() {
        0
    } else {
        suffix.parse().map_err(|_| LayoutError::InvalidHeight {
            row,
            column,
            token: token.to_owned(),
        })?
    };

    let offset = OffsetCoordinate::new(to_i32(column), to_i32(row));
    Ok(CellSpec::new(offset.to_axial(), tile, role).with_height(height))
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
