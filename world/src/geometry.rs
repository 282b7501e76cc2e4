//! World-space placement of hex cells.

use glam::Vec3;
use hex_defence_core::HexCoordinate;

/// Distance from a cell centre to any of its corners.
pub const OUTER_RADIUS: f32 = 1.15;

/// Distance from a cell centre to the middle of any edge.
pub const INNER_RADIUS: f32 = OUTER_RADIUS * 0.866_025_4;

/// Vertical offset applied per height step.
pub const HEIGHT_MULTIPLIER: f32 = 0.5;

/// Centre of the cell in world space.
///
/// Odd rows are shifted by half a cell along `x`, rows advance along `-z`
/// and `y` carries the cosmetic height.
#[must_use]
pub fn cell_position(coordinates: HexCoordinate, height: i32) -> Vec3 {
    let offset = coordinates.to_offset();
    let shift = if offset.is_odd_row() { 0.5 } else { 0.0 };
    Vec3::new(
        (offset.column() as f32 + shift) * INNER_RADIUS * 2.0,
        height as f32 * HEIGHT_MULTIPLIER,
        -(offset.row() as f32) * OUTER_RADIUS * 1.5,
    )
}
