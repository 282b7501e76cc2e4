//! Neighbour discovery over the cell arena.

use std::collections::HashMap;

use hex_defence_core::{HexCoordinate, HexDirection, PathingRole};

use crate::map::{CellId, GridCell};

/// Coordinate index and role lists produced by a topology build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    index: HashMap<HexCoordinate, CellId>,
    spawn_cells: Vec<CellId>,
    destination_cells: Vec<CellId>,
}

impl Topology {
    /// Cell stored at the provided coordinates.
    #[must_use]
    pub fn cell_at(&self, coordinates: HexCoordinate) -> Option<CellId> {
        self.index.get(&coordinates).copied()
    }

    /// Cells tagged with the spawn role, in arena order.
    #[must_use]
    pub fn spawn_cells(&self) -> &[CellId] {
        &self.spawn_cells
    }

    /// Cells tagged with the destination role, in arena order.
    #[must_use]
    pub fn destination_cells(&self) -> &[CellId] {
        &self.destination_cells
    }
}

/// Rewires every neighbour slot and collects the role lists.
///
/// Slots whose coordinate is absent from the map stay empty, so each link is
/// symmetric: `b` is `a`'s neighbour in `d` exactly when `a` is `b`'s
/// neighbour in `d.opposite()`.
pub(crate) fn build(cells: &mut [GridCell]) -> Topology {
    let mut topology = Topology::default();
    for (position, cell) in cells.iter().enumerate() {
        let id = CellId::from_index(position);
        let _ = topology.index.insert(cell.coordinates(), id);
        match cell.role() {
            PathingRole::Spawn => topology.spawn_cells.push(id),
            PathingRole::Destination => topology.destination_cells.push(id),
            PathingRole::Normal => {}
        }
    }

    for cell in cells.iter_mut() {
        cell.clear_neighbours();
        for direction in HexDirection::ALL {
            let neighbour = topology.cell_at(cell.coordinates().neighbor(direction));
            cell.set_neighbour(direction, neighbour);
        }
    }

    tracing::debug!(
        cells = cells.len(),
        spawns = topology.spawn_cells.len(),
        destinations = topology.destination_cells.len(),
        "rebuilt map topology"
    );
    topology
}
