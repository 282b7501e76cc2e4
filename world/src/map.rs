//! Arena that owns the map cells and the waypoint chain laid over them.

use std::collections::HashSet;

use hex_defence_core::{
    CellSpec, HexCoordinate, HexDirection, PathError, PathingRole, TileKind, WaypointId,
    DIRECTION_COUNT,
};

use crate::{
    geometry::cell_position,
    path,
    topology::{self, Topology},
};

/// Index of a cell inside the map arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of the cell within the arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Waypoint attached to the cell.
    #[must_use]
    pub const fn waypoint(&self) -> WaypointId {
        WaypointId::new(self.0)
    }

    /// Cell that carries the provided waypoint.
    #[must_use]
    pub const fn of_waypoint(waypoint: WaypointId) -> Self {
        Self(waypoint.get())
    }
}

/// Single map cell with its tags and neighbour slots.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    coordinates: HexCoordinate,
    tile: TileKind,
    role: PathingRole,
    height: i32,
    neighbours: [Option<CellId>; DIRECTION_COUNT],
}

impl GridCell {
    fn from_spec(spec: CellSpec) -> Self {
        Self {
            coordinates: spec.coordinates,
            tile: spec.tile,
            role: spec.role,
            height: spec.height,
            neighbours: [None; DIRECTION_COUNT],
        }
    }

    /// Immutable address of the cell.
    #[must_use]
    pub const fn coordinates(&self) -> HexCoordinate {
        self.coordinates
    }

    /// Terrain tag of the cell.
    #[must_use]
    pub const fn tile(&self) -> TileKind {
        self.tile
    }

    /// Pathing role of the cell.
    #[must_use]
    pub const fn role(&self) -> PathingRole {
        self.role
    }

    /// Cosmetic elevation step of the cell.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Neighbour in the provided direction, if one exists.
    #[must_use]
    pub const fn neighbour(&self, direction: HexDirection) -> Option<CellId> {
        self.neighbours[direction.index()]
    }

    /// All neighbour slots in canonical scan order.
    #[must_use]
    pub const fn neighbours(&self) -> &[Option<CellId>; DIRECTION_COUNT] {
        &self.neighbours
    }

    pub(crate) fn clear_neighbours(&mut self) {
        self.neighbours = [None; DIRECTION_COUNT];
    }

    pub(crate) fn set_neighbour(&mut self, direction: HexDirection, cell: Option<CellId>) {
        self.neighbours[direction.index()] = cell;
    }

    /// Neighbours tagged as path, in canonical scan order.
    pub fn path_neighbours<'a>(&'a self, cells: &'a [GridCell]) -> impl Iterator<Item = CellId> + 'a {
        self.neighbours
            .iter()
            .flatten()
            .copied()
            .filter(move |id| cells[id.index()].tile.is_path())
    }
}

/// Node of the doubly linked route attached to a path cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Waypoint {
    number: u32,
    previous: Option<WaypointId>,
    next: Option<WaypointId>,
}

impl Waypoint {
    /// One-based position along the route, zero when unlinked.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Waypoint closer to the spawn.
    #[must_use]
    pub const fn previous(&self) -> Option<WaypointId> {
        self.previous
    }

    /// Waypoint closer to the destination.
    #[must_use]
    pub const fn next(&self) -> Option<WaypointId> {
        self.next
    }

    /// Reports whether the waypoint is linked to any other waypoint.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.previous.is_some() || self.next.is_some()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Hex map arena holding cells, topology and the linked route.
#[derive(Clone, Debug, Default)]
pub struct HexMap {
    cells: Vec<GridCell>,
    waypoints: Vec<Waypoint>,
    topology: Topology,
    path: Vec<CellId>,
    path_error: Option<PathError>,
}

impl HexMap {
    /// Builds a map from authored cells, then computes topology and route.
    ///
    /// Later cells sharing coordinates with an earlier cell are ignored.
    #[must_use]
    pub fn from_specs(specs: impl IntoIterator<Item = CellSpec>) -> Self {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for spec in specs {
            if !seen.insert(spec.coordinates) {
                tracing::warn!(coordinates = %spec.coordinates, "ignoring duplicate map cell");
                continue;
            }
            cells.push(GridCell::from_spec(spec));
        }

        let mut map = Self {
            waypoints: vec![Waypoint::default(); cells.len()],
            cells,
            ..Self::default()
        };
        let _ = map.rebuild();
        map
    }

    /// Rebuilds neighbour slots, then rebuilds the route from scratch.
    ///
    /// A rejected route leaves every waypoint untouched and clears the
    /// playable path.
    pub fn rebuild(&mut self) -> Result<usize, PathError> {
        self.topology = topology::build(&mut self.cells);
        match path::walk(&self.cells, &self.topology) {
            Ok(route) => {
                self.link(route);
                self.path_error = None;
                tracing::info!(waypoints = self.path.len(), "calculated path");
                Ok(self.path.len())
            }
            Err(error) => {
                tracing::warn!(%error, "path rejected");
                self.path.clear();
                self.path_error = Some(error);
                Err(error)
            }
        }
    }

    fn link(&mut self, route: Vec<CellId>) {
        for waypoint in &mut self.waypoints {
            waypoint.reset();
        }

        let mut previous: Option<CellId> = None;
        for (position, cell) in route.iter().enumerate() {
            let waypoint = &mut self.waypoints[cell.index()];
            waypoint.number = u32::try_from(position + 1).unwrap_or(u32::MAX);
            waypoint.previous = previous.map(|id| id.waypoint());
            if let Some(previous) = previous {
                self.waypoints[previous.index()].next = Some(cell.waypoint());
            }
            previous = Some(*cell);
        }

        self.path = route;
    }

    /// Changes the tags of a cell and rebuilds the map.
    ///
    /// Returns `None` when no cell exists at the coordinates.
    pub fn retag(
        &mut self,
        coordinates: HexCoordinate,
        tile: TileKind,
        role: PathingRole,
    ) -> Option<Result<usize, PathError>> {
        let id = self.topology.cell_at(coordinates)?;
        let cell = &mut self.cells[id.index()];
        cell.tile = tile;
        cell.role = role;
        Some(self.rebuild())
    }

    /// Every cell in arena order.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell stored under the provided identifier.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&GridCell> {
        self.cells.get(id.index())
    }

    /// Cell located at the provided coordinates.
    #[must_use]
    pub fn cell_at(&self, coordinates: HexCoordinate) -> Option<CellId> {
        self.topology.cell_at(coordinates)
    }

    /// Coordinate index and role lists computed by the last rebuild.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Waypoint attached to the provided identifier.
    #[must_use]
    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(CellId::of_waypoint(id).index())
    }

    /// Reports whether the waypoint belongs to the current route.
    #[must_use]
    pub fn is_on_path(&self, id: WaypointId) -> bool {
        !self.path.is_empty() && self.waypoint(id).is_some_and(|waypoint| waypoint.number > 0)
    }

    /// World-space position of the waypoint's cell.
    #[must_use]
    pub fn waypoint_position(&self, id: WaypointId) -> Option<glam::Vec3> {
        self.cell(CellId::of_waypoint(id))
            .map(|cell| cell_position(cell.coordinates, cell.height))
    }

    /// Route cells ordered from spawn to destination; empty when unplayable.
    #[must_use]
    pub fn path(&self) -> &[CellId] {
        &self.path
    }

    /// Reason the last rebuild rejected the route, if it did.
    #[must_use]
    pub fn path_error(&self) -> Option<PathError> {
        self.path_error
    }

    /// Waypoint enemies spawn on.
    #[must_use]
    pub fn spawn_waypoint(&self) -> Option<WaypointId> {
        self.path.first().map(CellId::waypoint)
    }

    /// Final waypoint of the route.
    #[must_use]
    pub fn destination_waypoint(&self) -> Option<WaypointId> {
        self.path.last().map(CellId::waypoint)
    }

    /// Follows `next` links from the spawn, stopping on any revisited node.
    #[must_use]
    pub fn waypoint_chain(&self) -> Vec<WaypointId> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = self.spawn_waypoint();
        while let Some(id) = cursor {
            if !visited.insert(id) {
                break;
            }
            chain.push(id);
            cursor = self.waypoint(id).and_then(Waypoint::next);
        }
        chain
    }
}
