//! Validation and walk of the single enemy route.

use std::collections::HashSet;

use hex_defence_core::PathError;

use crate::{
    map::{CellId, GridCell},
    topology::Topology,
};

/// Upper bound on walk steps before the route is considered runaway.
pub const MAX_WALK_STEPS: usize = 1_000;

/// Walks the route from the spawn to the destination.
///
/// The walk always picks the first unvisited path neighbour in canonical
/// direction order, so identical maps always produce identical routes. Nothing
/// is mutated here; the caller links waypoints only when a route is returned.
pub(crate) fn walk(cells: &[GridCell], topology: &Topology) -> Result<Vec<CellId>, PathError> {
    let spawn = match topology.spawn_cells() {
        [] => return Err(PathError::MissingSpawn),
        [spawn] => *spawn,
        many => return Err(PathError::MultipleSpawns { count: many.len() }),
    };
    let spawn_cell = &cells[spawn.index()];
    let path_neighbors = spawn_cell.path_neighbours(cells).count();
    if path_neighbors != 1 {
        return Err(PathError::SpawnNotPathEnd {
            cell: spawn_cell.coordinates(),
            path_neighbors,
        });
    }

    let destination = match topology.destination_cells() {
        [] => return Err(PathError::MissingDestination),
        [destination] => *destination,
        many => {
            return Err(PathError::MultipleDestinations { count: many.len() });
        }
    };
    let destination_cell = &cells[destination.index()];
    let path_neighbors = destination_cell.path_neighbours(cells).count();
    if path_neighbors != 1 {
        return Err(PathError::DestinationNotPathEnd {
            cell: destination_cell.coordinates(),
            path_neighbors,
        });
    }

    let mut route = vec![spawn];
    let mut visited = HashSet::from([spawn]);
    let mut current = spawn;
    while current != destination {
        let cell = &cells[current.index()];
        let path_neighbors = cell.path_neighbours(cells).count();
        if path_neighbors > 2 {
            return Err(PathError::Branching {
                cell: cell.coordinates(),
                path_neighbors,
            });
        }

        let Some(next) = cell
            .path_neighbours(cells)
            .find(|neighbour| !visited.contains(neighbour))
        else {
            break;
        };
        if route.len() >= MAX_WALK_STEPS {
            return Err(PathError::WalkLimitExceeded {
                limit: MAX_WALK_STEPS,
            });
        }

        let _ = visited.insert(next);
        route.push(next);
        current = next;
    }

    if current != destination {
        return Err(PathError::Disconnected {
            end: cells[current.index()].coordinates(),
        });
    }

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{authoring::parse_layout, HexMap};
    use hex_defence_core::{HexCoordinate, OffsetCoordinate};

    fn build(rows: &[&str]) -> Result<usize, PathError> {
        let mut map = HexMap::from_specs(parse_layout(rows).expect("layout"));
        map.rebuild()
    }

    fn cell(column: i32, row: i32) -> HexCoordinate {
        HexCoordinate::from_offset(OffsetCoordinate::new(column, row))
    }

    #[test]
    fn straight_route_is_accepted() {
        assert_eq!(build(&["s p p p d"]), Ok(5));
    }

    #[test]
    fn adjacent_spawn_and_destination_form_two_waypoints() {
        assert_eq!(build(&["s d"]), Ok(2));
    }

    #[test]
    fn missing_roles_are_rejected() {
        assert_eq!(build(&["p p d"]), Err(PathError::MissingSpawn));
        assert_eq!(build(&["s p p"]), Err(PathError::MissingDestination));
    }

    #[test]
    fn duplicate_roles_are_counted() {
        assert_eq!(
            build(&["s p d g s"]),
            Err(PathError::MultipleSpawns { count: 2 })
        );
        assert_eq!(
            build(&["s p d g d"]),
            Err(PathError::MultipleDestinations { count: 2 })
        );
    }

    #[test]
    fn spawn_in_the_middle_of_a_path_is_rejected() {
        assert_eq!(
            build(&["p s p d"]),
            Err(PathError::SpawnNotPathEnd {
                cell: cell(1, 0),
                path_neighbors: 2,
            })
        );
    }

    #[test]
    fn isolated_destination_is_rejected() {
        assert_eq!(
            build(&["s p g d"]),
            Err(PathError::DestinationNotPathEnd {
                cell: cell(3, 0),
                path_neighbors: 0,
            })
        );
    }

    #[test]
    fn branching_path_is_rejected() {
        // Row 1 is odd, so (1, 1) touches (1, 0) and (2, 0) above it.
        let result = build(&["s p p p d", "g p g g g", "g p g g g"]);
        assert!(
            matches!(result, Err(PathError::Branching { path_neighbors: 3, .. })),
            "{result:?}"
        );
    }

    #[test]
    fn dead_end_short_of_destination_is_disconnected() {
        assert_eq!(
            build(&["s p g p d"]),
            Err(PathError::Disconnected { end: cell(1, 0) })
        );
    }

    fn straight_row(cells: usize) -> String {
        let mut tokens = vec!["s"];
        tokens.extend(std::iter::repeat("p").take(cells - 2));
        tokens.push("d");
        tokens.join(" ")
    }

    #[test]
    fn overlong_route_hits_the_walk_limit() {
        let longest = straight_row(MAX_WALK_STEPS);
        assert_eq!(build(&[longest.as_str()]), Ok(MAX_WALK_STEPS));

        let overlong = straight_row(MAX_WALK_STEPS + 1);
        assert_eq!(
            build(&[overlong.as_str()]),
            Err(PathError::WalkLimitExceeded {
                limit: MAX_WALK_STEPS,
            })
        );
    }

    #[test]
    fn bent_route_follows_neighbour_order() {
        let mut map = HexMap::from_specs(
            parse_layout(&["s p g", "g p d"]).expect("layout"),
        );
        assert!(map.rebuild().is_ok());

        let route: Vec<_> = map
            .path()
            .iter()
            .map(|id| map.cell(*id).expect("cell").coordinates())
            .collect();
        assert_eq!(
            route,
            vec![cell(0, 0), cell(1, 0), cell(1, 1), cell(2, 1)]
        );
    }
}
