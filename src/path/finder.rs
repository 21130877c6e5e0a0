use super::{Path, PathEntry};
use crate::graph::RailGraph;
use crate::position::{Angle, Position};
use crate::rail::Rail;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A point a path must pass through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waypoint {
    /// The node to pass through.
    pub position: Position,
    /// If set, vehicles must arrive at and leave the node along this axis, in either direction.
    pub facing: Option<Angle>,
}

impl Waypoint {
    /// A waypoint with no directional constraint.
    pub fn at(position: Position) -> Self {
        Self {
            position,
            facing: None,
        }
    }
}

/// A search state: a vehicle standing at a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Node {
    pos: Position,
    /// The heading the vehicle arrived with; `None` at the start of a leg.
    heading: Option<Angle>,
    /// Whether the vehicle arrived on a turn-back rail, and so may reverse.
    turned_back: bool,
}

/// Finds a path visiting each waypoint in order.
///
/// Returns an empty path if any pair of consecutive waypoints is disconnected.
/// See [find_path_with] for the search rules.
pub fn find_path(graph: &RailGraph, waypoints: &[Waypoint]) -> Path {
    find_path_with(graph, waypoints, |_| true)
}

/// Finds a path visiting each waypoint in order, only using rails accepted by `filter`.
///
/// Each leg is the quickest route at the rails' speed limits. Vehicles may only
/// reverse at waypoints or after a turn-back rail. Successors are expanded in
/// ascending order of their end position, and among routes of equal cost the
/// first one discovered wins, so the result does not depend on how the graph
/// was built.
pub fn find_path_with(
    graph: &RailGraph,
    waypoints: &[Waypoint],
    filter: impl Fn(&Rail) -> bool,
) -> Path {
    let mut path = Path::new();
    let mut distance = 0.0;

    for (from, to) in waypoints.iter().tuple_windows() {
        if from.position == to.position {
            continue;
        }
        let Some(leg) = find_leg(graph, from, to, &filter) else {
            debug!("No path from {:?} to {:?}", from.position, to.position);
            return Path::new();
        };
        for (a, b) in leg.iter().tuple_windows() {
            let Some(rail) = graph.lookup(&a.pos, &b.pos) else {
                return Path::new();
            };
            path.push(PathEntry::new(rail.clone(), distance, a.pos, b.pos));
            distance += rail.length();
        }
    }

    path
}

/// Finds the nodes visited between two waypoints, including both ends.
fn find_leg(
    graph: &RailGraph,
    from: &Waypoint,
    to: &Waypoint,
    filter: &impl Fn(&Rail) -> bool,
) -> Option<Vec<Node>> {
    let start = Node {
        pos: from.position,
        heading: None,
        turned_back: false,
    };
    let (nodes, _cost) = pathfinding::directed::dijkstra::dijkstra(
        &start,
        |node| successors(graph, node, from, filter),
        |node| arrived(node, to),
    )?;
    Some(nodes)
}

/// The nodes reachable by traversing a single rail from `node`.
fn successors(
    graph: &RailGraph,
    node: &Node,
    from: &Waypoint,
    filter: &impl Fn(&Rail) -> bool,
) -> SmallVec<[(Node, u64); 4]> {
    graph
        .successors(&node.pos)
        .into_iter()
        .filter(|(_, rail)| filter(rail))
        .filter(|(_, rail)| can_depart(node, rail, from))
        .map(|(end, rail)| {
            let next = Node {
                pos: end,
                heading: Some(rail.facing_end()),
                turned_back: rail.is_turn_back(),
            };
            (next, rail.travel_time_millis())
        })
        .collect()
}

/// Whether a vehicle standing at `node` may continue onto `rail`.
fn can_depart(node: &Node, rail: &Rail, from: &Waypoint) -> bool {
    let facing = rail.facing_start();
    match node.heading {
        None => from.facing.map_or(true, |axis| facing.is_parallel(axis)),
        Some(heading) => facing == heading || (node.turned_back && facing == heading.opposite()),
    }
}

/// Whether `node` satisfies the target waypoint.
fn arrived(node: &Node, to: &Waypoint) -> bool {
    node.pos == to.position
        && node
            .heading
            .map_or(false, |heading| to.facing.map_or(true, |axis| heading.is_parallel(axis)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::is_contiguous;
    use crate::rail::{RailType, TransportMode};
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn pos(x: i32, z: i32) -> Position {
        Position::new(x, 0, z)
    }

    fn connect(graph: &mut RailGraph, a: Position, fa: Angle, b: Position, fb: Angle, rail_type: RailType) {
        graph
            .connect(a, fa, b, fb, rail_type, TransportMode::Train)
            .unwrap();
    }

    fn positions(path: &Path) -> Vec<Position> {
        path.iter()
            .map(|e| e.start)
            .chain(path.last().map(|e| e.end))
            .collect()
    }

    /// A straight line along x from 0 to 40.
    fn line() -> RailGraph {
        let mut graph = RailGraph::new();
        for x in [0, 10, 20, 30] {
            connect(&mut graph, pos(x, 0), Angle::E, pos(x + 10, 0), Angle::E, RailType::Iron);
        }
        graph
    }

    #[test]
    fn finds_path_along_line() {
        let graph = line();
        let path = find_path(&graph, &[Waypoint::at(pos(0, 0)), Waypoint::at(pos(30, 0))]);
        assert_eq!(positions(&path), vec![pos(0, 0), pos(10, 0), pos(20, 0), pos(30, 0)]);
        assert!(is_contiguous(&path));
        assert_eq!(path[0].distance, 0.0);
        assert!((path[2].distance - 20.0).abs() < 1e-6);
    }

    #[test]
    fn reverses_at_waypoints() {
        let graph = line();
        let path = find_path(
            &graph,
            &[
                Waypoint::at(pos(10, 0)),
                Waypoint::at(pos(40, 0)),
                Waypoint::at(pos(0, 0)),
            ],
        );
        assert_eq!(
            positions(&path),
            vec![pos(10, 0), pos(20, 0), pos(30, 0), pos(40, 0), pos(30, 0), pos(20, 0), pos(10, 0), pos(0, 0)]
        );
        assert!(is_contiguous(&path));
    }

    #[test]
    fn cannot_reverse_mid_leg() {
        // A branch leaving (10, 0) eastwards towards the south-east.
        let mut graph = line();
        connect(&mut graph, pos(10, 0), Angle::E, pos(30, 20), Angle::S, RailType::Iron);

        // Travelling west from (20, 0) the vehicle cannot take the branch at (10, 0)
        // without reversing, and (30, 20) is only reachable via the branch.
        let path = find_path(
            &graph,
            &[
                Waypoint {
                    position: pos(20, 0),
                    facing: Some(Angle::W),
                },
                Waypoint::at(pos(30, 20)),
            ],
        );
        // Leaving (20, 0) along the W/E axis is still allowed in both directions,
        // but neither direction reaches the branch without reversing at (10, 0).
        assert!(path.is_empty());
    }

    #[test]
    fn turn_back_rail_allows_reversal() {
        let mut graph = line();
        connect(&mut graph, pos(10, 0), Angle::E, pos(30, 20), Angle::S, RailType::Iron);
        connect(&mut graph, pos(-10, 0), Angle::E, pos(0, 0), Angle::E, RailType::TurnBack);

        // From (20, 0) heading west, run onto the turn-back rail at (-10, 0),
        // reverse, and take the branch at (10, 0).
        let path = find_path(
            &graph,
            &[
                Waypoint {
                    position: pos(20, 0),
                    facing: Some(Angle::W),
                },
                Waypoint::at(pos(30, 20)),
            ],
        );
        assert!(!path.is_empty());
        assert!(is_contiguous(&path));
        assert_eq!(path.last().map(|e| e.end), Some(pos(30, 20)));
        assert!(path.iter().any(|e| e.rail.is_turn_back()));
    }

    #[test]
    fn target_facing_must_be_parallel() {
        let mut graph = line();
        connect(&mut graph, pos(10, 0), Angle::E, pos(30, 20), Angle::S, RailType::Iron);
        let to_branch = |facing| {
            find_path(
                &graph,
                &[
                    Waypoint::at(pos(0, 0)),
                    Waypoint {
                        position: pos(30, 20),
                        facing: Some(facing),
                    },
                ],
            )
        };
        assert!(!to_branch(Angle::N).is_empty());
        assert!(to_branch(Angle::E).is_empty());
    }

    #[test]
    fn any_disconnected_leg_empties_the_path() {
        let mut graph = line();
        connect(&mut graph, pos(100, 0), Angle::E, pos(110, 0), Angle::E, RailType::Iron);
        let path = find_path(
            &graph,
            &[
                Waypoint::at(pos(0, 0)),
                Waypoint::at(pos(30, 0)),
                Waypoint::at(pos(110, 0)),
            ],
        );
        assert!(path.is_empty());
    }

    #[test]
    fn fewer_than_two_waypoints_is_empty() {
        let graph = line();
        assert!(find_path(&graph, &[]).is_empty());
        assert!(find_path(&graph, &[Waypoint::at(pos(0, 0))]).is_empty());
    }

    #[test]
    fn filter_restricts_rails() {
        let graph = line();
        let waypoints = [Waypoint::at(pos(0, 0)), Waypoint::at(pos(20, 0))];
        let boats_only = find_path_with(&graph, &waypoints, |rail| rail.transport_mode() == TransportMode::Boat);
        assert!(boats_only.is_empty());
        let trains = find_path_with(&graph, &waypoints, |rail| rail.transport_mode() == TransportMode::Train);
        assert_eq!(trains.len(), 2);
    }

    /// Two mirror-image routes of identical cost between (0, 0) and (40, 0).
    fn diamond_rails() -> Vec<(Position, Position, Rail)> {
        let mut graph = RailGraph::new();
        for z in [-20, 20] {
            let mid = pos(20, z);
            graph.insert(pos(0, 0), mid, Rail::of_type(pos(0, 0), Angle::E, mid, Angle::E, RailType::Iron, TransportMode::Train));
            graph.insert(mid, pos(40, 0), Rail::of_type(mid, Angle::E, pos(40, 0), Angle::E, RailType::Iron, TransportMode::Train));
        }
        graph
            .iter()
            .map(|(start, end, rail)| (*start, *end, rail.clone()))
            .collect()
    }

    #[test]
    fn equal_cost_ties_prefer_lower_positions() {
        let mut graph = RailGraph::new();
        for (start, end, rail) in diamond_rails() {
            graph.insert(start, end, rail);
        }
        let path = find_path(&graph, &[Waypoint::at(pos(0, 0)), Waypoint::at(pos(40, 0))]);
        assert_eq!(positions(&path), vec![pos(0, 0), pos(20, -20), pos(40, 0)]);
    }

    #[test]
    fn result_is_independent_of_insertion_order() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Trains run on time, mostly. Ok!?");
        let mut rails = diamond_rails();
        let mut base = line();
        connect(&mut base, pos(40, 0), Angle::E, pos(50, 0), Angle::E, RailType::Iron);
        rails.extend(
            base.iter()
                .map(|(start, end, rail)| (*start, *end, rail.clone())),
        );
        let waypoints = [Waypoint::at(pos(0, 0)), Waypoint::at(pos(50, 0)), Waypoint::at(pos(10, 0))];

        let mut expected = None;
        for _ in 0..20 {
            rails.shuffle(&mut rng);
            let mut graph = RailGraph::new();
            for (start, end, rail) in rails.iter().cloned() {
                graph.insert(start, end, rail);
            }
            let path = find_path(&graph, &waypoints);
            assert!(!path.is_empty());
            match &expected {
                None => expected = Some(path),
                Some(expected) => assert_eq!(&path, expected),
            }
        }
    }
}
