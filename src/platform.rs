use crate::path::{Path, Waypoint};
use crate::position::{Angle, Position};
use crate::{DepotId, PlatformId, SidingId};
use serde::{Deserialize, Serialize};

/// The default time a vehicle waits at a platform, in s.
pub const DEFAULT_DWELL_TIME: u32 = 20;

/// A stopping point on the network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    id: PlatformId,
    /// The display name.
    pub name: String,
    /// The node a path must pass through to serve the platform.
    anchor: Position,
    /// The axis vehicles must be travelling along at the anchor, if constrained.
    facing: Option<Angle>,
    /// The time vehicles wait at the platform, in s.
    pub dwell_time: u32,
}

impl Platform {
    /// Creates a new platform.
    pub fn new(id: PlatformId, anchor: Position, facing: Option<Angle>) -> Self {
        Self {
            id,
            name: String::new(),
            anchor,
            facing,
            dwell_time: DEFAULT_DWELL_TIME,
        }
    }

    pub fn id(&self) -> PlatformId {
        self.id
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn facing(&self) -> Option<Angle> {
        self.facing
    }

    /// The platform as a path finding waypoint.
    pub fn waypoint(&self) -> Waypoint {
        Waypoint {
            position: self.anchor,
            facing: self.facing,
        }
    }
}

/// A parking track that vehicles are dispatched from.
///
/// The operating path is written only by [Depot::generate_route](crate::Depot::generate_route).
/// When depot areas overlap, the last depot to generate wins.
#[derive(Clone, Debug)]
pub struct Siding {
    id: SidingId,
    /// The display name.
    pub name: String,
    /// The siding's own track, in order. The first position is the anchor.
    positions: Vec<Position>,
    /// The most recently generated operating path.
    path: Path,
    /// The depot that generated `path`.
    path_owner: Option<DepotId>,
}

impl Siding {
    /// Creates a new siding along the given track positions.
    pub fn new(id: SidingId, positions: Vec<Position>) -> Self {
        Self {
            id,
            name: String::new(),
            positions,
            path: Path::new(),
            path_owner: None,
        }
    }

    pub fn id(&self) -> SidingId {
        self.id
    }

    /// The siding's own track positions, in order.
    pub fn ordered_positions(&self) -> &[Position] {
        &self.positions
    }

    /// The node every generated operating path starts and ends at.
    pub fn anchor(&self) -> Option<Position> {
        self.positions.first().copied()
    }

    /// The midpoint of the siding, used to decide which depot it belongs to.
    pub fn mid_pos(&self) -> Option<Position> {
        let first = self.positions.first()?;
        let last = self.positions.last()?;
        Some(first.midpoint(last))
    }

    /// The siding anchor as a path finding waypoint. Vehicles must leave and
    /// arrive along the axis of the siding's first track segment.
    pub fn waypoint(&self) -> Option<Waypoint> {
        let position = self.anchor()?;
        let facing = match self.positions.get(1) {
            Some(next) => Angle::between(&position, next),
            None => None,
        };
        Some(Waypoint { position, facing })
    }

    /// The current operating path. Empty if none could be generated.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The depot that generated the current path.
    pub fn path_owner(&self) -> Option<DepotId> {
        self.path_owner
    }

    /// Replaces the operating path wholesale.
    pub(crate) fn set_path(&mut self, path: Path, depot: DepotId) {
        self.path = path;
        self.path_owner = Some(depot);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn siding_waypoint_follows_first_segment() {
        let siding = Siding::new(
            SidingId(1),
            vec![Position::new(0, 64, 0), Position::new(0, 64, 16), Position::new(8, 64, 24)],
        );
        let waypoint = siding.waypoint().unwrap();
        assert_eq!(waypoint.position, Position::new(0, 64, 0));
        assert_eq!(waypoint.facing, Some(Angle::S));
        assert_eq!(siding.mid_pos(), Some(Position::new(4, 64, 12)));
    }

    #[test]
    fn empty_siding_has_no_anchor() {
        let siding = Siding::new(SidingId(2), vec![]);
        assert!(siding.anchor().is_none());
        assert!(siding.waypoint().is_none());
        assert!(siding.mid_pos().is_none());
        assert!(siding.path().is_empty());
    }

    #[test]
    fn single_position_siding_is_unconstrained() {
        let siding = Siding::new(SidingId(3), vec![Position::new(5, 0, 5)]);
        assert_eq!(siding.waypoint().and_then(|w| w.facing), None);
    }
}
