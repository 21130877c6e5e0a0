use crate::position::{Angle, Position};
use crate::rail::{Rail, RailAttributes, RailError, RailType, TransportMode};
use log::trace;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The directed rail network: start position → end position → rail.
///
/// A two-way connection is stored as two rails, one per direction.
#[derive(Clone, Debug, Default)]
pub struct RailGraph {
    rails: HashMap<Position, HashMap<Position, Rail>>,
}

impl RailGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Gets the rail from `start` to `end`, if one exists.
    pub fn lookup(&self, start: &Position, end: &Position) -> Option<&Rail> {
        self.rails.get(start)?.get(end)
    }

    /// Returns true if a rail runs from `start` to `end`.
    pub fn has_edge(&self, start: &Position, end: &Position) -> bool {
        self.lookup(start, end).is_some()
    }

    /// The rails leaving `start`, in ascending order of their end position.
    pub fn successors(&self, start: &Position) -> SmallVec<[(Position, &Rail); 4]> {
        let mut out = self
            .rails
            .get(start)
            .map(|ends| ends.iter().map(|(end, rail)| (*end, rail)).collect())
            .unwrap_or_else(SmallVec::new);
        out.sort_unstable_by_key(|(end, _)| *end);
        out
    }

    /// Inserts a single directed rail, replacing any existing rail between the same positions.
    pub fn insert(&mut self, start: Position, end: Position, rail: Rail) {
        self.rails.entry(start).or_default().insert(end, rail);
    }

    /// Lays a two-way rail of a preset type. Each direction is measured and
    /// validated from its own end points and nothing is inserted unless both are valid.
    pub fn connect(
        &mut self,
        start: Position,
        facing_start: Angle,
        end: Position,
        facing_end: Angle,
        rail_type: RailType,
        transport_mode: TransportMode,
    ) -> Result<(), RailError> {
        let attribs = RailAttributes::of_type(rail_type, transport_mode);
        let forward = Rail::new(start, facing_start, end, facing_end, &attribs);
        let backward = Rail::new(
            end,
            facing_end.opposite(),
            start,
            facing_start.opposite(),
            &attribs.reversed(),
        );
        forward.validate(start, end)?;
        backward.validate(end, start)?;
        trace!("Connecting {:?} <-> {:?} ({:?})", start, end, rail_type);
        self.insert(start, end, forward);
        self.insert(end, start, backward);
        Ok(())
    }

    /// Lays a rail that may only be traversed from `start` to `end`.
    pub fn connect_one_way(
        &mut self,
        start: Position,
        facing_start: Angle,
        end: Position,
        facing_end: Angle,
        rail_type: RailType,
        transport_mode: TransportMode,
    ) -> Result<(), RailError> {
        let rail = Rail::of_type(start, facing_start, end, facing_end, rail_type, transport_mode);
        rail.validate(start, end)?;
        trace!("Connecting {:?} -> {:?} ({:?})", start, end, rail_type);
        self.insert(start, end, rail);
        Ok(())
    }

    /// Removes the rails between two positions in both directions.
    /// Returns true if anything was removed.
    pub fn disconnect(&mut self, a: &Position, b: &Position) -> bool {
        let removed_ab = self.remove_edge(a, b);
        let removed_ba = self.remove_edge(b, a);
        removed_ab || removed_ba
    }

    /// Removes a position and every rail touching it.
    pub fn remove_position(&mut self, pos: &Position) {
        if let Some(ends) = self.rails.remove(pos) {
            for end in ends.keys() {
                self.remove_edge(end, pos);
            }
        }
        // One-way rails into `pos` have no reverse entry to follow.
        self.rails.retain(|_, ends| {
            ends.remove(pos);
            !ends.is_empty()
        });
    }

    fn remove_edge(&mut self, start: &Position, end: &Position) -> bool {
        let Some(ends) = self.rails.get_mut(start) else {
            return false;
        };
        let removed = ends.remove(end).is_some();
        if ends.is_empty() {
            self.rails.remove(start);
        }
        removed
    }

    /// The number of directed rails in the graph.
    pub fn rail_count(&self) -> usize {
        self.rails.values().map(HashMap::len).sum()
    }

    /// Returns true if the graph has no rails.
    pub fn is_empty(&self) -> bool {
        self.rails.is_empty()
    }

    /// Returns an iterator over every directed rail as `(start, end, rail)`.
    pub fn iter(&self) -> impl Iterator<Item = (&Position, &Position, &Rail)> {
        self.rails
            .iter()
            .flat_map(|(start, ends)| ends.iter().map(move |(end, rail)| (start, end, rail)))
    }
}
