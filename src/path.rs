use crate::position::Position;
use crate::rail::Rail;
pub use finder::{find_path, find_path_with, Waypoint};
use itertools::Itertools;

mod finder;

/// One rail traversed by a path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEntry {
    /// The rail being traversed.
    pub rail: Rail,
    /// The distance from the start of the path to the start of this entry, in blocks.
    pub distance: f64,
    /// Where the entry starts.
    pub start: Position,
    /// Where the entry ends.
    pub end: Position,
}

impl PathEntry {
    /// Creates a new path entry.
    pub fn new(rail: Rail, distance: f64, start: Position, end: Position) -> Self {
        Self {
            rail,
            distance,
            start,
            end,
        }
    }

    /// The distance from the start of the path to the end of this entry.
    pub fn end_distance(&self) -> f64 {
        self.distance + self.rail.length()
    }
}

/// A concrete traversal of the network. Empty means "no path".
pub type Path = Vec<PathEntry>;

/// Appends `candidate` to `buffer` if it continues from where `buffer` ends.
///
/// An empty buffer accepts any non-empty candidate. Appended entries have their
/// distances shifted to follow on from the buffer. On failure `buffer` is untouched.
pub fn add_to_path(buffer: &mut Path, candidate: &[PathEntry]) -> bool {
    let Some(first) = candidate.first() else {
        return false;
    };
    let offset = match buffer.last() {
        Some(last) if last.end != first.start => return false,
        Some(last) => last.end_distance() - first.distance,
        None => 0.0,
    };
    buffer.extend(candidate.iter().map(|entry| PathEntry {
        distance: entry.distance + offset,
        ..entry.clone()
    }));
    true
}

/// The total length of a path, in blocks.
pub fn path_length(path: &[PathEntry]) -> f64 {
    path.iter().map(|entry| entry.rail.length()).sum()
}

/// Returns true if every entry starts where the previous one ended.
pub fn is_contiguous(path: &[PathEntry]) -> bool {
    path.iter().tuple_windows().all(|(a, b)| a.end == b.start)
}
