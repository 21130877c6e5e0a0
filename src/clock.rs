/// The host's view of time, consulted once per tick when dispatching.
pub trait WorldClock {
    /// The current in-world time, in world time units. Selects the active frequency slot.
    fn world_time(&self) -> i64;

    /// The current wall-clock time in ms. Paces dispatches.
    fn real_millis(&self) -> i64;
}

/// A clock frozen at fixed readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedClock {
    pub world_time: i64,
    pub real_millis: i64,
}

impl WorldClock for FixedClock {
    fn world_time(&self) -> i64 {
        self.world_time
    }

    fn real_millis(&self) -> i64 {
        self.real_millis
    }
}
