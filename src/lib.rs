pub use area::Area;
pub use clock::{FixedClock, WorldClock};
pub use config::{ConfigError, ScheduleConfig, HOURS_IN_DAY};
pub use depot::{Depot, DepotState, GenerationOutcome};
pub use graph::RailGraph;
pub use network::RailNetwork;
pub use packet::{PacketError, PacketReader, PacketWriter};
pub use path::{
    add_to_path, find_path, find_path_with, is_contiguous, path_length, Path, PathEntry, Waypoint,
};
pub use platform::{Platform, Siding};
pub use position::{Angle, Position};
pub use rail::{Rail, RailAttributes, RailError, RailFlags, RailShape, RailType, TransportMode, MIN_RADIUS};
pub use route::Route;
pub use util::Interval;

mod area;
mod clock;
mod config;
mod debug;
mod depot;
mod graph;
pub mod math;
mod network;
pub mod packet;
mod path;
mod platform;
mod position;
mod rail;
mod route;
mod util;

/// Declares a durable, host-assigned 64-bit entity ID.
macro_rules! id_type {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl From<u64> for $name {
                fn from(id: u64) -> Self {
                    Self(id)
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

id_type! {
    /// Unique ID of a [Platform].
    PlatformId;
    /// Unique ID of a [Siding].
    SidingId;
    /// Unique ID of a [Route].
    RouteId;
    /// Unique ID of a [Depot].
    DepotId;
}

pub type PlatformSet = std::collections::HashMap<PlatformId, Platform>;
pub type SidingSet = std::collections::HashMap<SidingId, Siding>;
pub type RouteSet = std::collections::HashMap<RouteId, Route>;
pub type DepotSet = std::collections::HashMap<DepotId, Depot>;
