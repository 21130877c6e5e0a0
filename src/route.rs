use crate::{PlatformId, RouteId};
use serde::{Deserialize, Serialize};

/// A line's stopping pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    id: RouteId,
    /// The display name.
    pub name: String,
    /// The display colour as `0xRRGGBB`.
    pub color: u32,
    /// The platforms served, in travel order. A platform may appear more than once.
    pub platform_ids: Vec<PlatformId>,
}

impl Route {
    /// Creates a new route.
    pub fn new(id: RouteId, platform_ids: Vec<PlatformId>) -> Self {
        Self {
            id,
            platform_ids,
            ..Default::default()
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }
}
