use crate::clock::WorldClock;
use crate::config::{ConfigError, ScheduleConfig};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::depot::{Depot, DepotState, GenerationOutcome};
use crate::graph::RailGraph;
use crate::packet::{PacketError, PacketReader};
use crate::platform::{Platform, Siding};
use crate::route::Route;
use crate::{DepotId, DepotSet, PlatformId, PlatformSet, RouteId, RouteSet, SidingId, SidingSet};
use log::debug;

/// A rail network and the entities placed on it.
#[derive(Default)]
pub struct RailNetwork {
    /// The track.
    rails: RailGraph,
    /// The platforms, by ID.
    platforms: PlatformSet,
    /// The sidings, by ID.
    sidings: SidingSet,
    /// The routes, by ID.
    routes: RouteSet,
    /// The depots, by ID.
    depots: DepotSet,
    /// The time constants used for dispatching.
    config: ScheduleConfig,
    /// Debugging information from the last route generation.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl RailNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty network with custom schedule constants.
    pub fn with_config(config: ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// The track.
    pub fn rails(&self) -> &RailGraph {
        &self.rails
    }

    /// The track, for editing.
    pub fn rails_mut(&mut self) -> &mut RailGraph {
        &mut self.rails
    }

    /// Adds a platform, replacing any with the same ID.
    pub fn add_platform(&mut self, platform: Platform) {
        self.platforms.insert(platform.id(), platform);
    }

    /// Removes a platform. Routes that reference it skip it from then on.
    pub fn remove_platform(&mut self, id: PlatformId) -> Option<Platform> {
        self.platforms.remove(&id)
    }

    pub fn get_platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(&id)
    }

    /// Adds a siding, replacing any with the same ID.
    pub fn add_siding(&mut self, siding: Siding) {
        self.sidings.insert(siding.id(), siding);
    }

    pub fn remove_siding(&mut self, id: SidingId) -> Option<Siding> {
        self.sidings.remove(&id)
    }

    pub fn get_siding(&self, id: SidingId) -> Option<&Siding> {
        self.sidings.get(&id)
    }

    /// Adds a route, replacing any with the same ID.
    pub fn add_route(&mut self, route: Route) {
        self.routes.insert(route.id(), route);
    }

    pub fn remove_route(&mut self, id: RouteId) -> Option<Route> {
        self.routes.remove(&id)
    }

    pub fn get_route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Adds a depot, replacing any with the same ID.
    pub fn add_depot(&mut self, depot: Depot) {
        self.depots.insert(depot.id(), depot);
    }

    pub fn remove_depot(&mut self, id: DepotId) -> Option<Depot> {
        self.depots.remove(&id)
    }

    pub fn get_depot(&self, id: DepotId) -> Option<&Depot> {
        self.depots.get(&id)
    }

    pub fn get_depot_mut(&mut self, id: DepotId) -> Option<&mut Depot> {
        self.depots.get_mut(&id)
    }

    /// Returns an iterator over all the platforms.
    pub fn iter_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.values()
    }

    /// Returns an iterator over all the sidings.
    pub fn iter_sidings(&self) -> impl Iterator<Item = &Siding> {
        self.sidings.values()
    }

    /// Returns an iterator over all the routes.
    pub fn iter_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Returns an iterator over all the depots.
    pub fn iter_depots(&self) -> impl Iterator<Item = &Depot> {
        self.depots.values()
    }

    /// Regenerates the operating paths of the sidings in a depot's area.
    /// Returns `None` if there is no such depot.
    pub fn generate_route(&mut self, id: DepotId) -> Option<GenerationOutcome> {
        let depot = self.depots.get(&id)?;
        let outcome = depot.generate_route(&self.rails, &self.platforms, &mut self.sidings, &self.routes);
        self.take_debug();
        Some(outcome)
    }

    /// Regenerates every depot in ascending ID order. Where depot areas overlap,
    /// sidings keep the path from the highest-numbered depot that generated one.
    pub fn generate_all_routes(&mut self) -> Vec<(DepotId, GenerationOutcome)> {
        let outcomes = self
            .sorted_depot_ids()
            .into_iter()
            .filter_map(|id| {
                let depot = self.depots.get(&id)?;
                let outcome =
                    depot.generate_route(&self.rails, &self.platforms, &mut self.sidings, &self.routes);
                Some((id, outcome))
            })
            .collect();
        self.take_debug();
        outcomes
    }

    /// Gives each depot one chance to dispatch, in ascending ID order.
    /// Returns the depots that dispatched.
    pub fn deploy_trains(&mut self, clock: &impl WorldClock) -> Vec<DepotId> {
        let world_time = clock.world_time();
        let now = clock.real_millis();
        let mut deployed = vec![];
        for id in self.sorted_depot_ids() {
            if let Some(depot) = self.depots.get_mut(&id) {
                if depot.deploy_train_with(&self.config, world_time, now) {
                    deployed.push(id);
                }
            }
        }
        deployed
    }

    /// Applies a partial update packet: depot ID, key, then the key's value.
    ///
    /// Returns `Ok(false)` if the depot did not recognise the key.
    pub fn apply_update(&mut self, bytes: &[u8]) -> Result<bool, PacketError> {
        let mut reader = PacketReader::new(bytes);
        let id = DepotId(reader.read_i64()? as u64);
        let key = reader.read_string()?;
        let depot = self
            .depots
            .get_mut(&id)
            .ok_or(PacketError::UnknownDepot(id))?;
        debug!("Updating {:?} of depot {}", key, id);
        depot.update(&key, &mut reader)
    }

    /// Captures the persisted state of every depot, in ascending ID order.
    pub fn save_depots(&self, now_millis: i64) -> Vec<DepotState> {
        self.sorted_depot_ids()
            .into_iter()
            .filter_map(|id| self.depots.get(&id))
            .map(|depot| depot.to_state(now_millis))
            .collect()
    }

    /// Restores depots from their persisted state, replacing any with the same IDs.
    pub fn load_depots(&mut self, states: impl IntoIterator<Item = DepotState>, now_millis: i64) {
        for state in states {
            self.add_depot(Depot::from_state(state, now_millis));
        }
    }

    /// Gets the debugging information from the last route generation as a JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    fn take_debug(&mut self) {
        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    fn sorted_depot_ids(&self) -> Vec<DepotId> {
        let mut ids = self.depots.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}
