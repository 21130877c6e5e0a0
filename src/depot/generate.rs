use super::Depot;
use crate::debug::{debug_event, debug_path};
use crate::graph::RailGraph;
use crate::path::{add_to_path, find_path_with, Path, PathEntry, Waypoint};
use crate::platform::{Platform, Siding};
use crate::rail::Rail;
use crate::{PlatformSet, RouteSet, SidingSet};
use log::debug;

/// What a call to [Depot::generate_route] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// None of the depot's routes resolved to any platforms. No sidings were touched.
    NoPlatforms,
    /// The platforms are not connected in order. No sidings were touched.
    NoThroughPath,
    /// Operating paths were assigned to this many sidings.
    Generated { sidings: usize },
}

impl Depot {
    /// The platforms served by this depot, in order, with unknown routes and platforms skipped.
    pub fn resolve_platforms<'a>(
        &self,
        platforms: &'a PlatformSet,
        routes: &RouteSet,
    ) -> Vec<&'a Platform> {
        self.route_ids
            .iter()
            .filter_map(|id| routes.get(id))
            .flat_map(|route| route.platform_ids.iter())
            .filter_map(|id| platforms.get(id))
            .collect()
    }

    /// Generates a new operating path for every siding whose midpoint lies in this depot's area.
    ///
    /// Each path leaves the siding, runs to the first platform, serves every
    /// platform in order and returns from the last platform to the siding. A siding
    /// that cannot complete the loop instead gets the single rail from its first
    /// to its second position, or an empty path if there is no such rail.
    /// Existing paths are replaced wholesale, so when depot areas overlap the
    /// last depot to generate wins.
    pub fn generate_route(
        &self,
        graph: &RailGraph,
        platforms: &PlatformSet,
        sidings: &mut SidingSet,
        routes: &RouteSet,
    ) -> GenerationOutcome {
        let stops = self.resolve_platforms(platforms, routes);
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            debug!("Depot {} has no platforms to serve", self.id);
            debug_event("no_platforms", self.id.0, None);
            return GenerationOutcome::NoPlatforms;
        };

        let filter = |rail: &Rail| rail.transport_mode() == self.transport_mode;
        let waypoints = stops.iter().map(|p| p.waypoint()).collect::<Vec<_>>();
        let through_path = find_path_with(graph, &waypoints, filter);
        if through_path.is_empty() {
            debug!("Depot {} has no path through its {} stops", self.id, stops.len());
            debug_event("no_through_path", self.id.0, Some(first.anchor()));
            return GenerationOutcome::NoThroughPath;
        }
        debug_path("through", self.id.0, &through_path);

        let (first, last) = (first.waypoint(), last.waypoint());
        let mut count = 0;
        let mut ids = sidings.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        for id in ids {
            let Some(siding) = sidings.get_mut(&id) else {
                continue;
            };
            let in_area = siding
                .mid_pos()
                .map_or(false, |pos| self.area.contains(pos.x, pos.z));
            if !in_area {
                continue;
            }
            let path = self.siding_loop(graph, siding, first, last, &through_path, filter);
            debug_path("siding", id.0, &path);
            siding.set_path(path, self.id);
            count += 1;
        }

        debug!("Depot {} generated paths for {} sidings", self.id, count);
        GenerationOutcome::Generated { sidings: count }
    }

    /// Builds the loop from a siding through the stops and back, or the fallback path.
    fn siding_loop(
        &self,
        graph: &RailGraph,
        siding: &Siding,
        first: Waypoint,
        last: Waypoint,
        through_path: &[PathEntry],
        filter: impl Fn(&Rail) -> bool + Copy,
    ) -> Path {
        let mut path = Path::new();
        if let Some(anchor) = siding.waypoint() {
            let s1 = add_to_path(&mut path, &find_path_with(graph, &[anchor, first], filter));
            if s1 {
                add_to_path(&mut path, through_path);
            }
            let s2 = s1 && add_to_path(&mut path, &find_path_with(graph, &[last, anchor], filter));
            if s2 {
                return path;
            }
        }

        debug!("Siding {} cannot reach the depot's stops, using its own track", siding.id());
        debug_event("fallback", siding.id().0, siding.anchor());
        fallback_path(graph, siding)
    }
}

/// The single rail between a siding's first two positions, if there is one.
fn fallback_path(graph: &RailGraph, siding: &Siding) -> Path {
    let [start, end, ..] = siding.ordered_positions() else {
        return Path::new();
    };
    graph
        .lookup(start, end)
        .map(|rail| vec![PathEntry::new(rail.clone(), 0.0, *start, *end)])
        .unwrap_or_default()
}
