use crate::area::Area;
use crate::config::{ScheduleConfig, HOURS_IN_DAY};
use crate::packet::{PacketError, PacketReader, PacketWriter, KEY_AREA, KEY_FREQUENCIES, KEY_NAME, KEY_ROUTE_IDS};
use crate::rail::TransportMode;
use crate::{DepotId, RouteId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub use generate::GenerationOutcome;

mod generate;

/// An area of the network that owns sidings, the routes they serve and how often vehicles leave.
#[derive(Clone, Debug, PartialEq)]
pub struct Depot {
    id: DepotId,
    /// The display name.
    pub name: String,
    /// Sidings whose midpoint lies in this area belong to the depot.
    pub area: Area,
    /// Only rails of this mode are used when generating paths.
    pub transport_mode: TransportMode,
    /// The routes served, in order. Their stops are concatenated.
    route_ids: Vec<RouteId>,
    /// Target dispatches per hour for each hour of the day.
    frequencies: [i32; HOURS_IN_DAY],
    /// The real time of the last dispatch, in ms.
    last_deployed_millis: i64,
}

/// The persisted form of a [Depot].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepotState {
    pub id: DepotId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub area: Area,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub route_ids: Vec<RouteId>,
    pub frequencies: [i32; HOURS_IN_DAY],
    /// The time elapsed since the last dispatch when the state was saved, in ms.
    pub last_deployed: i64,
}

impl Depot {
    /// Creates a depot with no routes and no service.
    pub fn new(id: DepotId, area: Area) -> Self {
        Self {
            id,
            name: String::new(),
            area,
            transport_mode: TransportMode::default(),
            route_ids: vec![],
            frequencies: [0; HOURS_IN_DAY],
            last_deployed_millis: 0,
        }
    }

    pub fn id(&self) -> DepotId {
        self.id
    }

    /// The routes served, in order.
    pub fn route_ids(&self) -> &[RouteId] {
        &self.route_ids
    }

    /// The whole frequency table.
    pub fn frequencies(&self) -> &[i32; HOURS_IN_DAY] {
        &self.frequencies
    }

    /// The real time of the last dispatch, in ms.
    pub fn last_deployed_millis(&self) -> i64 {
        self.last_deployed_millis
    }

    /// Gets the target dispatches per hour for an hour of the day. Out of range hours have no service.
    pub fn get_frequency(&self, hour: usize) -> i32 {
        self.frequencies.get(hour).copied().unwrap_or(0)
    }

    /// Sets the target dispatches per hour for an hour of the day, returning the
    /// change notification to broadcast. Does nothing if `hour` is out of range.
    pub fn set_frequency(&mut self, hour: usize, frequency: i32) -> Option<Vec<u8>> {
        *self.frequencies.get_mut(hour)? = frequency;
        Some(self.notification(KEY_FREQUENCIES, |writer| self.write_frequencies(writer)))
    }

    /// Replaces the served routes, returning the change notification to broadcast.
    pub fn set_route_ids(&mut self, route_ids: Vec<RouteId>) -> Vec<u8> {
        self.route_ids = route_ids;
        self.notification(KEY_ROUTE_IDS, |writer| self.write_route_ids(writer))
    }

    /// Decides whether to dispatch a vehicle now, using the default schedule constants.
    /// See [deploy_train_with](Self::deploy_train_with).
    pub fn deploy_train(&mut self, world_time: i64, now_millis: i64) -> bool {
        self.deploy_train_with(&ScheduleConfig::default(), world_time, now_millis)
    }

    /// Decides whether to dispatch a vehicle now.
    ///
    /// The in-world time picks the active frequency slot; the real time paces
    /// dispatches so that they are at least `millis_per_tick * ticks_per_hour / frequency`
    /// ms apart. Records the dispatch time on success. Constants that fail
    /// [validate](ScheduleConfig::validate) never dispatch.
    pub fn deploy_train_with(
        &mut self,
        config: &ScheduleConfig,
        world_time: i64,
        now_millis: i64,
    ) -> bool {
        let Some(hour) = config.hour_of_day(world_time) else {
            return false;
        };
        let Some(interval) = config.min_interval_millis(self.get_frequency(hour)) else {
            return false;
        };
        let elapsed = now_millis.saturating_sub(self.last_deployed_millis);
        if elapsed < interval {
            return false;
        }
        debug!("Depot {} dispatching at hour {} ({} ms since last)", self.id, hour, elapsed);
        self.last_deployed_millis = now_millis;
        true
    }

    /// Captures the persisted state. `now_millis` is the current real time.
    pub fn to_state(&self, now_millis: i64) -> DepotState {
        DepotState {
            id: self.id,
            name: self.name.clone(),
            area: self.area.clone(),
            transport_mode: self.transport_mode,
            route_ids: self.route_ids.clone(),
            frequencies: self.frequencies,
            last_deployed: now_millis.saturating_sub(self.last_deployed_millis),
        }
    }

    /// Restores a depot from its persisted state. `now_millis` is the current real time.
    pub fn from_state(state: DepotState, now_millis: i64) -> Self {
        Self {
            id: state.id,
            name: state.name,
            area: state.area,
            transport_mode: state.transport_mode,
            route_ids: state.route_ids,
            frequencies: state.frequencies,
            last_deployed_millis: now_millis.saturating_sub(state.last_deployed),
        }
    }

    /// Writes the full state of the depot.
    pub fn write_packet(&self, writer: &mut PacketWriter) {
        writer.write_i64(self.id.0 as i64);
        writer.write_string(&self.name);
        writer.write_string(self.transport_mode.name());
        self.area.write_to(writer);
        self.write_route_ids(writer);
        self.write_frequencies(writer);
        writer.write_i64(self.last_deployed_millis);
    }

    /// Reads a depot written by [write_packet](Self::write_packet).
    pub fn read_packet(reader: &mut PacketReader) -> Result<Self, PacketError> {
        let id = DepotId(reader.read_i64()? as u64);
        let name = reader.read_string()?;
        let mode = reader.read_string()?;
        let transport_mode = match TransportMode::from_name(&mode) {
            Some(transport_mode) => transport_mode,
            None => {
                return Err(PacketError::UnknownTag {
                    kind: "transport mode",
                    tag: mode,
                })
            }
        };
        let area = Area::read_from(reader)?;
        let route_ids = read_route_ids(reader)?;
        let frequencies = read_frequencies(reader)?;
        let last_deployed_millis = reader.read_i64()?;
        Ok(Self {
            id,
            name,
            area,
            transport_mode,
            route_ids,
            frequencies,
            last_deployed_millis,
        })
    }

    /// Applies a partial update received from the host.
    ///
    /// Returns `Ok(false)` if the key is not recognised, leaving the depot unchanged.
    /// The depot is also unchanged if the value is malformed.
    pub fn update(&mut self, key: &str, reader: &mut PacketReader) -> Result<bool, PacketError> {
        match key {
            KEY_ROUTE_IDS => self.route_ids = read_route_ids(reader)?,
            KEY_FREQUENCIES => self.frequencies = read_frequencies(reader)?,
            KEY_NAME => self.name = reader.read_string()?,
            KEY_AREA => self.area = Area::read_from(reader)?,
            _ => {
                warn!("Depot {} ignoring unknown update key {:?}", self.id, key);
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn notification(&self, key: &str, write: impl FnOnce(&mut PacketWriter)) -> Vec<u8> {
        let mut writer = PacketWriter::new();
        writer.write_i64(self.id.0 as i64);
        writer.write_string(key);
        write(&mut writer);
        writer.into_bytes()
    }

    fn write_route_ids(&self, writer: &mut PacketWriter) {
        writer.write_i64_list(self.route_ids.iter().map(|id| id.0 as i64));
    }

    fn write_frequencies(&self, writer: &mut PacketWriter) {
        for frequency in self.frequencies {
            writer.write_i32(frequency);
        }
    }
}

fn read_route_ids(reader: &mut PacketReader) -> Result<Vec<RouteId>, PacketError> {
    Ok(reader
        .read_i64_list()?
        .into_iter()
        .map(|id| RouteId(id as u64))
        .collect())
}

fn read_frequencies(reader: &mut PacketReader) -> Result<[i32; HOURS_IN_DAY], PacketError> {
    let mut frequencies = [0; HOURS_IN_DAY];
    for frequency in &mut frequencies {
        *frequency = reader.read_i32()?;
    }
    Ok(frequencies)
}
