use crate::math::{curve_length, min_radius_of_curvature, CubicBezier2d, LineSegment2d};
use crate::position::{Angle, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The minimum radius of curvature of a curved rail, in blocks.
pub const MIN_RADIUS: f64 = 4.0;

/// The maximum segment length used when measuring a rail, in blocks.
const MEASURE_STEP: f64 = 0.25;

bitflags::bitflags! {
    /// Behavioural flags of a rail.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RailFlags: u8 {
        const PLATFORM       = 0b0000_0001;
        const SIDING         = 0b0000_0010;
        const TURN_BACK      = 0b0000_0100;
        const CAN_ACCELERATE = 0b0000_1000;
        const HAS_SIGNAL     = 0b0001_0000;
    }
}

impl Serialize for RailFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for RailFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| serde::de::Error::custom("Invalid RailFlags bits"))
    }
}

/// How a rail is drawn where it meets a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailShape {
    Straight,
    Curve,
}

/// The kind of vehicle that runs on a rail.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    Train,
    Boat,
    CableCar,
    Airplane,
}

impl TransportMode {
    /// The name used for this mode in packets.
    pub fn name(self) -> &'static str {
        match self {
            TransportMode::Train => "TRAIN",
            TransportMode::Boat => "BOAT",
            TransportMode::CableCar => "CABLE_CAR",
            TransportMode::Airplane => "AIRPLANE",
        }
    }

    /// Parses a packet name, as written by [name](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "TRAIN" => Some(TransportMode::Train),
            "BOAT" => Some(TransportMode::Boat),
            "CABLE_CAR" => Some(TransportMode::CableCar),
            "AIRPLANE" => Some(TransportMode::Airplane),
            _ => None,
        }
    }
}

/// The preset kinds of rail that can be laid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailType {
    Wooden,
    Stone,
    Emerald,
    Iron,
    Obsidian,
    Blaze,
    Quartz,
    Diamond,
    Platform,
    Siding,
    TurnBack,
    CableCar,
}

impl RailType {
    /// The speed limit in km/h.
    pub fn speed_limit(self) -> f64 {
        match self {
            RailType::Wooden => 20.0,
            RailType::Stone => 40.0,
            RailType::Emerald => 60.0,
            RailType::Iron => 80.0,
            RailType::Obsidian => 120.0,
            RailType::Blaze => 160.0,
            RailType::Quartz => 200.0,
            RailType::Diamond => 300.0,
            RailType::Platform | RailType::Siding | RailType::TurnBack => 80.0,
            RailType::CableCar => 30.0,
        }
    }

    /// The shape at both ends of rails of this type.
    pub fn shape(self) -> RailShape {
        match self {
            RailType::CableCar => RailShape::Straight,
            _ => RailShape::Curve,
        }
    }

    /// The behavioural flags given to rails of this type.
    pub fn flags(self) -> RailFlags {
        match self {
            RailType::Platform => RailFlags::PLATFORM,
            RailType::Siding => RailFlags::SIDING,
            RailType::TurnBack => RailFlags::TURN_BACK,
            RailType::CableCar => RailFlags::empty(),
            _ => RailFlags::CAN_ACCELERATE | RailFlags::HAS_SIGNAL,
        }
    }
}

/// Reasons a rail cannot be laid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RailError {
    #[error("rail from {start:?} to {end:?} has an invalid orientation")]
    InvalidOrientation { start: Position, end: Position },
    #[error("rail from {start:?} to {end:?} has a radius of {radius:.2}, below the minimum of {min}", min = MIN_RADIUS)]
    RadiusTooSmall {
        start: Position,
        end: Position,
        radius: f64,
    },
}

/// A directed track segment between two positions.
///
/// A rail does not store its end points; it is keyed by them in a [RailGraph](crate::RailGraph).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rail {
    /// The heading of travel when leaving the start position.
    facing_start: Angle,
    /// The heading of travel when arriving at the end position.
    facing_end: Angle,
    shape_start: RailShape,
    shape_end: RailShape,
    /// Speed limit in km/h.
    speed_limit: f64,
    transport_mode: TransportMode,
    flags: RailFlags,
    /// Length along the track in blocks.
    length: f64,
    /// The tightest radius of curvature along the rail.
    min_radius: f64,
    /// Whether the geometry is impossible to traverse.
    invalid: bool,
}

/// The attributes of a rail.
#[derive(Clone, Copy, Debug)]
pub struct RailAttributes {
    pub shape_start: RailShape,
    pub shape_end: RailShape,
    /// The speed limit in km/h.
    pub speed_limit: f64,
    pub transport_mode: TransportMode,
    pub flags: RailFlags,
}

impl RailAttributes {
    /// The attributes of a preset rail type.
    pub fn of_type(rail_type: RailType, transport_mode: TransportMode) -> Self {
        Self {
            shape_start: rail_type.shape(),
            shape_end: rail_type.shape(),
            speed_limit: rail_type.speed_limit(),
            transport_mode,
            flags: rail_type.flags(),
        }
    }

    /// The attributes of the same track traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            shape_start: self.shape_end,
            shape_end: self.shape_start,
            ..*self
        }
    }
}

impl Rail {
    /// Creates a rail from `start` to `end`, measuring its geometry.
    pub fn new(
        start: Position,
        facing_start: Angle,
        end: Position,
        facing_end: Angle,
        attribs: &RailAttributes,
    ) -> Self {
        let (p1, p2) = (start.to_point2d(), end.to_point2d());
        let straight =
            attribs.shape_start == RailShape::Straight && attribs.shape_end == RailShape::Straight;
        let (horizontal, min_radius) = if straight {
            let line = LineSegment2d::from_ends(p1, p2);
            (curve_length(&line, MEASURE_STEP), f64::INFINITY)
        } else {
            let curve = CubicBezier2d::from_tangents(
                p1,
                facing_start.to_vector(),
                p2,
                facing_end.to_vector(),
            );
            (
                curve_length(&curve, MEASURE_STEP),
                min_radius_of_curvature(&curve),
            )
        };
        let rise = (end.y - start.y) as f64;

        Self {
            facing_start,
            facing_end,
            shape_start: attribs.shape_start,
            shape_end: attribs.shape_end,
            speed_limit: attribs.speed_limit,
            transport_mode: attribs.transport_mode,
            flags: attribs.flags,
            length: horizontal.hypot(rise),
            min_radius,
            invalid: Self::check_invalid(start, facing_start, end, facing_end, straight),
        }
    }

    /// Creates a rail of a preset type.
    pub fn of_type(
        start: Position,
        facing_start: Angle,
        end: Position,
        facing_end: Angle,
        rail_type: RailType,
        transport_mode: TransportMode,
    ) -> Self {
        let attribs = RailAttributes::of_type(rail_type, transport_mode);
        Self::new(start, facing_start, end, facing_end, &attribs)
    }

    fn check_invalid(
        start: Position,
        facing_start: Angle,
        end: Position,
        facing_end: Angle,
        straight: bool,
    ) -> bool {
        use cgmath::InnerSpace;

        let chord = end.to_point2d() - start.to_point2d();
        if chord.magnitude2() == 0.0 {
            return true;
        }
        if facing_start.to_vector().dot(chord) <= 0.0 || facing_end.to_vector().dot(chord) <= 0.0 {
            return true;
        }
        straight
            && !(facing_start == facing_end && Angle::between(&start, &end) == Some(facing_start))
    }

    /// The heading of travel when leaving the start position.
    pub fn facing_start(&self) -> Angle {
        self.facing_start
    }

    /// The heading of travel when arriving at the end position.
    pub fn facing_end(&self) -> Angle {
        self.facing_end
    }

    pub fn shape_start(&self) -> RailShape {
        self.shape_start
    }

    pub fn shape_end(&self) -> RailShape {
        self.shape_end
    }

    /// The speed limit in km/h.
    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn flags(&self) -> RailFlags {
        self.flags
    }

    pub fn is_platform(&self) -> bool {
        self.flags.contains(RailFlags::PLATFORM)
    }

    pub fn is_siding(&self) -> bool {
        self.flags.contains(RailFlags::SIDING)
    }

    pub fn is_turn_back(&self) -> bool {
        self.flags.contains(RailFlags::TURN_BACK)
    }

    pub fn can_accelerate(&self) -> bool {
        self.flags.contains(RailFlags::CAN_ACCELERATE)
    }

    pub fn has_signal(&self) -> bool {
        self.flags.contains(RailFlags::HAS_SIGNAL)
    }

    /// The length along the track in blocks.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Whether the rail is gentle enough to lay.
    pub fn good_radius(&self) -> bool {
        self.min_radius >= MIN_RADIUS
    }

    /// Whether the geometry points away from the far end, or a straight rail is misaligned.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// The time taken to traverse the rail at its speed limit, in ms. Never zero.
    pub fn travel_time_millis(&self) -> u64 {
        let millis = 3600.0 * self.length / self.speed_limit.max(1.0);
        (millis.round() as u64).max(1)
    }

    /// Checks that the rail can be laid, returning the reason if it cannot.
    pub fn validate(&self, start: Position, end: Position) -> Result<(), RailError> {
        if self.invalid {
            Err(RailError::InvalidOrientation { start, end })
        } else if !self.good_radius() {
            Err(RailError::RadiusTooSmall {
                start,
                end,
                radius: self.min_radius,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn pos(x: i32, z: i32) -> Position {
        Position::new(x, 0, z)
    }

    #[test]
    fn straight_rail_length() {
        let rail = Rail::of_type(pos(0, 0), Angle::E, pos(12, 0), Angle::E, RailType::Iron, TransportMode::Train);
        assert_approx_eq!(rail.length(), 12.0, 1e-6);
        assert!(rail.good_radius());
        assert!(!rail.is_invalid());
        assert!(rail.can_accelerate() && rail.has_signal());
        // 12 blocks at 80 km/h
        assert_eq!(rail.travel_time_millis(), 540);
    }

    #[test]
    fn sloped_rail_includes_rise() {
        let rail = Rail::of_type(
            Position::new(0, 0, 0),
            Angle::S,
            Position::new(0, 4, 3),
            Angle::S,
            RailType::Stone,
            TransportMode::Train,
        );
        assert_approx_eq!(rail.length(), 5.0, 1e-3);
    }

    #[test]
    fn reversed_attributes_swap_shapes() {
        let attribs = RailAttributes {
            shape_start: RailShape::Straight,
            shape_end: RailShape::Curve,
            ..RailAttributes::of_type(RailType::Iron, TransportMode::Train)
        };
        let reverse = attribs.reversed();
        assert_eq!(reverse.shape_start, RailShape::Curve);
        assert_eq!(reverse.shape_end, RailShape::Straight);
        assert_eq!(reverse.flags, attribs.flags);
        assert_eq!(reverse.transport_mode, TransportMode::Train);
    }

    #[test]
    fn rail_facing_away_is_invalid() {
        let rail = Rail::of_type(pos(0, 0), Angle::W, pos(10, 0), Angle::E, RailType::Iron, TransportMode::Train);
        assert!(rail.is_invalid());
        assert_eq!(
            rail.validate(pos(0, 0), pos(10, 0)),
            Err(RailError::InvalidOrientation {
                start: pos(0, 0),
                end: pos(10, 0)
            })
        );
    }

    #[test]
    fn misaligned_cable_car_is_invalid() {
        let aligned = Rail::of_type(pos(0, 0), Angle::NE, pos(5, -5), Angle::NE, RailType::CableCar, TransportMode::CableCar);
        assert!(!aligned.is_invalid());
        let misaligned = Rail::of_type(pos(0, 0), Angle::E, pos(5, 1), Angle::E, RailType::CableCar, TransportMode::CableCar);
        assert!(misaligned.is_invalid());
    }

    #[test]
    fn tight_curve_fails_radius_check() {
        let rail = Rail::of_type(pos(0, 0), Angle::E, pos(2, 2), Angle::S, RailType::Iron, TransportMode::Train);
        assert!(!rail.good_radius());
        assert!(matches!(
            rail.validate(pos(0, 0), pos(2, 2)),
            Err(RailError::RadiusTooSmall { .. })
        ));
        let gentle = Rail::of_type(pos(0, 0), Angle::E, pos(30, 30), Angle::S, RailType::Iron, TransportMode::Train);
        assert!(gentle.good_radius());
    }

    #[test]
    fn flags_serialize_as_bits() {
        let flags = RailFlags::PLATFORM | RailFlags::HAS_SIGNAL;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "17");
        let back: RailFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }
}
