//! Transport modes and submodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown transport mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {name}")]
pub struct UnknownTransportMode {
    name: String,
}

/// The primary mode of a vehicle or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportMode {
    Air,
    Bus,
    Cableway,
    Coach,
    Ferry,
    Funicular,
    Lift,
    Metro,
    Rail,
    Taxi,
    Tram,
    TrolleyBus,
    Water,
    Other,
}

impl TransportMode {
    pub const ALL: [TransportMode; 14] = [
        TransportMode::Air,
        TransportMode::Bus,
        TransportMode::Cableway,
        TransportMode::Coach,
        TransportMode::Ferry,
        TransportMode::Funicular,
        TransportMode::Lift,
        TransportMode::Metro,
        TransportMode::Rail,
        TransportMode::Taxi,
        TransportMode::Tram,
        TransportMode::TrolleyBus,
        TransportMode::Water,
        TransportMode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Air => "air",
            TransportMode::Bus => "bus",
            TransportMode::Cableway => "cableway",
            TransportMode::Coach => "coach",
            TransportMode::Ferry => "ferry",
            TransportMode::Funicular => "funicular",
            TransportMode::Lift => "lift",
            TransportMode::Metro => "metro",
            TransportMode::Rail => "rail",
            TransportMode::Taxi => "taxi",
            TransportMode::Tram => "tram",
            TransportMode::TrolleyBus => "trolleyBus",
            TransportMode::Water => "water",
            TransportMode::Other => "other",
        }
    }

    /// Bus and coach vehicles may serve each other's stops.
    pub fn is_road_coach_pair(self, other: TransportMode) -> bool {
        matches!(
            (self, other),
            (TransportMode::Bus, TransportMode::Coach) | (TransportMode::Coach, TransportMode::Bus)
        )
    }
}

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    /// Parse a mode name, ignoring ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_engine::domain::TransportMode;
    ///
    /// assert_eq!("bus".parse::<TransportMode>().unwrap(), TransportMode::Bus);
    /// assert_eq!("TrolleyBus".parse::<TransportMode>().unwrap(), TransportMode::TrolleyBus);
    /// assert!("hovercraft".parse::<TransportMode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTransportMode {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A refinement of a [`TransportMode`].
///
/// Only the submodes the validator reasons about are named; anything else
/// is carried through as [`TransportSubMode::Unspecified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportSubMode {
    LocalBus,
    RegionalBus,
    ExpressBus,
    NightBus,
    SchoolBus,
    ShuttleBus,
    AirportLinkBus,
    RailReplacementBus,
    LocalTram,
    CityTram,
    Metro,
    Local,
    Regional,
    InterregionalRail,
    LongDistance,
    International,
    NightRail,
    AirportLinkRail,
    TouristRailway,
    LocalPassengerFerry,
    HighSpeedPassengerService,
    InternationalCarFerry,
    Unspecified,
}

impl fmt::Display for TransportSubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_value(self).map_err(|_| fmt::Error)?;
        match json.as_str() {
            Some(name) => f.write_str(name),
            None => Err(fmt::Error),
        }
    }
}

/// Renders "mode" or "mode/submode".
pub fn describe_mode(mode: Option<TransportMode>, submode: Option<TransportSubMode>) -> String {
    let mode = mode.map_or_else(|| "none".to_string(), |m| m.to_string());
    match submode {
        Some(submode) => format!("{mode}/{submode}"),
        None => mode,
    }
}
