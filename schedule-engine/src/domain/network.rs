//! Stops, journey patterns and lines.

use geo::Point;
use serde::{Deserialize, Serialize};

use super::{ObjectId, TransportMode, TransportSubMode};

/// WGS84 coordinates of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPosition {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A physical stop place or quay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopArea {
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<GeoPosition>,
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    #[serde(default)]
    pub transport_submode: Option<TransportSubMode>,
    #[serde(default)]
    pub parent: Option<ObjectId>,
}

impl StopArea {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            name: None,
            position: None,
            transport_mode: None,
            transport_submode: None,
            parent: None,
        }
    }

    pub fn at(mut self, longitude: f64, latitude: f64) -> Self {
        self.position = Some(GeoPosition::new(longitude, latitude));
        self
    }

    pub fn with_mode(mut self, mode: TransportMode, submode: Option<TransportSubMode>) -> Self {
        self.transport_mode = Some(mode);
        self.transport_submode = submode;
        self
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A logical stop served by journeys, optionally located in a stop area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledStopPoint {
    pub id: ObjectId,
    #[serde(default)]
    pub stop_area: Option<ObjectId>,
}

/// Whether passengers may board or alight at a stop point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPossibility {
    #[default]
    Normal,
    Forbidden,
    RequestStop,
    IsFlexible,
}

/// A position within a journey pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPoint {
    pub id: ObjectId,
    pub scheduled_stop_point: ObjectId,
    pub position: u32,
    #[serde(default)]
    pub for_boarding: StopPossibility,
    #[serde(default)]
    pub for_alighting: StopPossibility,
}

impl StopPoint {
    pub fn new(id: ObjectId, scheduled_stop_point: ObjectId, position: u32) -> Self {
        Self {
            id,
            scheduled_stop_point,
            position,
            for_boarding: StopPossibility::Normal,
            for_alighting: StopPossibility::Normal,
        }
    }
}

/// An ordered sequence of stop points shared by journeys of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyPattern {
    pub id: ObjectId,
    pub line: ObjectId,
    pub stop_points: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    #[serde(default)]
    pub transport_submode: Option<TransportSubMode>,
}
