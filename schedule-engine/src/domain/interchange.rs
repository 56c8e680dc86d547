//! Planned connections between journeys.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// A planned connection from a feeder journey to a consumer journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interchange {
    pub id: ObjectId,
    pub feeder_stop_point: ObjectId,
    pub feeder_journey: ObjectId,
    pub consumer_stop_point: ObjectId,
    pub consumer_journey: ObjectId,
    #[serde(default)]
    pub guaranteed: bool,
    /// Minimum transfer time in seconds.
    #[serde(default)]
    pub minimum_transfer_seconds: Option<i64>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl Interchange {
    pub fn new(
        id: ObjectId,
        feeder: (ObjectId, ObjectId),
        consumer: (ObjectId, ObjectId),
    ) -> Self {
        let (feeder_stop_point, feeder_journey) = feeder;
        let (consumer_stop_point, consumer_journey) = consumer;
        Self {
            id,
            feeder_stop_point,
            feeder_journey,
            consumer_stop_point,
            consumer_journey,
            guaranteed: false,
            minimum_transfer_seconds: None,
            priority: None,
        }
    }

    /// The (feeder stop, consumer stop, feeder journey, consumer journey)
    /// tuple that identifies the connection regardless of its id.
    pub fn connection_key(&self) -> (&ObjectId, &ObjectId, &ObjectId, &ObjectId) {
        (
            &self.feeder_stop_point,
            &self.consumer_stop_point,
            &self.feeder_journey,
            &self.consumer_journey,
        )
    }
}
