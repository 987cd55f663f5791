use serde::{Deserialize, Serialize};

use crate::services::pin::Pin;

/// Aggregate marker for two or more overlapping pins. Regenerated wholesale on
/// every recompute; its id carries no identity across recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub position_x: f64,
    pub position_y: f64,
    pub size: f64,
    pub number_of_pins: usize,
    pub names: Vec<String>,
}

/// Ready-to-render output of one clustering pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub pins: Vec<Pin>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker<'a> {
    Pin(&'a Pin),
    Cluster(&'a Cluster),
}
