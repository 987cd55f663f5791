//! Zoom-dependent aggregation of overlapping pins.
//!
//! Grouping is a greedy flood fill over the pin list in repository order: each
//! unprocessed pin seeds (or joins) a group which is then grown to a fixed
//! point before the next pin is looked at. Worst case is O(n³) in the number of
//! pins, which is fine for the tens to low hundreds a board holds.
//!
//! Emission order follows traversal order, so two boards holding the same pins
//! in a different order render the same groups with members, names and
//! clusters listed in a different order.

use uuid::Uuid;

use crate::services::pin::Pin;

pub mod types;

pub use types::*;

/// Two pins overlap when their centers are strictly closer than their combined
/// radius at the given zoom factor. Tangent pins do not overlap.
pub fn pins_overlap(first: &Pin, second: &Pin, zoom_factor: f64) -> bool {
    let distance =
        (second.position_x - first.position_x).hypot(second.position_y - first.position_y);
    let combined_radius = (first.size + second.size) / (2.0 * zoom_factor);
    distance < combined_radius
}

fn find_or_create_group(
    groups: &mut Vec<Vec<usize>>,
    pins: &[Pin],
    pin: &Pin,
    zoom_factor: f64,
) -> usize {
    if let Some(existing) = groups.iter().position(|group| {
        group
            .iter()
            .any(|&member| pins_overlap(pin, &pins[member], zoom_factor))
    }) {
        return existing;
    }
    groups.push(Vec::new());
    groups.len() - 1
}

/// Splits `pins` into stand-alone pins and clusters at `zoom_factor`, which
/// must be positive. Pure: no state survives between calls.
pub fn recompute(pins: &[Pin], zoom_factor: f64) -> DisplayState {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut processed = vec![false; pins.len()];

    for (index, pin) in pins.iter().enumerate() {
        if processed[index] {
            continue;
        }

        let group = find_or_create_group(&mut groups, pins, pin, zoom_factor);
        groups[group].push(index);
        processed[index] = true;

        let mut changed = true;
        while changed {
            changed = false;
            for (other_index, other) in pins.iter().enumerate() {
                if processed[other_index] {
                    continue;
                }

                if groups[group]
                    .iter()
                    .any(|&member| pins_overlap(other, &pins[member], zoom_factor))
                {
                    groups[group].push(other_index);
                    processed[other_index] = true;
                    changed = true;
                }
            }
        }
    }

    let mut display = DisplayState {
        pins: pins
            .iter()
            .zip(&processed)
            .filter(|(_, done)| !**done)
            .map(|(pin, _)| pin.clone())
            .collect(),
        clusters: Vec::new(),
    };

    for group in groups {
        match group.as_slice() {
            [single] => display.pins.push(pins[*single].clone()),
            members => display.clusters.push(aggregate(pins, members)),
        }
    }

    display
}

fn aggregate(pins: &[Pin], members: &[usize]) -> Cluster {
    let count = members.len() as f64;
    let mean = |value: fn(&Pin) -> f64| -> f64 {
        members.iter().map(|&member| value(&pins[member])).sum::<f64>() / count
    };

    Cluster {
        id: Uuid::new_v4().to_string(),
        position_x: mean(|pin: &Pin| pin.position_x),
        position_y: mean(|pin: &Pin| pin.position_y),
        size: mean(|pin: &Pin| pin.size),
        number_of_pins: members.len(),
        names: members
            .iter()
            .map(|&member| pins[member].name.clone().unwrap_or_default())
            .collect(),
    }
}

/// Square hit box of a marker: `size / zoom` wide, centered horizontally on
/// the marker, with its bottom edge on the marker's y coordinate.
fn hit(
    position_x: f64,
    position_y: f64,
    size: f64,
    x: f64,
    y: f64,
    zoom_factor: f64,
) -> bool {
    let size = size / zoom_factor;

    let bottom = position_y;
    let top = bottom - size;
    let left = position_x - size / 2.0;
    let right = position_x + size / 2.0;

    (left..=right).contains(&x) && (top..=bottom).contains(&y)
}

impl DisplayState {
    /// First stand-alone pin whose hit box contains the point.
    pub fn pin_at(&self, x: f64, y: f64, zoom_factor: f64) -> Option<&Pin> {
        self.pins
            .iter()
            .find(|pin| hit(pin.position_x, pin.position_y, pin.size, x, y, zoom_factor))
    }

    /// First displayed marker under the point, stand-alone pins before clusters.
    pub fn marker_at(&self, x: f64, y: f64, zoom_factor: f64) -> Option<Marker<'_>> {
        if let Some(pin) = self.pin_at(x, y, zoom_factor) {
            return Some(Marker::Pin(pin));
        }
        self.clusters
            .iter()
            .find(|cluster| {
                hit(
                    cluster.position_x,
                    cluster.position_y,
                    cluster.size,
                    x,
                    y,
                    zoom_factor,
                )
            })
            .map(Marker::Cluster)
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.clusters.is_empty()
    }
}
