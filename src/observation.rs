//! Per-frame plane observations.

use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::fmt;

/// 8-bit RGB label color. Pure black marks unlabeled points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LabelColor {
    pub const BLACK: LabelColor = LabelColor { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_background(&self) -> bool {
        *self == Self::BLACK
    }
}

impl fmt::Display for LabelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Identifier of a plane, stable across the frames of one dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub u32);

impl From<LabelColor> for PlaneId {
    /// Packs the color as 0xRRGGBB, so equal colors in different frames map to the same id.
    fn from(color: LabelColor) -> Self {
        PlaneId(((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32)
    }
}

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plane#{}", self.0)
    }
}

/// The planes seen in one frame: plane id to the points on that plane, in the camera
/// frame of the observation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation {
    planes: BTreeMap<PlaneId, Vec<Vector3<f64>>>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the points of `plane_id`, replacing any earlier set for this frame.
    pub fn insert(&mut self, plane_id: PlaneId, points: Vec<Vector3<f64>>) {
        self.planes.insert(plane_id, points);
    }

    pub fn points(&self, plane_id: PlaneId) -> Option<&[Vector3<f64>]> {
        self.planes.get(&plane_id).map(Vec::as_slice)
    }

    pub fn contains(&self, plane_id: PlaneId) -> bool {
        self.planes.contains_key(&plane_id)
    }

    /// Plane ids in ascending order.
    pub fn plane_ids(&self) -> impl Iterator<Item = PlaneId> + '_ {
        self.planes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaneId, &[Vector3<f64>])> + '_ {
        self.planes.iter().map(|(id, points)| (*id, points.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Total number of points over all planes.
    pub fn point_count(&self) -> usize {
        self.planes.values().map(Vec::len).sum()
    }
}

impl FromIterator<(PlaneId, Vec<Vector3<f64>>)> for Observation {
    fn from_iter<I: IntoIterator<Item = (PlaneId, Vec<Vector3<f64>>)>>(iter: I) -> Self {
        Observation {
            planes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_id_from_color() {
        assert_eq!(PlaneId::from(LabelColor::new(0x12, 0x34, 0x56)), PlaneId(0x123456));
        assert_eq!(PlaneId::from(LabelColor::BLACK), PlaneId(0));
    }

    #[test]
    fn test_observation_orders_plane_ids() {
        let observation: Observation = [
            (PlaneId(7), vec![Vector3::zeros()]),
            (PlaneId(2), vec![Vector3::x(), Vector3::y()]),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = observation.plane_ids().collect();
        assert_eq!(ids, vec![PlaneId(2), PlaneId(7)]);
        assert_eq!(observation.point_count(), 3);
        assert!(observation.points(PlaneId(3)).is_none());
    }
}
