use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::projection::SURFACE_HALF_EXTENT;

/// A marker as it is configured: id, designed offset on the surface and an
/// optional display color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub id: u32,
    pub offset: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
}

impl MarkerConfig {
    pub fn new(id: u32, offset: Vec3) -> MarkerConfig {
        MarkerConfig {
            id,
            offset,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredMarker {
    pub id: u32,
    /// Designed position relative to the surface origin, in surface-local units.
    pub surface_offset: Vec3,
    pub color: [u8; 3],
}

/// Registered markers in configuration order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<RegisteredMarker>,
    id_to_index: HashMap<u32, usize>,
}

fn palette_color(idx: usize) -> [u8; 3] {
    let c = colorous::TABLEAU10[idx % colorous::TABLEAU10.len()];
    [c.r, c.g, c.b]
}

impl MarkerRegistry {
    pub fn new(markers: &[MarkerConfig]) -> Result<MarkerRegistry> {
        let mut registry = MarkerRegistry::default();
        for (idx, m) in markers.iter().enumerate() {
            if registry.id_to_index.contains_key(&m.id) {
                return Err(Error::DuplicateMarkerId(m.id));
            }
            registry.id_to_index.insert(m.id, registry.markers.len());
            registry.markers.push(RegisteredMarker {
                id: m.id,
                surface_offset: m.offset,
                color: m.color.unwrap_or_else(|| palette_color(idx)),
            });
        }
        Ok(registry)
    }

    /// Evenly spaced `rows` x `cols` layout on the surface plane, ids counting
    /// up from `first_id` row by row starting at the upper-left corner.
    /// `margin` is kept free between the outer markers and the surface edge.
    pub fn grid(rows: usize, cols: usize, first_id: u32, margin: f32) -> MarkerRegistry {
        let span = 2.0 * (SURFACE_HALF_EXTENT - margin);
        let step = |n: usize| if n > 1 { span / (n - 1) as f32 } else { 0.0 };
        let (step_x, step_z) = (step(cols), step(rows));
        let start = |n: usize| if n > 1 { -span / 2.0 } else { 0.0 };
        let mut configs = Vec::with_capacity(rows * cols);
        let mut id = first_id;
        for r in 0..rows {
            for c in 0..cols {
                let x = start(cols) + c as f32 * step_x;
                let z = -start(rows) - r as f32 * step_z;
                configs.push(MarkerConfig::new(id, Vec3::new(x, 0.0, z)));
                id += 1;
            }
        }
        // ids are sequential, so they cannot collide
        MarkerRegistry::new(&configs).unwrap_or_default()
    }

    pub fn get(&self, id: u32) -> Option<&RegisteredMarker> {
        self.id_to_index.get(&id).map(|&idx| &self.markers[idx])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.id_to_index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
