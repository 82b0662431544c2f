//! World extents and wall containment

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Motion};
use crate::config::ConfigError;

/// Axis-aligned world rectangle centred on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldExtent {
    pub half_width: f32,
    pub half_height: f32,
}

impl WorldExtent {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Extent for a full `width` × `height` region
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(width / 2.0, height / 2.0)
    }

    /// Half-extents must be finite and non-negative, otherwise the clamp
    /// would fire on both walls of an axis in the same pass
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("half_width", self.half_width),
            ("half_height", self.half_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= -self.half_width
            && pos.x <= self.half_width
            && pos.y >= -self.half_height
            && pos.y <= self.half_height
    }
}

/// Playable regions and their sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Valedorn,
    Nythera,
    KharZul,
    Lumen,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Valedorn,
        Region::Nythera,
        Region::KharZul,
        Region::Lumen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Valedorn => "Valedorn",
            Region::Nythera => "Nythera",
            Region::KharZul => "Khar'Zul",
            Region::Lumen => "Lumen",
        }
    }

    /// Full (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            Region::Valedorn => (4000.0, 3000.0),
            Region::Nythera => (5000.0, 4000.0),
            Region::KharZul => (6000.0, 4500.0),
            Region::Lumen => (4000.0, 3500.0),
        }
    }

    pub fn extent(&self) -> WorldExtent {
        let (w, h) = self.size();
        WorldExtent::from_size(w, h)
    }
}

/// Push a dynamic entity back inside `extent`, scaling the offending velocity
/// component by `bounce`. Static entities and in-bounds entities are untouched.
pub fn clamp_to_extent(entity: &mut Entity, extent: WorldExtent, bounce: f32) {
    let Motion::Dynamic(k) = &mut entity.motion else {
        return;
    };
    let pos = &mut entity.pos;

    if pos.x < -extent.half_width {
        pos.x = -extent.half_width;
        k.vel.x *= bounce;
    }
    if pos.x > extent.half_width {
        pos.x = extent.half_width;
        k.vel.x *= bounce;
    }
    if pos.y < -extent.half_height {
        pos.y = -extent.half_height;
        k.vel.y *= bounce;
    }
    if pos.y > extent.half_height {
        pos.y = extent.half_height;
        k.vel.y *= bounce;
    }
}
