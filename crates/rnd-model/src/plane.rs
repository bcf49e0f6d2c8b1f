// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plane selectors.

use serde::{Deserialize, Serialize};

use crate::PixelsDescriptor;

/// Orientation of a plane within the 5-D pixel set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Plane orthogonal to Z.
    XY,
    /// Plane orthogonal to Y.
    XZ,
    /// Plane orthogonal to X.
    ZY,
}

/// Sub-rectangle of an XY plane, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the rectangle.
    pub width: u32,
    /// Height of the rectangle.
    pub height: u32,
}

/// A plane to render: axis, z and t, plus an optional XY region.
///
/// Doubles as the cache key source and as the remote-call argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneDef {
    /// Orientation.
    pub axis: Axis,
    /// Optical section.
    pub z: u32,
    /// Timepoint.
    pub t: u32,
    /// Optional sub-region; only honored for [`Axis::XY`].
    pub region: Option<Region>,
}

impl PlaneDef {
    /// Full XY plane at `(z, t)`.
    pub fn xy(z: u32, t: u32) -> Self {
        Self {
            axis: Axis::XY,
            z,
            t,
            region: None,
        }
    }

    /// Plane with the given orientation at `(z, t)`.
    pub fn new(axis: Axis, z: u32, t: u32) -> Self {
        Self {
            axis,
            z,
            t,
            region: None,
        }
    }

    /// Restrict the plane to `region`.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Cache key `z + sizeZ * t`, only defined for XY planes.
    pub fn cache_key(&self, size_z: u32) -> Option<u64> {
        match self.axis {
            Axis::XY => Some(u64::from(self.z) + u64::from(size_z) * u64::from(self.t)),
            Axis::XZ | Axis::ZY => None,
        }
    }

    /// Width and height of the rendered plane for `pixels`.
    pub fn dimensions(&self, pixels: &PixelsDescriptor) -> (u32, u32) {
        match self.axis {
            Axis::XZ => (pixels.size_x(), pixels.size_z()),
            Axis::ZY => (pixels.size_z(), pixels.size_y()),
            Axis::XY => match self.region {
                Some(r) => (r.width, r.height),
                None => (pixels.size_x(), pixels.size_y()),
            },
        }
    }
}
