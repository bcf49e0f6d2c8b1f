// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pixel-set metadata.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Immutable metadata for one pixel set (sizes, voxel size, pixel type).
///
/// Built once when a proxy is created and never mutated afterwards. All five
/// dimensions are at least 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelsDescriptor {
    id: i64,
    size_x: u32,
    size_y: u32,
    size_z: u32,
    size_t: u32,
    size_c: u32,
    physical_size: [Option<f64>; 3],
    pixel_type: String,
    signed: bool,
}

impl PixelsDescriptor {
    /// Create a descriptor; every dimension must be at least 1.
    ///
    /// `sizes` is `[x, y, z, t, c]`.
    pub fn new(
        id: i64,
        sizes: [u32; 5],
        pixel_type: impl Into<String>,
        signed: bool,
    ) -> Result<Self, ModelError> {
        const AXES: [&str; 5] = ["x", "y", "z", "t", "c"];
        if let Some(i) = sizes.iter().position(|&s| s == 0) {
            return Err(ModelError::ZeroDimension { axis: AXES[i] });
        }
        let [size_x, size_y, size_z, size_t, size_c] = sizes;
        Ok(Self {
            id,
            size_x,
            size_y,
            size_z,
            size_t,
            size_c,
            physical_size: [None; 3],
            pixel_type: pixel_type.into(),
            signed,
        })
    }

    /// Attach physical voxel sizes (x, y, z). `None` entries read back as 1.
    pub fn with_physical_size(mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        self.physical_size = [x, y, z];
        self
    }

    /// Identifier of the pixel set on the server.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Number of columns.
    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Number of rows.
    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Number of optical sections.
    pub fn size_z(&self) -> u32 {
        self.size_z
    }

    /// Number of timepoints.
    pub fn size_t(&self) -> u32 {
        self.size_t
    }

    /// Number of channels.
    pub fn size_c(&self) -> u32 {
        self.size_c
    }

    /// Physical width of a voxel, 1 when unknown.
    pub fn physical_size_x(&self) -> f64 {
        self.physical_size[0].unwrap_or(1.0)
    }

    /// Physical height of a voxel, 1 when unknown.
    pub fn physical_size_y(&self) -> f64 {
        self.physical_size[1].unwrap_or(1.0)
    }

    /// Physical depth of a voxel, 1 when unknown.
    pub fn physical_size_z(&self) -> f64 {
        self.physical_size[2].unwrap_or(1.0)
    }

    /// Pixel type name, e.g. `"uint16"`.
    pub fn pixel_type(&self) -> &str {
        &self.pixel_type
    }

    /// Whether the pixel type is signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns `true` if rendering settings made for `other` can be applied to
    /// this pixel set: same channel count, same X/Y size and same pixel type.
    pub fn validate_pixels(&self, other: &PixelsDescriptor) -> bool {
        self.size_c == other.size_c
            && self.size_y == other.size_y
            && self.size_x == other.size_x
            && self.pixel_type == other.pixel_type
    }
}

/// Acquisition metadata for one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    /// Channel index in `[0, sizeC)`.
    pub index: usize,
    /// Display name (emission wavelength or label).
    pub name: String,
    /// Lowest intensity found in the whole channel.
    pub global_min: f64,
    /// Highest intensity found in the whole channel.
    pub global_max: f64,
}

impl ChannelMetadata {
    /// Metadata with a generated name.
    pub fn new(index: usize, global_min: f64, global_max: f64) -> Self {
        Self {
            index,
            name: format!("Channel {index}"),
            global_min,
            global_max,
        }
    }
}
