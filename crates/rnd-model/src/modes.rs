// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compression and projection selectors.

use serde::{Deserialize, Serialize};

/// Discrete compression level chosen by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    /// Raw packed pixels, no compression.
    Uncompressed,
    /// Compressed with medium quality loss.
    #[default]
    Medium,
    /// Compressed with high quality loss.
    Low,
}

impl CompressionLevel {
    /// Whether rendering goes through the compressed path.
    pub fn is_compressed(self) -> bool {
        self != Self::Uncompressed
    }
}

/// Aggregation applied across a z-range by a projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionType {
    /// Maximum intensity along z.
    MaxIntensity,
    /// Mean intensity along z.
    MeanIntensity,
    /// Summed intensity along z.
    SumIntensity,
}
