// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Primary-colour classification of channel colors.

use serde::{Deserialize, Serialize};

use crate::Rgba;

/// Which primary a channel color maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryColour {
    /// Pure red `(255, 0, 0)`.
    Red,
    /// Pure green `(0, 255, 0)`.
    Green,
    /// Pure blue `(0, 0, 255)`.
    Blue,
    /// Anything else.
    Other,
}

/// Classify a color by its RGB components; alpha is ignored.
pub fn classify(rgba: Rgba) -> PrimaryColour {
    match (rgba.red(), rgba.green(), rgba.blue()) {
        (0, 0, 255) => PrimaryColour::Blue,
        (255, 0, 0) => PrimaryColour::Red,
        (0, 255, 0) => PrimaryColour::Green,
        _ => PrimaryColour::Other,
    }
}
