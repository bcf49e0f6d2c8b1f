// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine payloads to [`PlaneImage`].

use rnd_model::PlaneImage;

use crate::ProxyError;

/// Decode a compressed payload (JPEG, or PNG when the engine sends one).
pub(crate) fn decode_compressed(bytes: &[u8], context: &str) -> Result<PlaneImage, ProxyError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ProxyError::Decode {
        context: context.to_owned(),
        message: e.to_string(),
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    PlaneImage::from_rgba8(rgba.as_raw(), width, height).map_err(|e| ProxyError::Decode {
        context: context.to_owned(),
        message: e.to_string(),
    })
}

/// Wrap a packed buffer, checking it covers `width × height`.
pub(crate) fn from_packed(
    packed: Vec<u32>,
    (width, height): (u32, u32),
    context: &str,
) -> Result<PlaneImage, ProxyError> {
    PlaneImage::from_packed(packed, width, height).map_err(|e| ProxyError::Decode {
        context: context.to_owned(),
        message: e.to_string(),
    })
}
