//! Turning data URIs into egui textures.
//!
//! Decoding a portrait is expensive, so each image slot keeps the texture
//! it last uploaded and only re-decodes when the source string changes.

use crate::encoding::DataUri;
use crate::error::Result;
use eframe::egui;

/// An uploaded texture together with the data URI it came from.
pub(crate) struct CachedTexture {
    source: String,
    texture: std::result::Result<egui::TextureHandle, String>,
}

/// Returns the texture for `uri`, decoding and uploading it on first use.
///
/// A decode failure is cached as well, so a broken image is reported once
/// instead of being decoded again every frame.
pub(crate) fn texture_for<'a>(
    ctx: &egui::Context,
    slot: &'a mut Option<CachedTexture>,
    name: &str,
    uri: &str,
) -> std::result::Result<&'a egui::TextureHandle, &'a str> {
    let stale = slot.as_ref().is_none_or(|cached| cached.source != uri);
    if stale {
        let texture = load_color_image(uri)
            .map(|image| ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
            .map_err(|e| {
                tracing::warn!(error = %e, texture = name, "Failed to decode image for display");
                e.to_string()
            });
        *slot = Some(CachedTexture {
            source: uri.to_string(),
            texture,
        });
    }

    match slot.as_ref().map(|cached| &cached.texture) {
        Some(Ok(texture)) => Ok(texture),
        Some(Err(message)) => Err(message.as_str()),
        None => Err("no image"),
    }
}

fn load_color_image(uri: &str) -> Result<egui::ColorImage> {
    let image = DataUri::parse(uri)?.decode_image()?;
    let size = [image.width() as usize, image.height() as usize];
    let buffer = image.to_rgba8();
    let pixels = buffer.as_flat_samples();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

/// Largest size with the image's aspect ratio that fits inside `max`.
pub(crate) fn fit_within(image: egui::Vec2, max: egui::Vec2) -> egui::Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (max.x / image.x).min(max.y / image.y).min(1.0);
    image * scale
}
