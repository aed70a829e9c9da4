use palette::Srgb;

use crate::error::{Error, Result};

/// An 8-bit sRGB color as sampled from a texture or stored in a palette.
pub type IntColor = Srgb<u8>;

/// A color with components normalized to `0.0..=1.0`, the space the
/// clustering runs in.
pub type FloatColor = Srgb<f64>;

#[inline(always)]
pub fn clip_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Squared Euclidean distance between two normalized colors.
#[inline(always)]
pub fn distance_squared(a: FloatColor, b: FloatColor) -> f64 {
    let dr = a.red - b.red;
    let dg = a.green - b.green;
    let db = a.blue - b.blue;
    dr * dr + dg * dg + db * db
}

/// Squared Euclidean distance between two 8-bit colors.
#[inline(always)]
pub fn int_distance_squared(a: IntColor, b: IntColor) -> u32 {
    let dr = a.red as i32 - b.red as i32;
    let dg = a.green as i32 - b.green as i32;
    let db = a.blue as i32 - b.blue as i32;
    (dr * dr + dg * dg + db * db) as u32
}

#[inline(always)]
pub fn to_float(color: IntColor) -> FloatColor {
    Srgb::new(
        color.red as f64 / 255.0,
        color.green as f64 / 255.0,
        color.blue as f64 / 255.0,
    )
}

/// Convert a normalized color back to 8 bits.
///
/// Components are clipped to the unit range and then scaled and truncated
/// toward zero, so `0.999` maps to `254` rather than `255`.
#[inline(always)]
pub fn to_int(color: FloatColor) -> IntColor {
    Srgb::new(
        (clip_unit(color.red) * 255.0) as u8,
        (clip_unit(color.green) * 255.0) as u8,
        (clip_unit(color.blue) * 255.0) as u8,
    )
}

/// Scale every component of a normalized color by `factor`.
#[inline(always)]
pub fn scaled(color: FloatColor, factor: f64) -> FloatColor {
    Srgb::new(color.red * factor, color.green * factor, color.blue * factor)
}

/// Rec. 709 luma computed on the gamma-encoded 8-bit components.
#[inline(always)]
pub fn luma(color: IntColor) -> f32 {
    0.2126 * color.red as f32 + 0.7152 * color.green as f32 + 0.0722 * color.blue as f32
}

/// Pack a color into a 24-bit `0xRRGGBB` key.
#[inline(always)]
pub fn pack(color: IntColor) -> u32 {
    (color.red as u32) << 16 | (color.green as u32) << 8 | color.blue as u32
}

#[inline(always)]
pub fn unpack(key: u32) -> IntColor {
    Srgb::new((key >> 16) as u8, (key >> 8) as u8, key as u8)
}

/// Format a color as an upper-case `RRGGBB` string.
pub fn to_hex(color: IntColor) -> String {
    format!("{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Parse `RRGGBB` (an optional leading `#` is accepted).
pub fn parse_hex(s: &str) -> Result<IntColor> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || Error::InvalidParameter {
        name: "hex color",
        value: s.to_string(),
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
    let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
    let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
    Ok(Srgb::new(r, g, b))
}
