use js_sys::{Array, Object, Reflect, Uint16Array};
use wasm_bindgen::prelude::*;

use crate::quantize::{self, QuantizeOptions};
use crate::texture::Texture;

/// Compute a palette for an encoded image.
///
/// Returns `{ palette, indices, error }` where `palette` holds `RRGGBB`
/// strings (the reserved black entry last), `indices` maps every pixel to a
/// palette entry in row-major order, and `error` is the weighted
/// quantization error of the chosen attempt.
#[wasm_bindgen]
pub fn calculate_palette(
    input: Vec<u8>,
    n_colors: usize,
    levels: usize,
    seed: Option<u32>,
) -> Result<Object, JsValue> {
    let img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?;
    let texture = Texture::from_image("input", &img);

    let mut options = QuantizeOptions::new().colors(n_colors).levels(levels);
    if let Some(seed) = seed {
        options = options.seed(u64::from(seed));
    }

    let result = quantize::quantize_textures([&texture.pixels], &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let palette = result.palette();

    let palette_js = Array::new();
    for hex in palette.to_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }

    let indices: Vec<u16> = texture
        .index(palette)
        .indices
        .into_iter()
        .map(|i| i as u16)
        .collect();
    let indices_js = Uint16Array::from(indices.as_slice());

    let out = Object::new();
    Reflect::set(&out, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(&out, &JsValue::from_str("indices"), &indices_js)?;
    Reflect::set(&out, &JsValue::from_str("error"), &JsValue::from_f64(result.error()))?;

    Ok(out)
}
