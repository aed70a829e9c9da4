//! Textures: loading samples, indexing them against a palette and writing
//! the packed `.txs` asset.
//!
//! `.txs` layout, all integers little-endian:
//!
//! ```text
//! u8        palette length
//! u8        index offset
//! [u8; 3]   palette entries, RGB
//! u32       texture count
//! per texture:
//!   [u8; 16]  name, zero padded
//!   u32       width
//!   u32       height
//!   i16       transparent index, -1 for none
//!   [u8]      width * height palette indices (offset applied)
//! ```

use std::io::Write;
use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbImage};
use log::info;
use palette::Srgb;

use crate::color::IntColor;
use crate::error::{Error, Result};
use crate::palette::Palette;

/// Longest texture name the asset format stores.
pub const NAME_LEN: usize = 16;

/// Decoded texture pixels in row-major order. Alpha is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<IntColor>,
}

impl Texture {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<IntColor>,
    ) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(Error::Texture(format!(
                "{} pixels do not fill {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(name: impl Into<String>, img: &DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .to_rgb8()
            .pixels()
            .map(|p| Srgb::new(p[0], p[1], p[2]))
            .collect();
        Self {
            name: name.into(),
            width,
            height,
            pixels,
        }
    }

    pub fn load<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_image(name, &img))
    }

    /// Map every pixel to its nearest palette entry.
    pub fn index(&self, palette: &Palette) -> IndexedTexture {
        IndexedTexture {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            indices: palette.index_pixels(&self.pixels),
        }
    }
}

/// A texture expressed as palette indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub indices: Vec<usize>,
}

impl IndexedTexture {
    /// Indices shifted by `offset`. Fails if any shifted index leaves a byte.
    pub fn offset_indices(&self, offset: u8) -> Result<Vec<u8>> {
        self.indices
            .iter()
            .map(|&i| self.stored_index(i, offset))
            .collect()
    }

    /// Stored index of the pixel at `(x, y)`, `None` outside the texture.
    pub fn transparent_index(&self, x: u32, y: u32, offset: u8) -> Result<Option<u8>> {
        if x >= self.width || y >= self.height {
            return Ok(None);
        }
        let i = self.indices[y as usize * self.width as usize + x as usize];
        self.stored_index(i, offset).map(Some)
    }

    fn stored_index(&self, index: usize, offset: u8) -> Result<u8> {
        index
            .checked_add(offset as usize)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| {
                Error::Texture(format!(
                    "\"{}\": index {index} with offset {offset} does not fit a byte",
                    self.name
                ))
            })
    }

    /// Render through `palette`; indices past its end come out black.
    pub fn preview(&self, palette: &Palette) -> RgbImage {
        let colors = palette.colors();
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let i = self.indices[y as usize * self.width as usize + x as usize];
            let c = colors.get(i).copied().unwrap_or(Srgb::new(0, 0, 0));
            image::Rgb([c.red, c.green, c.blue])
        })
    }
}

/// One texture entry of a `.txs` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxsTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub transparent: Option<u8>,
    pub data: Vec<u8>,
}

impl TxsTexture {
    pub fn new(
        texture: &IndexedTexture,
        offset: u8,
        transparent_at: Option<(u32, u32)>,
    ) -> Result<Self> {
        let transparent = match transparent_at {
            Some((x, y)) => texture.transparent_index(x, y, offset)?,
            None => None,
        };
        Ok(Self {
            name: texture.name.clone(),
            width: texture.width,
            height: texture.height,
            transparent,
            data: texture.offset_indices(offset)?,
        })
    }
}

/// Write a complete `.txs` asset.
pub fn write_txs<W: Write>(
    mut writer: W,
    palette: &Palette,
    offset: u8,
    textures: &[TxsTexture],
) -> Result<()> {
    let palette_len = u8::try_from(palette.len())
        .map_err(|_| Error::Texture(format!("palette of {} entries exceeds 255", palette.len())))?;

    writer.write_all(&[palette_len, offset])?;
    for c in palette.colors() {
        writer.write_all(&[c.red, c.green, c.blue])?;
    }

    let count = u32::try_from(textures.len())
        .map_err(|_| Error::Texture("too many textures".to_string()))?;
    writer.write_all(&count.to_le_bytes())?;

    for texture in textures {
        info!("Adding \"{}\" ...", texture.name);
        if texture.data.len() != texture.width as usize * texture.height as usize {
            return Err(Error::Texture(format!(
                "\"{}\" has {} indices for {}x{}",
                texture.name,
                texture.data.len(),
                texture.width,
                texture.height
            )));
        }

        let mut name = [0u8; NAME_LEN];
        let bytes = texture.name.as_bytes();
        let len = bytes.len().min(NAME_LEN);
        name[..len].copy_from_slice(&bytes[..len]);
        writer.write_all(&name)?;

        writer.write_all(&texture.width.to_le_bytes())?;
        writer.write_all(&texture.height.to_le_bytes())?;
        let transparent = texture.transparent.map_or(-1, i16::from);
        writer.write_all(&transparent.to_le_bytes())?;
        writer.write_all(&texture.data)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed() -> IndexedTexture {
        IndexedTexture {
            name: "wall".to_string(),
            width: 2,
            height: 2,
            indices: vec![0, 1, 2, 300],
        }
    }

    #[test]
    fn offsets_shift_indices() {
        let tex = IndexedTexture {
            indices: vec![0, 1, 2, 245],
            ..indexed()
        };
        assert_eq!(tex.offset_indices(10).unwrap(), vec![10, 11, 12, 255]);
    }

    #[test]
    fn offset_overflow_is_an_error() {
        let tex = IndexedTexture {
            indices: vec![0, 1, 2, 246],
            ..indexed()
        };
        assert!(matches!(tex.offset_indices(10), Err(Error::Texture(_))));
        assert!(matches!(indexed().offset_indices(0), Err(Error::Texture(_))));
        assert!(matches!(TxsTexture::new(&tex, 10, None), Err(Error::Texture(_))));
    }

    #[test]
    fn transparent_lookup() {
        let tex = indexed();
        assert_eq!(tex.transparent_index(0, 1, 4).unwrap(), Some(6));
        assert_eq!(tex.transparent_index(2, 0, 0).unwrap(), None);
        assert!(matches!(tex.transparent_index(1, 1, 0), Err(Error::Texture(_))));
        assert!(matches!(tex.transparent_index(0, 1, 254), Err(Error::Texture(_))));

        let tex = IndexedTexture {
            indices: vec![0, 1, 2, 3],
            ..indexed()
        };
        assert_eq!(TxsTexture::new(&tex, 0, Some((5, 5))).unwrap().transparent, None);
        assert_eq!(TxsTexture::new(&tex, 0, Some((1, 1))).unwrap().transparent, Some(3));
    }

    #[test]
    fn texture_dimensions_must_match() {
        assert!(Texture::new("x", 2, 2, vec![Srgb::new(0, 0, 0); 3]).is_err());
        assert!(Texture::new("x", 1, 3, vec![Srgb::new(0, 0, 0); 3]).is_ok());
    }

    #[test]
    fn txs_layout() {
        let palette = Palette::new(vec![Srgb::new(1, 2, 3), Srgb::new(0, 0, 0)]);
        let tex = IndexedTexture {
            name: "a_very_long_texture_name".to_string(),
            width: 2,
            height: 1,
            indices: vec![1, 0],
        };
        let entry = TxsTexture::new(&tex, 3, Some((0, 0))).unwrap();

        let mut buf = Vec::new();
        write_txs(&mut buf, &palette, 3, &[entry]).unwrap();

        let mut expected = vec![2u8, 3, 1, 2, 3, 0, 0, 0];
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(b"a_very_long_text");
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&4i16.to_le_bytes());
        expected.extend_from_slice(&[4, 3]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn txs_without_transparency() {
        let palette = Palette::new(vec![Srgb::new(9, 9, 9)]);
        let tex = IndexedTexture {
            name: "n".to_string(),
            width: 1,
            height: 1,
            indices: vec![0],
        };
        let mut buf = Vec::new();
        let entry = TxsTexture::new(&tex, 0, None).unwrap();
        write_txs(&mut buf, &palette, 0, &[entry]).unwrap();

        let t = 2 + 3 + 4 + NAME_LEN + 8;
        assert_eq!(&buf[t..t + 2], &(-1i16).to_le_bytes());
    }

    #[test]
    fn rejects_oversized_palette() {
        let palette = Palette::new(vec![Srgb::new(0, 0, 0); 256]);
        let err = write_txs(Vec::new(), &palette, 0, &[]);
        assert!(matches!(err, Err(Error::Texture(_))));
    }

    #[test]
    fn preview_uses_palette() {
        let palette = Palette::new(vec![Srgb::new(255, 0, 0), Srgb::new(0, 255, 0)]);
        let img = indexed().preview(&palette);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0]);
    }

    #[test]
    fn from_image_drops_alpha() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([10, 20, 30, 0]));
        rgba.put_pixel(1, 0, image::Rgba([40, 50, 60, 255]));
        let tex = Texture::from_image("t", &DynamicImage::ImageRgba8(rgba));

        assert_eq!(tex.pixels, vec![Srgb::new(10, 20, 30), Srgb::new(40, 50, 60)]);
        assert_eq!((tex.width, tex.height), (2, 1));
    }
}
