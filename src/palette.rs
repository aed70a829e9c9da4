use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use palette::Srgb;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{self, FloatColor, IntColor};
use crate::error::{Error, Result};
use crate::quantize::MAX_COLORS;

/// Color stored in the last slot of every computed palette, reserved for the
/// texture's transparent index.
pub const RESERVED_COLOR: IntColor = Srgb::new(0, 0, 0);

/// An ordered list of 8-bit colors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<IntColor>,
}

#[derive(Serialize, Deserialize)]
struct JsonColor {
    #[serde(rename = "R")]
    r: u8,
    #[serde(rename = "G")]
    g: u8,
    #[serde(rename = "B")]
    b: u8,
}

impl Palette {
    pub fn new(colors: Vec<IntColor>) -> Self {
        Self { colors }
    }

    /// Convert final centroids to 8-bit colors and append [`RESERVED_COLOR`].
    pub fn from_centroids(centroids: &[FloatColor]) -> Self {
        let mut colors = Vec::with_capacity(centroids.len() + 1);
        colors.extend(centroids.iter().map(|&c| color::to_int(c)));
        colors.push(RESERVED_COLOR);
        Self { colors }
    }

    /// Parse a comma-separated list of `RRGGBB` colors and append
    /// [`RESERVED_COLOR`], the same shape [`from_centroids`](Self::from_centroids) produces.
    pub fn from_hex_list(list: &str) -> Result<Self> {
        let mut colors = list
            .split(',')
            .map(color::parse_hex)
            .collect::<Result<Vec<_>>>()?;
        // a `.txs` palette length is one byte
        if colors.len() + 1 >= MAX_COLORS {
            return Err(Error::InvalidParameter {
                name: "palette",
                value: format!("{} colors", colors.len()),
            });
        }
        colors.push(RESERVED_COLOR);
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[IntColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Stable sort from darkest to brightest luma.
    pub fn sort_by_luma(&mut self) {
        self.colors
            .sort_by(|a, b| color::luma(*a).total_cmp(&color::luma(*b)));
    }

    /// Index of the entry closest to `color`; the lowest index wins ties.
    ///
    /// Returns `0` for an empty palette.
    pub fn nearest_index(&self, color: IntColor) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, &c) in self.colors.iter().enumerate() {
            let dist = color::int_distance_squared(color, c);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// [`nearest_index`](Self::nearest_index) for every pixel, in parallel.
    pub fn index_pixels(&self, pixels: &[IntColor]) -> Vec<usize> {
        pixels.par_iter().map(|&p| self.nearest_index(p)).collect()
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|&c| color::to_hex(c)).collect()
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let json: Vec<JsonColor> = self
            .colors
            .iter()
            .map(|c| JsonColor {
                r: c.red,
                g: c.green,
                b: c.blue,
            })
            .collect();
        serde_json::to_writer_pretty(writer, &json)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let json: Vec<JsonColor> = serde_json::from_reader(reader)?;
        Ok(Self {
            colors: json.into_iter().map(|c| Srgb::new(c.r, c.g, c.b)).collect(),
        })
    }

    /// Sort by luma, then write as JSON.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.sort_by_luma();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_json(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalizer_truncates_and_reserves_black() {
        let centroids = [Srgb::new(1.0, 0.5, 0.0), Srgb::new(1.2, -1.0, 0.25)];
        let palette = Palette::from_centroids(&centroids);
        assert_eq!(
            palette.colors(),
            &[Srgb::new(255, 127, 0), Srgb::new(255, 0, 63), RESERVED_COLOR]
        );
    }

    #[test]
    fn hex_list_reserves_black() {
        let palette = Palette::from_hex_list("#FF8000, 102030").unwrap();
        assert_eq!(
            palette.colors(),
            &[Srgb::new(255, 128, 0), Srgb::new(16, 32, 48), RESERVED_COLOR]
        );
        assert!(Palette::from_hex_list("FF8000,nope").is_err());
        assert!(Palette::from_hex_list("").is_err());

        let full = vec!["000000"; 255].join(",");
        assert!(matches!(
            Palette::from_hex_list(&full),
            Err(Error::InvalidParameter { name: "palette", .. })
        ));
        assert_eq!(Palette::from_hex_list(&full[7..]).unwrap().len(), 255);
    }

    #[test]
    fn sorts_by_luma() {
        let mut palette = Palette::new(vec![
            Srgb::new(0, 255, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(255, 0, 0),
            Srgb::new(0, 0, 255),
        ]);
        palette.sort_by_luma();
        assert_eq!(
            palette.colors(),
            &[
                Srgb::new(0, 0, 0),
                Srgb::new(0, 0, 255),
                Srgb::new(255, 0, 0),
                Srgb::new(0, 255, 0),
            ]
        );
    }

    #[test]
    fn nearest_prefers_lowest_index_on_ties() {
        let palette = Palette::new(vec![
            Srgb::new(10, 0, 0),
            Srgb::new(30, 0, 0),
            Srgb::new(20, 0, 0),
        ]);
        assert_eq!(palette.nearest_index(Srgb::new(20, 0, 0)), 2);
        assert_eq!(palette.nearest_index(Srgb::new(25, 0, 0)), 1);
        assert_eq!(palette.nearest_index(Srgb::new(15, 0, 0)), 0);
        assert_eq!(
            palette.index_pixels(&[Srgb::new(0, 0, 0), Srgb::new(200, 0, 0)]),
            vec![0, 1]
        );
        assert_eq!(Palette::default().nearest_index(Srgb::new(1, 2, 3)), 0);
    }

    #[test]
    fn json_layout() {
        let palette = Palette::new(vec![Srgb::new(1, 2, 3)]);
        let mut buf = Vec::new();
        palette.write_json(&mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains("\"R\": 1"));
        assert!(text.contains("\"B\": 3"));
        assert_eq!(Palette::read_json(buf.as_slice()).unwrap(), palette);
    }

    #[test]
    fn json_rejects_out_of_range() {
        let err = Palette::read_json(&b"[{\"R\": 300, \"G\": 0, \"B\": 0}]"[..]);
        assert!(err.is_err());
    }
}
