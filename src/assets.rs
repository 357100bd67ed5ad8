//! Ball sprite metadata
//!
//! The board never touches pixels; it only needs to know how many colours
//! exist and how many rotation frames each colour's film strip holds. The
//! rendering collaborator loads the images and hands this table over.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Names of the stock ball films
pub const STANDARD_COLORS: [&str; 6] = ["blue", "green", "purple", "red", "white", "yellow"];

/// One colour's rotation frames, laid out horizontally in a film strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub name: String,
    pub frame_count: usize,
}

impl SpriteSheet {
    pub fn new(name: impl Into<String>, frame_count: usize) -> Result<Self> {
        let name = name.into();
        if frame_count == 0 {
            return Err(Error::ImageAsset(format!("{name}: no frames")));
        }
        Ok(Self { name, frame_count })
    }

    /// Split a film strip of square frames
    pub fn from_film(name: impl Into<String>, width_px: u32, height_px: u32) -> Result<Self> {
        let name = name.into();
        if height_px == 0 || height_px > width_px {
            return Err(Error::ImageAsset(format!(
                "{name}: frames must be laid out horizontally ({width_px}x{height_px})"
            )));
        }
        Self::new(name, (width_px / height_px) as usize)
    }

    /// Frame to show for a rotation phase in [0, 1)
    #[inline]
    pub fn frame_index(&self, phase: f64) -> usize {
        frame_index(phase, self.frame_count)
    }
}

/// `floor(phase * frames)`, kept inside the strip
#[inline]
pub fn frame_index(phase: f64, frame_count: usize) -> usize {
    let idx = (phase * frame_count as f64).floor().max(0.0) as usize;
    idx.min(frame_count.saturating_sub(1))
}

/// All colours available to a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTable {
    pub sheets: Vec<SpriteSheet>,
}

impl AssetTable {
    pub fn new(sheets: Vec<SpriteSheet>) -> Result<Self> {
        if sheets.is_empty() {
            return Err(Error::ImageAsset("asset table has no sprite sheets".into()));
        }
        Ok(Self { sheets })
    }

    /// The six stock colours, each with `frame_count` frames
    pub fn standard(frame_count: usize) -> Result<Self> {
        let sheets = STANDARD_COLORS
            .iter()
            .map(|name| SpriteSheet::new(*name, frame_count))
            .collect::<Result<Vec<_>>>()?;
        Self::new(sheets)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, index: usize) -> Option<&SpriteSheet> {
        self.sheets.get(index)
    }

    /// Colour index -> sheet index, a seeded shuffle of the whole table
    /// truncated to `num_colors`
    pub fn palette<R: Rng + ?Sized>(&self, num_colors: usize, rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sheets.len()).collect();
        order.shuffle(rng);
        order.truncate(num_colors.min(self.sheets.len()));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_film_split_counts_square_frames() {
        let sheet = SpriteSheet::from_film("red", 64 * 24, 64).unwrap();
        assert_eq!(sheet.frame_count, 24);
    }

    #[test]
    fn test_vertical_film_is_rejected() {
        assert!(matches!(
            SpriteSheet::from_film("red", 64, 128),
            Err(Error::ImageAsset(_))
        ));
        assert!(SpriteSheet::from_film("red", 64, 0).is_err());
    }

    #[test]
    fn test_frame_index_stays_in_range() {
        assert_eq!(frame_index(0.0, 24), 0);
        assert_eq!(frame_index(0.5, 24), 12);
        assert_eq!(frame_index(0.999_999, 24), 23);
        assert_eq!(frame_index(1.0, 24), 23);
    }

    #[test]
    fn test_palette_is_seeded_permutation() {
        let table = AssetTable::standard(8).unwrap();
        let a = table.palette(4, &mut Pcg32::seed_from_u64(9));
        let b = table.palette(4, &mut Pcg32::seed_from_u64(9));
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(a.iter().all(|&i| i < table.len()));
    }

    #[test]
    fn test_palette_caps_at_table_size() {
        let table = AssetTable::standard(8).unwrap();
        assert_eq!(table.palette(10, &mut Pcg32::seed_from_u64(1)).len(), 6);
    }
}
