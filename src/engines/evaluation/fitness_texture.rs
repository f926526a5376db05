use crate::engines::evaluation::coordinate_space::CoordinateSpace;
use crate::engines::generation::genome::Genome;
use crate::error::{CarEvolverError, Result};
use image::GrayImage;
use std::path::Path;

/// Cache of already-measured fitness values over the quantized design
/// space. Each cell is one byte, so a 2-D space is literally a grayscale
/// image of the fitness landscape; a 3-D space is a stack of such images.
///
/// Only spaces with 1 to 3 dimensions get a texture. Higher-dimensional
/// searches still run, they just enumerate [`CoordinateSpace`] without a
/// cache behind it.
pub struct FitnessTexture {
    space: CoordinateSpace,
    width: u32,
    height: u32,
    depth: u32,
    pixels: Vec<u8>,
}

impl FitnessTexture {
    /// Allocates `resolution ^ dimensions` zeroed cells. Returns `None` when
    /// the space cannot be visualized (0 resolution, 0 dimensions, or more
    /// than 3 dimensions).
    pub fn new(dimensions: usize, resolution: u32) -> Option<Self> {
        if resolution == 0 || dimensions == 0 || dimensions > 3 {
            return None;
        }

        let space = CoordinateSpace::new(dimensions, resolution);
        let width = resolution;
        let height = if dimensions >= 2 { resolution } else { 1 };
        let depth = if dimensions >= 3 { resolution } else { 1 };

        Some(Self {
            space,
            width,
            height,
            depth,
            pixels: vec![0; space.total_cells() as usize],
        })
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn total_pixels(&self) -> usize {
        self.pixels.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Paints the cell at the genome's coordinates. A genome built under a
    /// different resolution or gene mask indexes out of bounds and is
    /// rejected.
    pub fn set_fitness(&mut self, coord: &Genome, fitness: u8) -> Result<()> {
        let index = self.checked_index(coord)?;
        self.pixels[index] = fitness;
        Ok(())
    }

    pub fn get_fitness(&self, coord: &Genome) -> Result<u8> {
        let index = self.checked_index(coord)?;
        Ok(self.pixels[index])
    }

    /// Forgets every measured value.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Serializes the texture as one 8-bit grayscale PNG per depth slice,
    /// named `{name}{slice}.png`. The slice index is omitted when there is
    /// only a single slice. The directory is created if missing.
    pub fn export_images(&self, dest_dir: &Path, name: &str) -> Result<()> {
        std::fs::create_dir_all(dest_dir)?;

        let slice_len = self.width as usize * self.height as usize;
        for slice in 0..self.depth {
            let start = slice as usize * slice_len;
            let raw = self.pixels[start..start + slice_len].to_vec();
            let image = GrayImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
                CarEvolverError::Texture("Pixel buffer does not match texture size".to_string())
            })?;

            let slice_suffix = if self.depth == 1 {
                String::new()
            } else {
                slice.to_string()
            };
            let path = dest_dir.join(format!("{name}{slice_suffix}.png"));
            image.save(&path)?;
        }

        log::info!(
            "Exported {} fitness slice(s) to {}",
            self.depth,
            dest_dir.display()
        );
        Ok(())
    }

    fn checked_index(&self, coord: &Genome) -> Result<usize> {
        if coord.values.len() != self.space.dimensions() {
            return Err(CarEvolverError::Texture(format!(
                "Genome has {} coordinates, texture has {} dimensions",
                coord.values.len(),
                self.space.dimensions()
            )));
        }
        let index = self.space.index_of(coord) as usize;
        if index >= self.pixels.len() {
            return Err(CarEvolverError::Texture(format!(
                "Coordinate {index} is outside the texture ({} cells)",
                self.pixels.len()
            )));
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_degrades_outside_one_to_three_dimensions() {
        assert!(FitnessTexture::new(0, 128).is_none());
        assert!(FitnessTexture::new(4, 128).is_none());
        assert!(FitnessTexture::new(2, 0).is_none());

        let texture = FitnessTexture::new(3, 8).unwrap();
        assert_eq!(texture.total_pixels(), 512);
        assert_eq!(texture.width(), 8);
        assert_eq!(texture.height(), 8);
        assert_eq!(texture.depth(), 8);

        let flat = FitnessTexture::new(1, 8).unwrap();
        assert_eq!(flat.height(), 1);
        assert_eq!(flat.depth(), 1);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut texture = FitnessTexture::new(2, 4).unwrap();
        let coord = Genome {
            values: vec![3, 1],
            fitness: 0,
        };
        texture.set_fitness(&coord, 200).unwrap();
        assert_eq!(texture.get_fitness(&coord).unwrap(), 200);

        texture.clear();
        assert_eq!(texture.get_fitness(&coord).unwrap(), 0);
    }

    #[test]
    fn stale_genome_is_rejected() {
        let mut texture = FitnessTexture::new(2, 4).unwrap();

        // Built under a different gene mask.
        let wrong_dims = Genome {
            values: vec![1],
            fitness: 0,
        };
        assert!(texture.set_fitness(&wrong_dims, 1).is_err());

        // Built under a larger resolution.
        let out_of_range = Genome {
            values: vec![7, 3],
            fitness: 0,
        };
        assert!(texture.get_fitness(&out_of_range).is_err());
    }

    #[test]
    fn export_writes_one_image_per_slice() {
        let dir = std::env::temp_dir().join("carevolver_texture_export_test");
        let _ = std::fs::remove_dir_all(&dir);

        let mut flat = FitnessTexture::new(2, 4).unwrap();
        flat.set_fitness(
            &Genome {
                values: vec![0, 0],
                fitness: 0,
            },
            255,
        )
        .unwrap();
        flat.export_images(&dir, "fitness").unwrap();
        assert!(dir.join("fitness.png").exists());

        let deep = FitnessTexture::new(3, 4).unwrap();
        deep.export_images(&dir, "volume").unwrap();
        for slice in 0..4 {
            assert!(dir.join(format!("volume{slice}.png")).exists());
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
