// ============================================================
// Layer 4 — Image Augmentation
// ============================================================
// Training images go through two random transforms before
// batching:
//
//   1. Random crop: zero-pad 4 pixels on every side, then cut a
//      32×32 window at a random offset in [0, 8] on each axis.
//   2. Horizontal flip with probability 0.5.
//
// Test images are passed through unchanged (`Identity`).
// All functions work on channel-major u8 buffers (C × H × W).

use rand::Rng;

use crate::data::cifar::{CHANNELS, HEIGHT, WIDTH};
use crate::domain::traits::ImageTransform;

/// Random crop with zero padding followed by a random horizontal flip.
#[derive(Debug, Clone, Copy)]
pub struct RandomCropFlip {
    pub padding: usize,
}

impl Default for RandomCropFlip {
    fn default() -> Self {
        Self { padding: 4 }
    }
}

impl ImageTransform for RandomCropFlip {
    fn apply(&self, image: &[u8]) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let dy = rng.gen_range(0..=2 * self.padding);
        let dx = rng.gen_range(0..=2 * self.padding);

        let cropped = padded_crop(image, self.padding, dy, dx);
        if rng.gen_bool(0.5) {
            horizontal_flip(&cropped)
        } else {
            cropped
        }
    }
}

/// Passes images through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ImageTransform for Identity {
    fn apply(&self, image: &[u8]) -> Vec<u8> {
        image.to_vec()
    }
}

/// Crop a `HEIGHT × WIDTH` window at (`dy`, `dx`) out of the image
/// zero-padded by `padding` on every side.
///
/// `dy == dx == padding` returns the original image.
pub fn padded_crop(image: &[u8], padding: usize, dy: usize, dx: usize) -> Vec<u8> {
    let mut out = vec![0u8; image.len()];

    for c in 0..CHANNELS {
        let plane = c * HEIGHT * WIDTH;
        for y in 0..HEIGHT {
            // Row in the padded image → row in the source image
            let Some(sy) = (y + dy).checked_sub(padding).filter(|&sy| sy < HEIGHT) else {
                continue;
            };
            for x in 0..WIDTH {
                if let Some(sx) = (x + dx).checked_sub(padding).filter(|&sx| sx < WIDTH) {
                    out[plane + y * WIDTH + x] = image[plane + sy * WIDTH + sx];
                }
            }
        }
    }

    out
}

/// Mirror every row of every channel.
pub fn horizontal_flip(image: &[u8]) -> Vec<u8> {
    image
        .chunks_exact(WIDTH)
        .flat_map(|row| row.iter().rev().copied())
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cifar::IMAGE_BYTES;

    /// Image whose pixel value encodes its column (mod 256)
    fn gradient() -> Vec<u8> {
        (0..IMAGE_BYTES).map(|i| (i % WIDTH) as u8 + 1).collect()
    }

    #[test]
    fn test_centered_crop_is_identity() {
        let img = gradient();
        assert_eq!(padded_crop(&img, 4, 4, 4), img);
    }

    #[test]
    fn test_shifted_crop_fills_with_zeros() {
        let img = gradient();
        // Window starts 4 pixels left of the image: first 4 columns are padding
        let out = padded_crop(&img, 4, 4, 0);
        assert_eq!(&out[0..4], &[0, 0, 0, 0]);
        assert_eq!(out[4], 1);
        assert_eq!(out[WIDTH - 1], (WIDTH - 4) as u8);

        // Window starts 4 rows below: last 4 rows are padding
        let out = padded_crop(&img, 4, 8, 4);
        let last_rows = &out[(HEIGHT - 4) * WIDTH..HEIGHT * WIDTH];
        assert!(last_rows.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let img = gradient();
        let flipped = horizontal_flip(&img);
        assert_eq!(flipped[0], WIDTH as u8);
        assert_eq!(horizontal_flip(&flipped), img);
    }

    #[test]
    fn test_random_transform_keeps_length() {
        let img = gradient();
        let t = RandomCropFlip::default();
        for _ in 0..16 {
            assert_eq!(t.apply(&img).len(), IMAGE_BYTES);
        }
        assert_eq!(Identity.apply(&img), img);
    }
}
