use anyhow::{ensure, Result};

/// A single channel floating point image as received from the
/// covariance topic.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CovarianceImage {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "empty covariance image");
        ensure!(
            data.len() == width * height,
            "data size ({}) does not match width ({}) and height ({})",
            data.len(),
            width,
            height
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decodes the payload of a `32FC1` image message.
    pub fn decode(
        width: u32,
        height: u32,
        encoding: &str,
        is_bigendian: bool,
        step: u32,
        bytes: &[u8],
    ) -> Result<Self> {
        const PIXEL_SIZE: usize = 4;

        let width = width as usize;
        let height = height as usize;
        let step = step as usize;

        ensure!(width > 0 && height > 0, "empty covariance image");
        ensure!(
            encoding == "32FC1",
            "unsupported encoding '{}', expect 32FC1",
            encoding
        );
        ensure!(step >= width * PIXEL_SIZE, "row step {} is too short", step);
        ensure!(
            bytes.len() >= step * height,
            "data size ({}) is smaller than step ({}) times height ({})",
            bytes.len(),
            step,
            height
        );

        let data: Vec<f32> = bytes
            .chunks(step)
            .take(height)
            .flat_map(|row| {
                row[..width * PIXEL_SIZE].chunks_exact(PIXEL_SIZE).map(|px| {
                    let px: [u8; PIXEL_SIZE] = px.try_into().unwrap();
                    if is_bigendian {
                        f32::from_be_bytes(px)
                    } else {
                        f32::from_le_bytes(px)
                    }
                })
            })
            .collect();

        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        (col < self.width && row < self.height).then(|| self.data[row * self.width + col])
    }

    /// Renders a `size` x `size` 8-bit canvas. Pixels are sampled by
    /// nearest neighbor, made absolute and stretched so that the
    /// smallest value maps to 0 and the largest to 255. A constant
    /// image renders all black.
    pub fn render(&self, size: usize) -> GrayCanvas {
        let resized: Vec<f32> = (0..size)
            .flat_map(|row| (0..size).map(move |col| (col, row)))
            .map(|(col, row)| {
                let src_col = scale_index(col, size, self.width);
                let src_row = scale_index(row, size, self.height);
                self.data[src_row * self.width + src_col].abs()
            })
            .collect();

        let (min, max) = resized
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &val| {
                (min.min(val), max.max(val))
            });
        let range = max - min;

        let pixels = if range > 0.0 && range.is_finite() {
            let scale = 255.0 / range;
            resized
                .iter()
                .map(|&val| ((val - min) * scale).round().clamp(0.0, 255.0) as u8)
                .collect()
        } else {
            vec![0; size * size]
        };

        GrayCanvas { size, pixels }
    }

    /// Maps a pixel of a canvas produced by [render](Self::render) back
    /// to the image coordinate it was sampled from.
    pub fn canvas_to_image(&self, x: i32, y: i32, size: usize) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= size || y >= size {
            return None;
        }
        Some((
            scale_index(x, size, self.width),
            scale_index(y, size, self.height),
        ))
    }
}

/// A square 8-bit grayscale canvas in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayCanvas {
    size: usize,
    pixels: Vec<u8>,
}

impl GrayCanvas {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        (col < self.size && row < self.size).then(|| self.pixels[row * self.size + col])
    }
}

fn scale_index(index: usize, from_len: usize, to_len: usize) -> usize {
    (index * to_len / from_len).min(to_len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(values: &[f32], big_endian: bool) -> Vec<u8> {
        values
            .iter()
            .flat_map(|val| {
                if big_endian {
                    val.to_be_bytes()
                } else {
                    val.to_le_bytes()
                }
            })
            .collect()
    }

    #[test]
    fn decode_little_and_big_endian() {
        let values = [1.0, -2.0, 3.5, 4.0, 0.0, -0.25];

        let image = CovarianceImage::decode(3, 2, "32FC1", false, 12, &encode(&values, false))
            .unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.get(1, 0), Some(-2.0));
        assert_eq!(image.get(2, 1), Some(-0.25));

        let image =
            CovarianceImage::decode(3, 2, "32FC1", true, 12, &encode(&values, true)).unwrap();
        assert_eq!(image.get(0, 1), Some(4.0));
    }

    #[test]
    fn decode_skips_row_padding() {
        let mut bytes = encode(&[1.0, 2.0], false);
        bytes.extend([0xff; 4]);
        bytes.extend(encode(&[3.0, 4.0], false));
        bytes.extend([0xff; 4]);

        let image = CovarianceImage::decode(2, 2, "32FC1", false, 12, &bytes).unwrap();
        assert_eq!(image.get(0, 1), Some(3.0));
        assert_eq!(image.get(1, 1), Some(4.0));
    }

    #[test]
    fn decode_rejects_bad_input() {
        let bytes = encode(&[1.0; 4], false);
        assert!(CovarianceImage::decode(2, 2, "mono8", false, 8, &bytes).is_err());
        assert!(CovarianceImage::decode(2, 2, "32FC1", false, 4, &bytes).is_err());
        assert!(CovarianceImage::decode(2, 3, "32FC1", false, 8, &bytes).is_err());
        assert!(CovarianceImage::decode(0, 0, "32FC1", false, 0, &[]).is_err());
    }

    #[test]
    fn render_spans_full_range() {
        let image = CovarianceImage::new(2, 2, vec![-4.0, 1.0, 2.0, 0.5]).unwrap();
        let canvas = image.render(4);

        assert_eq!(canvas.size(), 4);
        assert_eq!(canvas.pixels().len(), 16);
        assert_eq!(*canvas.pixels().iter().min().unwrap(), 0);
        assert_eq!(*canvas.pixels().iter().max().unwrap(), 255);

        // |-4| is the largest magnitude, 0.5 the smallest
        assert_eq!(canvas.get(0, 0), Some(255));
        assert_eq!(canvas.get(1, 1), Some(255));
        assert_eq!(canvas.get(3, 3), Some(0));
        assert_eq!(canvas.get(2, 0), Some(36));
    }

    #[test]
    fn render_constant_image_is_black() {
        let image = CovarianceImage::new(3, 3, vec![2.5; 9]).unwrap();
        let canvas = image.render(5);
        assert!(canvas.pixels().iter().all(|&px| px == 0));
    }

    #[test]
    fn render_downsamples_by_nearest_neighbor() {
        let data: Vec<f32> = (0..16).map(|val| val as f32).collect();
        let image = CovarianceImage::new(4, 4, data).unwrap();
        let canvas = image.render(2);

        // samples (0,0), (2,0), (0,2), (2,2) of the source
        assert_eq!(canvas.pixels(), &[0, 51, 204, 255]);
    }

    #[test]
    fn canvas_coordinates_match_resize() {
        let data: Vec<f32> = (0..15).map(|val| val as f32).collect();
        let image = CovarianceImage::new(5, 3, data).unwrap();
        let size = 7;
        let canvas = image.render(size);

        for y in 0..size {
            for x in 0..size {
                let (col, row) = image.canvas_to_image(x as i32, y as i32, size).unwrap();
                let expect = image.get(col, row).unwrap();
                // values are 0..=14, so the stretch factor is 255 / 14
                let rendered = canvas.get(x, y).unwrap();
                assert_eq!(rendered, (expect * (255.0 / 14.0)).round() as u8);
            }
        }

        assert!(image.canvas_to_image(-1, 0, size).is_none());
        assert!(image.canvas_to_image(0, 7, size).is_none());
    }
}
