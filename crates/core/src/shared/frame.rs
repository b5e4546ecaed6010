use image::RgbImage;
use ndarray::ArrayView3;

use crate::shared::dimensions::Dimensions;

const CHANNELS: usize = 3;

/// One camera frame: contiguous RGB bytes in row-major order.
///
/// `index` counts frames since the stream started playing.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Native size of the video this frame came from.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.dimensions(), Dimensions::new(2, 2));
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_is_height_width_channels() {
        let mut data = vec![0u8; 24]; // 4 wide, 2 high
        data[(4 + 1) * 3] = 200; // row=1, col=1, R
        let frame = Frame::new(data, 4, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]);
        assert_eq!(arr[[1, 1, 0]], 200);
    }

    #[test]
    fn test_image_conversion_keeps_pixels() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([1, 2, 3]));
        let frame = Frame::new(img.clone().into_raw(), 3, 2, 7);
        assert_eq!(frame.dimensions(), Dimensions::new(3, 2));
        assert_eq!(frame.to_image(), img);
    }
}
