use image::imageops::FilterType;
use image::RgbImage;
use ndarray::ArrayViewMut3;

/// A single decoded video frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the decode/encode boundaries only;
/// everything in between sees tightly packed RGB24.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

pub const CHANNELS: usize = 3;

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

    /// A frame filled with a single colour.
    #[cfg(test)]
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self::new(data, width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Returns this frame resampled to `width` x `height` with a bilinear
    /// filter. A frame that already has the requested size is returned as-is.
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.width == width && self.height == height {
            return self;
        }
        let index = self.index;
        let Some(img) = RgbImage::from_raw(self.width, self.height, self.data) else {
            unreachable!("Frame data length is checked at construction");
        };
        let scaled = image::imageops::resize(&img, width, height, FilterType::Triangle);
        Self::new(scaled.into_raw(), width, height, index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}
