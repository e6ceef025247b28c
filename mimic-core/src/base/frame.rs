/// A raw image emitted by an environment at one time step.
///
/// Pixels are stored row-major as `height x width x channels` bytes.
/// The frame is not validated on construction;
/// [`ObsPipeline`](crate::ObsPipeline) rejects malformed frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Constructs a frame from raw pixel data.
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<u8>) -> Self {
        Self {
            height,
            width,
            channels,
            data,
        }
    }

    /// Constructs an RGB frame.
    pub fn rgb(height: usize, width: usize, data: Vec<u8>) -> Self {
        Self::new(height, width, 3, data)
    }

    /// Constructs a single channel frame.
    pub fn gray(height: usize, width: usize, data: Vec<u8>) -> Self {
        Self::new(height, width, 1, data)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of channels of a pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the frame and returns the pixel data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
