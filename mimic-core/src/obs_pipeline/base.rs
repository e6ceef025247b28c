use super::ObsPipelineConfig;
use crate::{Frame, MimicError};
use anyhow::{bail, Result};
use image::{
    imageops::{grayscale, resize, FilterType::Triangle},
    GrayImage, ImageBuffer, Luma, Rgb, Rgba,
};
use ndarray::{Array2, Array3};
use std::collections::VecDeque;

/// Stacked observation of shape `[H, S, S]`, oldest frame first.
pub type StackedObs = Array3<u8>;

/// Rolling window of the last `H` normalized frames.
///
/// The window always holds exactly `H` frames. It starts out, and restarts on every
/// [`ObsPipeline::reset`], as `H - 1` zero frames followed by the first frame of the episode.
#[derive(Debug, Clone)]
pub struct ObsPipeline {
    frame_size: usize,
    history_length: usize,
    frames: VecDeque<Array2<u8>>,
}

impl ObsPipeline {
    /// Builds a pipeline whose window is filled with zero frames.
    pub fn build(config: &ObsPipelineConfig) -> Result<Self> {
        if config.frame_size == 0 || config.history_length == 0 {
            bail!(
                "frame_size and history_length must be positive, got {} and {}",
                config.frame_size,
                config.history_length
            );
        }
        let mut pipeline = Self {
            frame_size: config.frame_size,
            history_length: config.history_length,
            frames: VecDeque::with_capacity(config.history_length),
        };
        pipeline.fill_zeros();
        Ok(pipeline)
    }

    /// Side length `S` of normalized frames.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of frames `H` in a stacked observation.
    pub fn history_length(&self) -> usize {
        self.history_length
    }

    /// Shape of the stacked observations produced by this pipeline.
    pub fn obs_shape(&self) -> [usize; 3] {
        [self.history_length, self.frame_size, self.frame_size]
    }

    /// Restarts the window with `frame` as its only non-zero entry.
    ///
    /// The previous content of the window has no influence on the result.
    pub fn reset(&mut self, frame: &Frame) -> Result<StackedObs> {
        let frame = self.normalize(frame)?;
        self.fill_zeros();
        self.frames.pop_front();
        self.frames.push_back(frame);
        Ok(self.stacked())
    }

    /// Evicts the oldest frame and appends `frame`.
    ///
    /// A malformed frame leaves the window untouched.
    pub fn step(&mut self, frame: &Frame) -> Result<StackedObs> {
        let frame = self.normalize(frame)?;
        self.frames.pop_front();
        self.frames.push_back(frame);
        Ok(self.stacked())
    }

    /// Converts a raw frame into a single channel `S x S` image.
    pub fn normalize(&self, frame: &Frame) -> Result<Array2<u8>> {
        let (h, w, c) = (frame.height(), frame.width(), frame.channels());
        if h == 0 || w == 0 {
            return Err(MimicError::InvalidFrame(format!("empty frame of size {}x{}", h, w)).into());
        }
        let (w32, h32) = match (u32::try_from(w), u32::try_from(h)) {
            (Ok(w32), Ok(h32)) => (w32, h32),
            _ => {
                return Err(
                    MimicError::InvalidFrame(format!("frame of size {}x{} is too large", h, w))
                        .into(),
                )
            }
        };
        let len = h.checked_mul(w).and_then(|n| n.checked_mul(c)).ok_or_else(|| {
            MimicError::InvalidFrame(format!("size of a {}x{}x{} frame overflows", h, w, c))
        })?;
        if frame.data().len() != len {
            return Err(MimicError::InvalidFrame(format!(
                "expected {} bytes for a {}x{}x{} frame, got {}",
                len,
                h,
                w,
                c,
                frame.data().len()
            ))
            .into());
        }

        let (w, h) = (w32, h32);
        let data = frame.data().to_vec();
        let img: GrayImage = match c {
            1 => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).ok_or_else(|| Self::raw_err(c))?,
            3 => grayscale(
                &ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).ok_or_else(|| Self::raw_err(c))?,
            ),
            4 => grayscale(
                &ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, data).ok_or_else(|| Self::raw_err(c))?,
            ),
            c => {
                return Err(
                    MimicError::InvalidFrame(format!("unsupported number of channels {}", c)).into(),
                )
            }
        };

        let s = self.frame_size as u32;
        let img = resize(&img, s, s, Triangle);
        let arr = Array2::from_shape_vec((self.frame_size, self.frame_size), img.into_raw())?;
        Ok(arr)
    }

    fn raw_err(c: usize) -> MimicError {
        MimicError::InvalidFrame(format!("cannot interpret data as a {} channel image", c))
    }

    fn fill_zeros(&mut self) {
        let s = self.frame_size;
        self.frames.clear();
        for _ in 0..self.history_length {
            self.frames.push_back(Array2::zeros((s, s)));
        }
    }

    fn stacked(&self) -> StackedObs {
        let s = self.frame_size;
        let mut obs = StackedObs::zeros((self.history_length, s, s));
        for (mut dst, src) in obs.outer_iter_mut().zip(self.frames.iter()) {
            dst.assign(src);
        }
        obs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Axis;

    fn pipeline(frame_size: usize, history_length: usize) -> ObsPipeline {
        let config = ObsPipelineConfig::default()
            .frame_size(frame_size)
            .history_length(history_length);
        ObsPipeline::build(&config).unwrap()
    }

    fn flat_rgb(h: usize, w: usize, v: u8) -> Frame {
        Frame::rgb(h, w, vec![v; h * w * 3])
    }

    fn error_of<T: std::fmt::Debug>(res: Result<T>) -> MimicError {
        res.unwrap_err().downcast::<MimicError>().unwrap()
    }

    #[test]
    fn test_reset_pads_with_zero_frames() {
        let mut p = pipeline(4, 3);
        let obs = p.reset(&flat_rgb(10, 8, 200)).unwrap();
        assert_eq!(obs.shape(), &[3, 4, 4]);
        assert!(obs.index_axis(Axis(0), 0).iter().all(|&v| v == 0));
        assert!(obs.index_axis(Axis(0), 1).iter().all(|&v| v == 0));
        assert!(obs.index_axis(Axis(0), 2).iter().all(|&v| v == 200));
    }

    #[test]
    fn test_reset_ignores_previous_window() {
        let mut p = pipeline(4, 3);
        p.reset(&flat_rgb(8, 8, 10)).unwrap();
        p.step(&flat_rgb(8, 8, 20)).unwrap();
        p.step(&flat_rgb(8, 8, 30)).unwrap();

        let mut fresh = pipeline(4, 3);
        let frame = flat_rgb(8, 8, 40);
        assert_eq!(p.reset(&frame).unwrap(), fresh.reset(&frame).unwrap());
    }

    #[test]
    fn test_step_evicts_oldest() {
        let mut p = pipeline(4, 3);
        p.reset(&flat_rgb(8, 8, 1)).unwrap();
        p.step(&flat_rgb(8, 8, 2)).unwrap();
        let obs = p.step(&flat_rgb(8, 8, 3)).unwrap();
        let firsts: Vec<u8> = obs.outer_iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![1, 2, 3]);

        let obs = p.step(&flat_rgb(8, 8, 4)).unwrap();
        let firsts: Vec<u8> = obs.outer_iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![2, 3, 4]);
        assert_eq!(obs.shape(), &[3, 4, 4]);
    }

    #[test]
    fn test_history_of_one() {
        let mut p = pipeline(2, 1);
        let obs = p.reset(&Frame::gray(2, 2, vec![9; 4])).unwrap();
        assert_eq!(obs.shape(), &[1, 2, 2]);
        assert!(obs.iter().all(|&v| v == 9));
    }

    #[test]
    fn test_gray_and_rgba_inputs() {
        let p = pipeline(3, 2);
        let gray = p.normalize(&Frame::gray(6, 6, vec![77; 36])).unwrap();
        assert!(gray.iter().all(|&v| v == 77));
        let rgba = p.normalize(&Frame::new(6, 6, 4, vec![55; 144])).unwrap();
        assert!(rgba.iter().all(|&v| v == 55));
    }

    #[test]
    fn test_invalid_frames() {
        let mut p = pipeline(4, 3);
        assert!(matches!(
            error_of(p.reset(&Frame::new(4, 4, 2, vec![0; 32]))),
            MimicError::InvalidFrame(_)
        ));
        assert!(matches!(
            error_of(p.step(&Frame::rgb(4, 4, vec![0; 47]))),
            MimicError::InvalidFrame(_)
        ));
        assert!(matches!(
            error_of(p.step(&Frame::rgb(0, 4, vec![]))),
            MimicError::InvalidFrame(_)
        ));
    }

    #[test]
    fn test_oversized_frames() {
        let p = pipeline(4, 3);
        // Dimensions beyond u32.
        assert!(matches!(
            error_of(p.normalize(&Frame::new(usize::MAX, 2, 3, vec![]))),
            MimicError::InvalidFrame(_)
        ));
        // Dimensions within u32 whose byte count overflows.
        let side = u32::MAX as usize;
        assert!(matches!(
            error_of(p.normalize(&Frame::new(side, side, 3, vec![]))),
            MimicError::InvalidFrame(_)
        ));
        // Dimensions within u32 whose byte count fits.
        assert!(matches!(
            error_of(p.normalize(&Frame::gray(side, 2, vec![0; 4]))),
            MimicError::InvalidFrame(_)
        ));
    }

    #[test]
    fn test_invalid_frame_keeps_window() {
        let mut p = pipeline(4, 2);
        let before = p.reset(&flat_rgb(4, 4, 5)).unwrap();
        assert!(p.step(&Frame::gray(4, 4, vec![1; 3])).is_err());
        let after = p.step(&flat_rgb(4, 4, 6)).unwrap();
        assert_eq!(after.index_axis(Axis(0), 0), before.index_axis(Axis(0), 1));
    }

    #[test]
    fn test_build_rejects_zero_sizes() {
        assert!(ObsPipeline::build(&ObsPipelineConfig::default().frame_size(0)).is_err());
        assert!(ObsPipeline::build(&ObsPipelineConfig::default().history_length(0)).is_err());
    }
}
