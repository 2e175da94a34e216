//! Contains a trait and utilities for implementing frame sources.
//!
//! A reader for raw 8-bit planar YUV files is built in. The trait is
//! extensible so users may implement their own decoders for other
//! containers.

mod yuv;

pub use self::yuv::YuvReader;

use crate::video::pixel::Pixel;
use crate::video::{ChromaSampling, FrameInfo};

/// A trait for allowing metrics to decode generic video formats.
pub trait Decoder: Send {
    /// Read the next frame from the input video.
    ///
    /// Expected to return `None` if the end of the video is reached.
    fn read_video_frame<T: Pixel>(&mut self) -> Option<FrameInfo<T>>;
    /// Get the bit depth of the video.
    fn get_bit_depth(&self) -> usize;
    /// Get the video details.
    fn get_video_details(&self) -> VideoDetails;
}

/// A structure containing the fixed properties of a video stream.
#[derive(Debug, Clone, Copy)]
pub struct VideoDetails {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bit depth of the video.
    pub bit_depth: usize,
    /// Chroma sampling of the video.
    pub chroma_sampling: ChromaSampling,
}

impl Default for VideoDetails {
    fn default() -> Self {
        VideoDetails {
            width: 640,
            height: 480,
            bit_depth: 8,
            chroma_sampling: ChromaSampling::Cs420,
        }
    }
}
