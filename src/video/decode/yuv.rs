//! Frame reader for headerless planar YUV ("raw") files.
//!
//! Raw YUV carries no metadata, so the caller supplies the resolution and
//! chroma subsampling up front; frames are stored back to back, each as a
//! full luma plane followed by the two chroma planes.

use crate::video::decode::{Decoder, VideoDetails};
use crate::video::pixel::Pixel;
use crate::video::{ChromaSampling, FrameInfo, PlaneData};
use crate::MetricsError;
use std::io::Read;

/// Sequential frame reader over any byte source containing raw 8-bit
/// planar YUV data.
pub struct YuvReader<R: Read> {
    reader: R,
    details: VideoDetails,
}

impl<R: Read + Send> YuvReader<R> {
    /// Wraps a byte source holding frames of the given geometry.
    ///
    /// 4:2:0 video requires even luma dimensions and 4:2:2 an even width;
    /// anything else cannot be subsampled consistently.
    pub fn new(
        reader: R,
        width: usize,
        height: usize,
        chroma_sampling: ChromaSampling,
    ) -> Result<Self, MetricsError> {
        match chroma_sampling {
            ChromaSampling::Cs420 if width % 2 == 1 || height % 2 == 1 => {
                return Err(MetricsError::MalformedInput {
                    reason: "4:2:0 video requires even luma dimensions",
                });
            }
            ChromaSampling::Cs422 if width % 2 == 1 => {
                return Err(MetricsError::MalformedInput {
                    reason: "4:2:2 video requires an even luma width",
                });
            }
            _ => (),
        }
        Ok(YuvReader {
            reader,
            details: VideoDetails {
                width,
                height,
                bit_depth: 8,
                chroma_sampling,
            },
        })
    }

    fn read_plane<T: Pixel>(&mut self, width: usize, height: usize) -> Option<PlaneData<T>> {
        let mut buf = vec![0u8; width * height];
        if !buf.is_empty() {
            self.reader.read_exact(&mut buf).ok()?;
        }
        Some(PlaneData {
            width,
            height,
            data: buf.iter().map(|&b| T::cast_from(b)).collect(),
        })
    }
}

impl<R: Read + Send> Decoder for YuvReader<R> {
    fn read_video_frame<T: Pixel>(&mut self) -> Option<FrameInfo<T>> {
        let details = self.details;
        let (chroma_width, chroma_height) = details
            .chroma_sampling
            .get_chroma_dimensions(details.width, details.height);
        let y = self.read_plane(details.width, details.height)?;
        let u = self.read_plane(chroma_width, chroma_height)?;
        let v = self.read_plane(chroma_width, chroma_height)?;
        Some(FrameInfo {
            planes: [y, u, v],
            bit_depth: details.bit_depth,
            chroma_sampling: details.chroma_sampling,
        })
    }

    fn get_bit_depth(&self) -> usize {
        self.details.bit_depth
    }

    fn get_video_details(&self) -> VideoDetails {
        self.details
    }
}
