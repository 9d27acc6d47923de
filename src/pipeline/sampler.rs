use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};
use thiserror::Error;

use crate::camera::error::CameraError;
use crate::camera::source::CaptureSource;
use crate::camera::types::RawImage;

/// One sampled, encoded frame plus its sequence number.
///
/// Ephemeral: owned by the sampler until handed to the transform client,
/// not retained after hand-off.
pub struct Frame {
    pub sequence: u64,
    /// JPEG-encoded payload ready for transmission.
    pub payload: Vec<u8>,
    pub captured_at: Instant,
}

/// Frame sampling errors.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Reading from the capture device failed.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Rasterisation or JPEG encoding could not produce a payload.
    /// Local to this frame; the session is unaffected.
    #[error("frame encoding failed: {0}")]
    EncodingFailed(String),
}

/// Rasterises the device's current image into a transmittable payload.
pub struct FrameSampler {
    jpeg_quality: u8,
    /// Frames wider than this are downscaled before encoding to bound
    /// upload size. `None` transmits at capture resolution.
    max_width: Option<u32>,
}

impl FrameSampler {
    pub fn new(jpeg_quality: u8, max_width: Option<u32>) -> Self {
        Self {
            jpeg_quality,
            max_width,
        }
    }

    /// Read one raw image from `source` and encode it as a `Frame` tagged
    /// with `sequence`.
    pub fn sample(
        &self,
        source: &mut CaptureSource,
        sequence: u64,
    ) -> Result<Frame, SampleError> {
        let image = source.current_image()?;
        let payload = self.encode(&image)?;
        Ok(Frame {
            sequence,
            payload,
            captured_at: Instant::now(),
        })
    }

    fn encode(&self, image: &RawImage) -> Result<Vec<u8>, SampleError> {
        if image.is_empty() {
            return Err(SampleError::EncodingFailed("zero-sized image".to_string()));
        }

        let (data, width, height) = match self.max_width {
            Some(max) if image.width > max => {
                let scaled_height =
                    ((u64::from(image.height) * u64::from(max)) / u64::from(image.width)) as u32;
                let data = downscale_rgb(image, max, scaled_height.max(1))?;
                (data, max, scaled_height.max(1))
            }
            _ => (image.data.clone(), image.width, image.height),
        };

        encode_jpeg(&data, width, height, self.jpeg_quality)
    }
}

/// Compress raw RGB pixel data to JPEG at the given quality (1-100).
fn encode_jpeg(data: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, SampleError> {
    let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| SampleError::EncodingFailed("buffer/dimension mismatch".to_string()))?;

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| SampleError::EncodingFailed(e.to_string()))?;
    Ok(buf)
}

/// SIMD-accelerated RGB downscale via `fast_image_resize`.
fn downscale_rgb(image: &RawImage, width: u32, height: u32) -> Result<Vec<u8>, SampleError> {
    use fast_image_resize as fr;
    use fr::images::Image;

    let src = Image::from_vec_u8(
        image.width,
        image.height,
        image.data.clone(),
        fr::PixelType::U8x3,
    )
    .map_err(|e| SampleError::EncodingFailed(e.to_string()))?;

    let mut dst = Image::new(width, height, fr::PixelType::U8x3);
    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src, &mut dst, None)
        .map_err(|e| SampleError::EncodingFailed(e.to_string()))?;

    Ok(dst.into_vec())
}
