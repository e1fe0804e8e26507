//! Live camera capture.
//!
//! A [`CameraDevice`] hands out at most one [`VideoStream`] at a time. The
//! stream is owned by a [`CameraSession`], which releases it (stops every
//! track) exactly once: after a successful capture, on cancel, or on drop,
//! whichever comes first.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;

use crate::image::{ImageData, ImageError};

/// JPEG quality used when freezing a frame (0.95 on a 0-1 scale).
pub const JPEG_QUALITY: u8 = 95;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera not supported: {0}")]
    Unsupported(String),

    #[error("No frame available: {0}")]
    FrameUnavailable(String),

    #[error("Camera stream already released")]
    Released,

    #[error(transparent)]
    Encode(#[from] ImageError),
}

/// Which camera to prefer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    /// Rear-facing camera, pointed at the fridge.
    #[default]
    Environment,
    User,
}

/// Constraints passed when acquiring a stream. The facing mode is a
/// preference; devices with a single camera may ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: Facing,
}

/// An acquired live video stream.
pub trait VideoStream: Send {
    /// The current frame at the stream's native resolution.
    fn current_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Stop every track of the stream, releasing the device.
    fn stop_tracks(&mut self);
}

/// Source of live video streams.
pub trait CameraDevice {
    fn open(&mut self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// Device used where no camera backend exists. Every open fails.
#[derive(Debug, Default)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&mut self, _: &StreamConstraints) -> Result<Box<dyn VideoStream>, CameraError> {
        Err(CameraError::Unsupported(
            "no camera backend available".to_string(),
        ))
    }
}

/// An open camera preview.
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    /// Acquire a stream from the device, preferring the rear camera.
    pub fn open(device: &mut dyn CameraDevice) -> Result<Self, CameraError> {
        let constraints = StreamConstraints {
            facing: Facing::Environment,
        };
        let stream = device.open(&constraints)?;
        tracing::debug!("Camera stream acquired");
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Freeze the current frame into a JPEG and release the stream.
    ///
    /// If no frame can be read the stream stays open so the user can retry.
    pub fn capture(&mut self) -> Result<ImageData, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::Released)?;
        let frame = stream.current_frame()?;
        self.release();

        let image = encode_jpeg(&frame, JPEG_QUALITY)?;
        tracing::debug!(
            width = frame.width(),
            height = frame.height(),
            size = image.bytes.len(),
            "Captured camera frame"
        );
        Ok(image)
    }

    /// Close the preview without capturing.
    pub fn cancel(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            tracing::debug!("Camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Encode a frame as JPEG at the given quality (1-100).
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<ImageData, ImageError> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(frame)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(ImageData::new(out.into_inner(), "image/jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeStream {
        stops: Arc<AtomicUsize>,
        frame_ok: bool,
    }

    impl VideoStream for FakeStream {
        fn current_frame(&mut self) -> Result<RgbImage, CameraError> {
            if self.frame_ok {
                Ok(RgbImage::from_pixel(8, 6, Rgb([10, 120, 30])))
            } else {
                Err(CameraError::FrameUnavailable("not ready".to_string()))
            }
        }

        fn stop_tracks(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        stops: Arc<AtomicUsize>,
        frame_ok: bool,
        last_facing: Option<Facing>,
    }

    impl FakeCamera {
        fn new(frame_ok: bool) -> Self {
            Self {
                stops: Arc::new(AtomicUsize::new(0)),
                frame_ok,
                last_facing: None,
            }
        }
    }

    impl CameraDevice for FakeCamera {
        fn open(
            &mut self,
            constraints: &StreamConstraints,
        ) -> Result<Box<dyn VideoStream>, CameraError> {
            self.last_facing = Some(constraints.facing);
            Ok(Box::new(FakeStream {
                stops: self.stops.clone(),
                frame_ok: self.frame_ok,
            }))
        }
    }

    #[test]
    fn test_capture_encodes_jpeg_and_releases_once() {
        let mut camera = FakeCamera::new(true);
        let mut session = CameraSession::open(&mut camera).unwrap();
        assert_eq!(camera.last_facing, Some(Facing::Environment));

        let image = session.capture().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert!(!session.is_active());

        session.cancel();
        drop(session);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_frame_keeps_stream_open() {
        let mut camera = FakeCamera::new(false);
        let mut session = CameraSession::open(&mut camera).unwrap();

        assert!(matches!(
            session.capture(),
            Err(CameraError::FrameUnavailable(_))
        ));
        assert!(session.is_active());
        assert_eq!(camera.stops.load(Ordering::SeqCst), 0);

        drop(session);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_after_cancel_fails() {
        let mut camera = FakeCamera::new(true);
        let mut session = CameraSession::open(&mut camera).unwrap();
        session.cancel();
        assert!(matches!(session.capture(), Err(CameraError::Released)));
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_camera_is_unsupported() {
        let result = CameraSession::open(&mut NoCamera);
        assert!(matches!(result, Err(CameraError::Unsupported(_))));
    }
}
