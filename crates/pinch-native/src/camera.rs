use anyhow::Context;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

/// One captured RGB8 frame, row-major, 3 bytes per pixel.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbFrame {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Default webcam; the stream closes when this is dropped.
pub struct CameraFeed {
    camera: Camera,
}

impl CameraFeed {
    pub fn open(index: u32) -> anyhow::Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .with_context(|| format!("could not open camera {index}"))?;
        camera.open_stream().context("could not start camera stream")?;
        let fmt = camera.camera_format();
        log::info!(
            "[camera] {} {}x{} @ {} fps",
            camera.info().human_name(),
            fmt.resolution().width(),
            fmt.resolution().height(),
            fmt.frame_rate()
        );
        Ok(Self { camera })
    }

    /// Grab and decode the next frame.
    pub fn capture(&mut self) -> anyhow::Result<RgbFrame> {
        let buffer = self.camera.frame()?;
        let image = buffer.decode_image::<RgbFormat>()?;
        Ok(RgbFrame {
            width: image.width(),
            height: image.height(),
            data: image.into_raw(),
        })
    }
}
