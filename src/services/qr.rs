//! Payload encoding for personal codes

use std::io::Cursor;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use crate::utils::errors::Result;

/// Turns a text payload into an image an admin can scan
pub trait PayloadEncoder: Send + Sync {
    /// Encoded image bytes
    fn encode(&self, payload: &str) -> Result<Vec<u8>>;
}

/// PNG QR code encoder
#[derive(Debug, Clone)]
pub struct QrCodeEncoder {
    min_size: u32,
}

impl QrCodeEncoder {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self::new(320)
    }
}

impl PayloadEncoder for QrCodeEncoder {
    fn encode(&self, payload: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(payload.as_bytes())?;
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
