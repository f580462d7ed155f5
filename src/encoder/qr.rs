//! QR code PNG encoder

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{Color as Module, EcLevel, QrCode};
use std::io::Cursor;

use super::{png_data_url, CodeImageEncoder, EncodeOptions};
use crate::error::{AgentError, Result};

/// Renders QR symbols (error correction level M) as PNG data URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct QrPngEncoder;

impl QrPngEncoder {
    pub const fn new() -> Self {
        Self
    }

    /// Rasterize a QR symbol into an RGBA image.
    ///
    /// The image is exactly `options.width` pixels square unless the symbol plus
    /// its quiet zone needs more pixels than that, in which case one pixel per
    /// module is used.
    pub fn render(&self, text: &str, options: &EncodeOptions) -> Result<RgbaImage> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .map_err(|e| AgentError::Encoding(e.to_string()))?;

        let modules = u64::try_from(code.width())
            .map_err(|e| AgentError::Encoding(format!("Symbol too large: {e}")))?;
        let colors = code.to_colors();
        let margin = u64::from(options.margin);
        let size = modules + 2 * margin;
        let width = u64::from(options.width).max(size);
        let side = u32::try_from(width)
            .map_err(|e| AgentError::Encoding(format!("Image too large: {e}")))?;

        let dark = Rgba(options.foreground);
        let light = Rgba(options.background);

        let image = RgbaImage::from_fn(side, side, |x, y| {
            let mx = u64::from(x) * size / width;
            let my = u64::from(y) * size / width;
            let inside = (margin..margin + modules).contains(&mx)
                && (margin..margin + modules).contains(&my);
            if !inside {
                return light;
            }
            // Both indices are bounded by `modules`, which came from a usize
            #[allow(clippy::cast_possible_truncation)]
            let index = ((my - margin) * modules + (mx - margin)) as usize;
            match colors.get(index) {
                Some(Module::Dark) => dark,
                _ => light,
            }
        });

        Ok(image)
    }
}

impl CodeImageEncoder for QrPngEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<String> {
        let image = self.render(text, options)?;

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(png_data_url(&png))
    }
}
