//! Code image encoder module
//!
//! Turns command payloads into self-contained image data URLs.
//! Symbol construction is delegated to the `qrcode` crate, rasterization and
//! PNG output to `image`.

mod qr;

pub use qr::QrPngEncoder;

use crate::config::EncoderConfig;
use crate::error::{AgentError, Result};

/// RGBA color
pub type Color = [u8; 4];

pub const BLACK: Color = [0, 0, 0, 255];
pub const WHITE: Color = [255, 255, 255, 255];

/// Rendering options passed to an encoder for every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Output image width (and height) in pixels
    pub width: u32,
    /// Quiet zone around the symbol, in modules
    pub margin: u32,
    pub foreground: Color,
    pub background: Color,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            width: 300,
            margin: 2,
            foreground: BLACK,
            background: WHITE,
        }
    }
}

impl EncodeOptions {
    /// Build options from the `[encoder]` config section
    pub fn from_config(config: &EncoderConfig) -> std::result::Result<Self, String> {
        Ok(Self {
            width: config.width,
            margin: config.margin,
            foreground: parse_hex_color(&config.foreground)?,
            background: parse_hex_color(&config.background)?,
        })
    }
}

/// Encodes text into an image data URL.
///
/// Implementations run on the blocking pool, so they must be shareable across threads.
pub trait CodeImageEncoder: Send + Sync {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<String>;
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into an RGBA color
pub fn parse_hex_color(value: &str) -> std::result::Result<Color, String> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid color '{value}': not a hex value"));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|e| format!("Invalid color '{value}': {e}"));

    match hex.len() {
        3 => {
            let mut rgba = [0, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgba[i] = v * 17;
            }
            Ok(rgba)
        }
        6 | 8 => {
            let mut rgba = [0, 0, 0, 255];
            for i in 0..hex.len() / 2 {
                rgba[i] = channel(&hex[i * 2..i * 2 + 2])?;
            }
            Ok(rgba)
        }
        _ => Err(format!(
            "Invalid color '{value}': expected #rgb, #rrggbb or #rrggbbaa"
        )),
    }
}

/// Wrap PNG bytes in a `data:` URL
pub fn png_data_url(png: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

impl From<image::ImageError> for AgentError {
    fn from(e: image::ImageError) -> Self {
        Self::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_long() {
        assert_eq!(parse_hex_color("#000000").unwrap(), BLACK);
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), WHITE);
        assert_eq!(parse_hex_color("#ff000080").unwrap(), [255, 0, 0, 128]);
        assert_eq!(parse_hex_color("  00ff00 ").unwrap(), [0, 255, 0, 255]);
    }

    #[test]
    fn test_parse_hex_color_short() {
        assert_eq!(parse_hex_color("#fff").unwrap(), WHITE);
        assert_eq!(parse_hex_color("#f00").unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("black").is_err());
        assert!(parse_hex_color("#ggg").is_err());
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = EncoderConfig {
            width: 120,
            margin: 4,
            foreground: "#112233".to_string(),
            background: "#fff".to_string(),
        };
        let options = EncodeOptions::from_config(&config).unwrap();
        assert_eq!(options.width, 120);
        assert_eq!(options.margin, 4);
        assert_eq!(options.foreground, [0x11, 0x22, 0x33, 255]);
        assert_eq!(options.background, WHITE);
    }

    #[test]
    fn test_png_data_url_prefix() {
        let url = png_data_url(&[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
    }
}
