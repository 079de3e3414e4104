//! `data:` URL encoding and decoding for survey images.
//!
//! The editor previews a chosen image as `data:image/png;base64,...` and
//! sends that same string to the server, which decodes it back into bytes
//! before writing the file.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

/// Image subtypes the server accepts, as they appear in the mime type.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpg", "jpeg", "gif", "png"];

/// Errors from parsing a data URL or sniffing its content.
#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("missing 'data:' prefix")]
    MissingPrefix,

    #[error("data URL is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),

    #[error("content is not a recognised image")]
    UnrecognizedImage,
}

/// A decoded data URL: mime type plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: String,
    data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Build a data URL for image bytes, taking the mime type from the
    /// content itself rather than from a file name.
    pub fn from_image_bytes(data: Vec<u8>) -> Result<Self, DataUrlError> {
        let mime = sniff_image_mime(&data)?;
        Ok(Self::new(mime, data))
    }

    /// Parse `data:<mime>;base64,<payload>`.
    pub fn parse(input: &str) -> Result<Self, DataUrlError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or(DataUrlError::MissingPrefix)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotBase64)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;
        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(mime.to_ascii_lowercase(), data))
    }

    /// Render as `data:<mime>;base64,<payload>`.
    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// File extension for an allowed image type, checked against the actual
    /// content. `image/jpeg` and `image/jpg` both map to `jpg`.
    pub fn image_extension(&self) -> Result<&'static str, DataUrlError> {
        let subtype = self
            .mime
            .strip_prefix("image/")
            .ok_or_else(|| DataUrlError::UnsupportedType(self.mime.clone()))?;
        if !ALLOWED_IMAGE_TYPES.contains(&subtype) {
            return Err(DataUrlError::UnsupportedType(subtype.to_string()));
        }

        let format = image::guess_format(&self.data).map_err(|_| DataUrlError::UnrecognizedImage)?;
        match (subtype, format) {
            ("png", ImageFormat::Png) => Ok("png"),
            ("gif", ImageFormat::Gif) => Ok("gif"),
            ("jpg" | "jpeg", ImageFormat::Jpeg) => Ok("jpg"),
            _ => Err(DataUrlError::UnrecognizedImage),
        }
    }
}

/// Mime type for image bytes, sniffed from their magic number.
pub fn sniff_image_mime(data: &[u8]) -> Result<&'static str, DataUrlError> {
    let format = image::guess_format(data).map_err(|_| DataUrlError::UnrecognizedImage)?;
    match format {
        ImageFormat::Png => Ok("image/png"),
        ImageFormat::Jpeg => Ok("image/jpeg"),
        ImageFormat::Gif => Ok("image/gif"),
        ImageFormat::WebP => Ok("image/webp"),
        other => Err(DataUrlError::UnsupportedType(
            other.extensions_str().first().copied().unwrap_or("unknown").to_string(),
        )),
    }
}

/// Magic-number prefixed byte strings for tests across the workspace.
#[doc(hidden)]
pub mod fixtures {
    /// A PNG signature followed by `len - 8` filler bytes.
    pub fn png_bytes(len: usize) -> Vec<u8> {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.resize(len.max(8), 0x42);
        data
    }

    /// A GIF89a header followed by filler.
    pub fn gif_bytes(len: usize) -> Vec<u8> {
        let mut data = b"GIF89a".to_vec();
        data.resize(len.max(6), 0x00);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{gif_bytes, png_bytes};
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn encode_then_parse_preserves_bytes() {
        let url = DataUrl::new("image/png", png_bytes(2048));
        let encoded = url.encode();
        assert!(encoded.starts_with("data:image/png;base64,"));
        assert_eq!(DataUrl::parse(&encoded).unwrap(), url);
    }

    #[test]
    fn mime_comes_from_content() {
        let url = DataUrl::from_image_bytes(gif_bytes(64)).unwrap();
        assert_eq!(url.mime(), "image/gif");
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert_matches!(
            DataUrl::from_image_bytes(b"hello world".to_vec()),
            Err(DataUrlError::UnrecognizedImage)
        );
    }

    #[test]
    fn parse_rejects_missing_prefix_and_plain_encoding() {
        assert_matches!(DataUrl::parse("image/png;base64,AAAA"), Err(DataUrlError::MissingPrefix));
        assert_matches!(DataUrl::parse("data:text/plain,hello"), Err(DataUrlError::NotBase64));
        assert_matches!(DataUrl::parse("data:image/png;base64,@@@"), Err(DataUrlError::Base64(_)));
    }

    #[test]
    fn extension_checks_allowed_list_and_content() {
        assert_eq!(DataUrl::new("image/png", png_bytes(32)).image_extension().unwrap(), "png");
        assert_matches!(
            DataUrl::new("image/bmp", png_bytes(32)).image_extension(),
            Err(DataUrlError::UnsupportedType(t)) if t == "bmp"
        );
        // Declared png, actually gif.
        assert_matches!(
            DataUrl::new("image/png", gif_bytes(32)).image_extension(),
            Err(DataUrlError::UnrecognizedImage)
        );
        assert_matches!(
            DataUrl::new("text/plain", png_bytes(32)).image_extension(),
            Err(DataUrlError::UnsupportedType(_))
        );
    }
}
