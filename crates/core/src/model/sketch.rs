use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

/// Browsers and canvas exports are inconsistent about trailing `=`.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SketchError {
    #[error("image payload is empty")]
    Empty,

    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),
}

/// A decoded sketch upload.
#[derive(Clone, PartialEq, Eq)]
pub struct SketchImage {
    bytes: Vec<u8>,
}

impl SketchImage {
    /// Decode a base64 payload as sent by the drawing canvas.
    ///
    /// A `data:<mime>;base64,` prefix and embedded whitespace are tolerated.
    ///
    /// # Errors
    ///
    /// Returns `SketchError::Empty` for a blank payload and
    /// `SketchError::InvalidBase64` when decoding fails.
    pub fn from_base64(payload: &str) -> Result<Self, SketchError> {
        let payload = strip_data_url(payload.trim());
        let cleaned: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(SketchError::Empty);
        }

        let bytes = LENIENT
            .decode(cleaned.as_bytes())
            .map_err(|e| SketchError::InvalidBase64(e.to_string()))?;
        Ok(Self { bytes })
    }

    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for SketchImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchImage")
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn strip_data_url(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }
    match payload.split_once(',') {
        Some((header, body)) if header.ends_with(";base64") => body,
        _ => payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_base64() {
        let image = SketchImage::from_base64("iVBORw0KGgo=").unwrap();
        assert_eq!(image.as_bytes(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn strips_data_url_prefix_and_whitespace() {
        let image = SketchImage::from_base64("data:image/png;base64,aGVs\nbG8=").unwrap();
        assert_eq!(image.as_bytes(), b"hello");
    }

    #[test]
    fn tolerates_missing_padding() {
        let image = SketchImage::from_base64("aGVsbG8").unwrap();
        assert_eq!(image.as_bytes(), b"hello");
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(SketchImage::from_base64("   "), Err(SketchError::Empty));
        assert_eq!(
            SketchImage::from_base64("data:image/png;base64,"),
            Err(SketchError::Empty)
        );
        assert!(matches!(
            SketchImage::from_base64("not*base64!"),
            Err(SketchError::InvalidBase64(_))
        ));
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let image = SketchImage::from_bytes(vec![1, 2, 3]);
        assert_eq!(format!("{image:?}"), "SketchImage { len: 3 }");
    }
}
