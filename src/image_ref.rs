use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::ImageFormat;

// Owned displayable handle: a data URL the presentation layer can render
// directly. Releasing a reference is dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    mime: &'static str,
    payload: String,
}

impl ImageRef {
    pub fn from_encoded(format: ImageFormat, bytes: &[u8]) -> Self {
        Self {
            mime: format.to_mime_type(),
            payload: BASE64_STANDARD.encode(bytes),
        }
    }

    // Accepts a remote payload only if it both sniffs as a known raster
    // format and decodes cleanly.
    pub fn sniff_encoded(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let format = image::guess_format(bytes)?;
        image::load_from_memory_with_format(bytes, format)?;
        Ok(Self::from_encoded(format, bytes))
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.payload)
    }

    pub fn to_encoded_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(self.payload.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]))
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    #[test]
    fn data_url_carries_mime_and_payload() {
        let reference = ImageRef::from_encoded(ImageFormat::Png, b"abc");
        let url = reference.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(reference.mime_type(), "image/png");
    }

    #[test]
    fn encoded_bytes_round_trip() {
        let bytes = tiny_png();
        let reference = ImageRef::from_encoded(ImageFormat::Png, bytes.as_slice());
        assert_eq!(reference.to_encoded_bytes().expect("decode"), bytes);
    }

    #[test]
    fn sniff_accepts_well_formed_png() {
        let reference = ImageRef::sniff_encoded(tiny_png().as_slice()).expect("sniff");
        assert_eq!(reference.mime_type(), "image/png");
    }

    #[test]
    fn sniff_rejects_non_image_payload() {
        assert!(ImageRef::sniff_encoded(b"{\"error\":\"model loading\"}").is_err());
    }

    #[test]
    fn sniff_rejects_truncated_png() {
        let mut bytes = tiny_png();
        bytes.truncate(bytes.len() / 2);
        assert!(ImageRef::sniff_encoded(bytes.as_slice()).is_err());
    }
}
