use std::io::Cursor;

use image::ImageFormat;
use thiserror::Error;

use crate::image_ref::ImageRef;

// Deterministic re-encode of the unmodified source image. This is the
// result of last resort: the user flow must always end with a displayable
// image unless the source itself is malformed.
pub fn fallback_image_ref(source_image: &[u8]) -> Result<ImageRef, DecodeError> {
    let decoded = image::load_from_memory(source_image).map_err(DecodeError::MalformedSource)?;
    let mut encoded = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(DecodeError::Reencode)?;
    Ok(ImageRef::from_encoded(ImageFormat::Png, encoded.as_slice()))
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("source image could not be decoded: {0}")]
    MalformedSource(#[source] image::ImageError),
    #[error("source image could not be re-encoded: {0}")]
    Reencode(#[source] image::ImageError),
}
