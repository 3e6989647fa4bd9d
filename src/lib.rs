pub mod backend;
pub mod client;
pub mod config;
pub mod fallback;
pub mod image_ref;
pub mod options;
pub mod prompt;
pub mod session;

pub use client::{EnhanceError, EnhancementClient, EnhancementRequest, EnhancementResult};
pub use image_ref::ImageRef;
pub use options::{BackgroundType, EnhancementOptions};
pub use session::{GenerateOutcome, SessionController, SessionError, SessionState};

use backend::HttpGenerativeBackend;
use config::EnvConfigSource;

// Caller-facing surface for the UI layer: one call in, one displayable
// reference (or a surfaced ConfigError/DecodeError) out.
pub fn enhance_image(
    source_image: Vec<u8>,
    options: &EnhancementOptions,
) -> Result<ImageRef, EnhanceError> {
    let client = EnhancementClient::new(
        EnvConfigSource::from_current_dir(),
        HttpGenerativeBackend::default(),
    );
    let request = EnhancementRequest::new(source_image, options.clone());
    client.enhance(&request).map(|result| result.image_ref)
}
