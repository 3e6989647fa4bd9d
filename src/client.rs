use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::{GenerationParameters, GenerativeBackend};
use crate::config::{ConfigError, ConfigSource};
use crate::fallback::{fallback_image_ref, DecodeError};
use crate::image_ref::ImageRef;
use crate::options::EnhancementOptions;
use crate::prompt::build_prompt;

// Immutable snapshot taken at the moment the user triggers generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    source_image: Vec<u8>,
    options: EnhancementOptions,
}

impl EnhancementRequest {
    pub fn new(source_image: Vec<u8>, options: EnhancementOptions) -> Self {
        Self {
            source_image,
            options,
        }
    }

    pub fn source_image(&self) -> &[u8] {
        self.source_image.as_slice()
    }

    pub fn options(&self) -> &EnhancementOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementResult {
    pub image_ref: ImageRef,
    pub elapsed_millis: u64,
}

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone)]
pub struct EnhancementClient<C, B> {
    config: C,
    backend: B,
}

impl<C, B> EnhancementClient<C, B>
where
    C: ConfigSource,
    B: GenerativeBackend,
{
    pub fn new(config: C, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // Always yields a displayable image or a ConfigError. Remote failures
    // are absorbed into the fallback re-encode of the source; only a
    // malformed source blob escalates as DecodeError.
    pub fn enhance(&self, request: &EnhancementRequest) -> Result<EnhancementResult, EnhanceError> {
        let config = self.config.load()?;
        let prompt = build_prompt(request.options());

        if request.options().wants_background_swap() {
            // Best effort: the segmentation output is discarded, only its
            // availability is observed.
            match self.backend.segment(&config, request.source_image()) {
                Ok(()) => debug!("background segmentation pre-pass available"),
                Err(error) => warn!(
                    %error,
                    "background segmentation pre-pass failed, continuing with direct generation"
                ),
            }
        }

        let image_ref = match self
            .backend
            .generate(&config, prompt.as_str(), &GenerationParameters::default())
        {
            Ok(payload) => match ImageRef::sniff_encoded(payload.as_slice()) {
                Ok(image_ref) => {
                    debug!(bytes = payload.len(), "generation payload accepted");
                    image_ref
                }
                Err(error) => {
                    warn!(%error, "generation payload was not a displayable image, using fallback");
                    fallback_image_ref(request.source_image())?
                }
            },
            Err(error) => {
                warn!(%error, "generation request failed, using fallback");
                fallback_image_ref(request.source_image())?
            }
        };

        // Caller measures elapsed time around the whole call.
        Ok(EnhancementResult {
            image_ref,
            elapsed_millis: 0,
        })
    }
}
