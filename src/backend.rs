use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::EnhanceConfig;

pub const NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, ugly, bad anatomy, watermark, text";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub negative_prompt: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            num_inference_steps: 35,
            guidance_scale: 8.0,
            negative_prompt: String::from(NEGATIVE_PROMPT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct GenerationPayload<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

pub trait GenerativeBackend: Send + Sync + 'static {
    // 2xx means "segmentation available"; the response payload is not
    // consumed by the generation step.
    fn segment(&self, config: &EnhanceConfig, image: &[u8]) -> Result<(), BackendError>;

    // Returns the raw image payload of a successful generation.
    fn generate(
        &self,
        config: &EnhanceConfig,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<Vec<u8>, BackendError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpGenerativeBackend;

impl HttpGenerativeBackend {
    fn build_client(&self, config: &EnhanceConfig) -> Result<Client, BackendError> {
        Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(BackendError::HttpInit)
    }
}

impl GenerativeBackend for HttpGenerativeBackend {
    fn segment(&self, config: &EnhanceConfig, image: &[u8]) -> Result<(), BackendError> {
        let endpoint = config.segmentation_endpoint.clone();
        let client = self.build_client(config)?;
        let response = client
            .post(endpoint.clone())
            .bearer_auth(config.api_token.as_str())
            .body(image.to_vec())
            .send()
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn generate(
        &self,
        config: &EnhanceConfig,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<Vec<u8>, BackendError> {
        let endpoint = config.generation_endpoint.clone();
        let client = self.build_client(config)?;
        let response = client
            .post(endpoint.clone())
            .bearer_auth(config.api_token.as_str())
            .json(&GenerationPayload {
                inputs: prompt,
                parameters,
            })
            .send()
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http client init failed: {0}")]
    HttpInit(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
}
