use std::sync::{Arc, Mutex};

use image::ImageFormat;
use pretty_assertions::assert_eq;

use photomonix_enhance_core::backend::{BackendError, GenerationParameters, GenerativeBackend};
use photomonix_enhance_core::config::{ConfigError, ConfigSource, EnhanceConfig};
use photomonix_enhance_core::fallback::fallback_image_ref;
use photomonix_enhance_core::{
    EnhanceError, EnhancementClient, EnhancementOptions, GenerateOutcome, SessionController,
    SessionError, SessionState,
};

struct TokenConfigSource;

impl ConfigSource for TokenConfigSource {
    fn load(&self) -> Result<EnhanceConfig, ConfigError> {
        EnhanceConfig::with_token("hf_test")
    }
}

struct MissingTokenConfigSource;

impl ConfigSource for MissingTokenConfigSource {
    fn load(&self) -> Result<EnhanceConfig, ConfigError> {
        Err(ConfigError::MissingApiToken)
    }
}

// Simulates a generation endpoint that times out on every request; counts
// outbound calls so tests can assert the single-in-flight guarantee.
struct TimeoutBackend {
    generate_calls: Arc<Mutex<u32>>,
}

impl GenerativeBackend for TimeoutBackend {
    fn segment(&self, _config: &EnhanceConfig, _image: &[u8]) -> Result<(), BackendError> {
        Ok(())
    }

    fn generate(
        &self,
        _config: &EnhanceConfig,
        _prompt: &str,
        _parameters: &GenerationParameters,
    ) -> Result<Vec<u8>, BackendError> {
        *self
            .generate_calls
            .lock()
            .expect("timeout backend mutex poisoned") += 1;
        Err(BackendError::Status {
            endpoint: String::from("https://example.invalid/generate"),
            status: 504,
            body: String::from("gateway timeout"),
        })
    }
}

struct SucceedingBackend {
    generate_calls: Arc<Mutex<u32>>,
    payload: Vec<u8>,
}

impl GenerativeBackend for SucceedingBackend {
    fn segment(&self, _config: &EnhanceConfig, _image: &[u8]) -> Result<(), BackendError> {
        Ok(())
    }

    fn generate(
        &self,
        _config: &EnhanceConfig,
        _prompt: &str,
        _parameters: &GenerationParameters,
    ) -> Result<Vec<u8>, BackendError> {
        *self
            .generate_calls
            .lock()
            .expect("succeeding backend mutex poisoned") += 1;
        Ok(self.payload.clone())
    }
}

fn tiny_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::from_pixel(4, 4, image::Rgb([5, 10, 15]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encode");
    bytes
}

fn calls(counter: &Arc<Mutex<u32>>) -> u32 {
    *counter.lock().expect("call counter mutex poisoned")
}

#[test]
fn generation_timeout_settles_in_succeeded_with_source_fallback() {
    let counter = Arc::new(Mutex::new(0));
    let mut controller = SessionController::new(EnhancementClient::new(
        TokenConfigSource,
        TimeoutBackend {
            generate_calls: counter.clone(),
        },
    ));
    let source = tiny_png();
    controller.select_source(source.clone()).expect("select");

    let outcome = controller.generate().expect("generate");
    assert_eq!(outcome, GenerateOutcome::Completed);
    assert_eq!(controller.state(), SessionState::Succeeded);
    assert_eq!(calls(&counter), 1);

    let result = controller.result().expect("result should be held");
    let expected = fallback_image_ref(source.as_slice()).expect("direct re-encode");
    assert_eq!(result.image_ref, expected);
}

#[test]
fn repeated_generate_after_settlement_sends_no_second_request() {
    let counter = Arc::new(Mutex::new(0));
    let mut controller = SessionController::new(EnhancementClient::new(
        TokenConfigSource,
        SucceedingBackend {
            generate_calls: counter.clone(),
            payload: tiny_png(),
        },
    ));
    controller.select_source(tiny_png()).expect("select");
    controller.generate().expect("first generate");

    let outcome = controller.generate().expect("second generate");
    assert_eq!(outcome, GenerateOutcome::Ignored);
    assert_eq!(calls(&counter), 1);
}

#[test]
fn config_error_surfaces_once_and_preserves_the_session_for_retry() {
    let mut controller = SessionController::new(EnhancementClient::new(
        MissingTokenConfigSource,
        TimeoutBackend {
            generate_calls: Arc::new(Mutex::new(0)),
        },
    ));
    controller.select_source(tiny_png()).expect("select");
    controller.options_mut().reference_notes = String::from("keep the hat");

    let err = controller.generate().expect_err("missing token must surface");
    assert!(matches!(
        err,
        SessionError::Enhance(EnhanceError::Config(ConfigError::MissingApiToken))
    ));
    assert_eq!(controller.state(), SessionState::AwaitingOptions);
    assert_eq!(controller.options().reference_notes, "keep the hat");
    let alert = controller.last_error().expect("alert message should be held");
    assert!(alert.contains("HUGGINGFACE_API_TOKEN"));
}

#[test]
fn start_new_resets_options_and_releases_the_result() {
    let counter = Arc::new(Mutex::new(0));
    let mut controller = SessionController::new(EnhancementClient::new(
        TokenConfigSource,
        SucceedingBackend {
            generate_calls: counter.clone(),
            payload: tiny_png(),
        },
    ));
    controller.select_source(tiny_png()).expect("select");
    controller.options_mut().colors = false;
    controller.generate().expect("generate");
    assert!(controller.result().is_some());

    controller.start_new().expect("start new");
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(controller.result().is_none());
    assert_eq!(controller.options(), &EnhancementOptions::default());
}

#[test]
fn selecting_a_new_source_discards_the_previous_result() {
    let counter = Arc::new(Mutex::new(0));
    let mut controller = SessionController::new(EnhancementClient::new(
        TokenConfigSource,
        SucceedingBackend {
            generate_calls: counter.clone(),
            payload: tiny_png(),
        },
    ));
    controller.select_source(tiny_png()).expect("select");
    controller.generate().expect("generate");
    assert!(controller.result().is_some());

    controller.select_source(tiny_png()).expect("re-select");
    assert_eq!(controller.state(), SessionState::AwaitingOptions);
    assert!(controller.result().is_none());

    controller.generate().expect("second run");
    assert_eq!(calls(&counter), 2);
}
