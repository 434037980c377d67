//! Nimbus: a small function handler driving the Raindrop client.
//!
//! # Overview
//! Startup is a straight line: read `Config`, load the bearer credential,
//! build a `Nimbus` around a `RaindropClient`, then either run the
//! demonstration once (`nimbus run`) or serve it behind `/trigger`
//! (`nimbus serve`).
//!
//! # Design
//! There is no global instance. The binary builds one `Nimbus` and hands it
//! to the trigger router as shared state, so tests can build their own
//! against the mock server.

pub mod config;
pub mod trigger;

use raindrop_core::{ApiError, CollectionRef, Raindrop, RaindropClient};
use tracing::info;

pub use config::{load_credential, Config, ConfigError};

/// Collection the demonstration raindrop is filed into.
pub const TEST_COLLECTION: i64 = 46406303;

const DEMO_LINK: &str =
    "https://stackoverflow.com/questions/24455147/how-do-i-send-a-json-string-in-a-post-request-in-go";
const DEMO_TITLE: &str = "How do I send a JSON string in a POST request";

/// Status and raw body of the demonstration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleOutcome {
    pub status: u16,
    pub body: String,
}

impl ExampleOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct Nimbus {
    client: RaindropClient,
}

impl Nimbus {
    pub fn new(client: RaindropClient) -> Self {
        Self { client }
    }

    /// Load the keychain named by `config` and bind a client to its base URL.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let credential = load_credential(&config.keychain_path)?;
        Ok(Self::new(RaindropClient::new(&config.base_url, credential)))
    }

    pub fn client(&self) -> &RaindropClient {
        &self.client
    }

    /// The raindrop created by `run_example`.
    pub fn demo_raindrop() -> Raindrop {
        Raindrop {
            title: DEMO_TITLE.to_string(),
            collection: Some(CollectionRef::new(TEST_COLLECTION)),
            ..Raindrop::with_link(DEMO_LINK)
        }
    }

    /// Create the demonstration raindrop and return the service's answer.
    ///
    /// Blocks for one HTTP round-trip. Transport and construction failures
    /// are errors; any HTTP status is returned as an outcome.
    pub fn run_example(&self) -> Result<ExampleOutcome, ApiError> {
        info!(collection = TEST_COLLECTION, "creating demonstration raindrop");
        let response = self.client.create_raindrop(&Self::demo_raindrop());
        let status = response.status().unwrap_or_default();
        let body = response.execute_on_response(str::to_owned)?;
        info!(status, body_len = body.len(), "demonstration finished");
        Ok(ExampleOutcome { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raindrop_core::Credential;

    #[test]
    fn demo_raindrop_targets_test_collection() {
        let raindrop = Nimbus::demo_raindrop();
        assert_eq!(raindrop.link, DEMO_LINK);
        assert_eq!(raindrop.collection, Some(CollectionRef::new(TEST_COLLECTION)));
        let json = serde_json::to_value(&raindrop).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn outcome_success_range() {
        let ok = ExampleOutcome {
            status: 200,
            body: String::new(),
        };
        let denied = ExampleOutcome {
            status: 401,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }

    #[test]
    fn unreachable_service_is_an_error() {
        let nimbus = Nimbus::new(RaindropClient::new(
            "http://127.0.0.1:1/rest/v1",
            Credential::new("t"),
        ));
        assert!(matches!(nimbus.run_example(), Err(ApiError::Transport(_))));
    }
}
