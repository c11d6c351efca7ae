// Application state module
// Immutable configuration plus the pooled outbound HTTP client

use std::time::Duration;

use super::types::Config;

/// Application state, shared by every connection
pub struct AppState {
    pub config: Config,
    /// Outbound client; pooled connections are reused across requests
    pub client: reqwest::Client,
}

impl AppState {
    /// Create `AppState` and build the outbound client from the upstream section
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let upstream = &config.upstream;
        let mut builder = reqwest::Client::builder().user_agent(config.http.server_name.clone());

        // Zero leaves the corresponding deadline unset
        if upstream.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(upstream.timeout_secs));
        }
        if upstream.connect_timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(upstream.connect_timeout_secs));
        }

        let client = builder.build()?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }
}
