//! # vibe-auth
//!
//! Access tokens for the myvibe hub.
//!
//! Tokens come from the `MYVIBE_ACCESS_TOKEN` env var or a per-hub credentials
//! file. When neither has one, [`HubAuthenticator`] can run the interactive
//! browser approval flow and remember the result.

pub mod access_flow;
pub mod error;
pub mod token_store;

use async_trait::async_trait;
use vibe_core::HubUrl;

pub use access_flow::FlowSettings;
pub use error::AuthError;
pub use token_store::{TOKEN_ENV_VAR, TokenSource, TokenStore};

/// Supplies a bearer token for a hub.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, hub: &HubUrl) -> Result<String, AuthError>;
}

/// Stored token first, interactive flow as a fallback.
pub struct HubAuthenticator {
    store: TokenStore,
    http: reqwest::Client,
    flow: FlowSettings,
    interactive: bool,
}

impl HubAuthenticator {
    #[must_use]
    pub const fn new(store: TokenStore, http: reqwest::Client, flow: FlowSettings) -> Self {
        Self {
            store,
            http,
            flow,
            interactive: true,
        }
    }

    /// Fail with [`AuthError::NotAuthenticated`] instead of opening a browser.
    #[must_use]
    pub const fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Run the interactive flow unconditionally and store the new token.
    ///
    /// # Errors
    ///
    /// Propagates flow and token-store failures.
    pub async fn login(&self, hub: &HubUrl) -> Result<String, AuthError> {
        let token = access_flow::login(&self.http, hub, self.flow).await?;
        self.store.store(hub, &token)?;
        tracing::info!(hub = %hub, "access token stored");
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for HubAuthenticator {
    async fn access_token(&self, hub: &HubUrl) -> Result<String, AuthError> {
        if let Some(token) = self.store.load(hub) {
            return Ok(token);
        }
        if !self.interactive {
            return Err(AuthError::NotAuthenticated(hub.origin()));
        }
        self.login(hub).await
    }
}
