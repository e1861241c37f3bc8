// ABOUTME: Bearer token supply for service calls
// ABOUTME: Tokens are requested once per call and never cached here

use anyhow::Result;
use async_trait::async_trait;

/// Supplies the bearer token attached to every request.
///
/// Implement this over an OAuth client to refresh tokens before they expire;
/// the service client asks for a token on each call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed, pre-acquired token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        if self.0.is_empty() {
            anyhow::bail!("no access token configured");
        }
        Ok(self.0.clone())
    }
}
