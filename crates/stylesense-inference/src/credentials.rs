//! Credential resolution and per-request backend handles.
//!
//! There is no process-wide AI client. Each request resolves a credential
//! from configuration (plus an optional key the caller supplied) and gets a
//! backend handle bound to it.

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use stylesense_core::{Error, InferenceBackend, Result};

use crate::gemini::{GeminiBackend, GeminiConfig};

/// Usage tier of a credential. Elevated credentials have a higher quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialTier {
    Standard,
    Elevated,
}

impl CredentialTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialTier::Standard => "standard",
            CredentialTier::Elevated => "elevated",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, CredentialTier::Elevated)
    }
}

/// An API key together with its tier.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
    tier: CredentialTier,
}

impl Credential {
    pub fn new(api_key: impl Into<String>, tier: CredentialTier) -> Self {
        Self {
            api_key: api_key.into(),
            tier,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn tier(&self) -> CredentialTier {
        self.tier
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("tier", &self.tier)
            .finish()
    }
}

/// Pick the credential for one request.
///
/// Precedence: a key supplied with the request (treated as elevated, the
/// caller connected their own higher-tier key), then the configured elevated
/// key, then the configured standard key.
pub fn resolve_credential(config: &GeminiConfig, request_key: Option<&str>) -> Result<Credential> {
    let request_key = request_key.map(str::trim).filter(|k| !k.is_empty());

    let credential = if let Some(key) = request_key {
        Credential::new(key, CredentialTier::Elevated)
    } else if let Some(key) = config.pro_api_key.as_deref() {
        Credential::new(key, CredentialTier::Elevated)
    } else if let Some(key) = config.api_key.as_deref() {
        Credential::new(key, CredentialTier::Standard)
    } else {
        return Err(Error::Config(
            "No Gemini API key configured. Set GEMINI_API_KEY or connect a key.".to_string(),
        ));
    };

    debug!(
        subsystem = "inference",
        component = "credentials",
        op = "resolve",
        tier = credential.tier().as_str(),
        from_request = request_key.is_some(),
        "Credential resolved"
    );
    Ok(credential)
}

/// A backend handle bound to a resolved credential.
#[derive(Clone)]
pub struct ResolvedBackend {
    pub backend: Arc<dyn InferenceBackend>,
    pub tier: CredentialTier,
}

/// Produces backend handles per request.
pub trait BackendProvider: Send + Sync {
    fn resolve(&self, request_key: Option<&str>) -> Result<ResolvedBackend>;
}

/// Provider for the Gemini backend. Holds configuration and a shared HTTP
/// connection pool, nothing credential-specific.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = GeminiBackend::build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl BackendProvider for GeminiProvider {
    fn resolve(&self, request_key: Option<&str>) -> Result<ResolvedBackend> {
        let credential = resolve_credential(&self.config, request_key)?;
        let tier = credential.tier();
        let backend = GeminiBackend::new(self.config.clone(), credential, self.client.clone());
        Ok(ResolvedBackend {
            backend: Arc::new(backend),
            tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(standard: Option<&str>, pro: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: standard.map(String::from),
            pro_api_key: pro.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_standard_key_only() {
        let credential = resolve_credential(&config(Some("std"), None), None).unwrap();
        assert_eq!(credential.api_key(), "std");
        assert_eq!(credential.tier(), CredentialTier::Standard);
    }

    #[test]
    fn test_pro_key_outranks_standard() {
        let credential = resolve_credential(&config(Some("std"), Some("pro")), None).unwrap();
        assert_eq!(credential.api_key(), "pro");
        assert!(credential.tier().is_elevated());
    }

    #[test]
    fn test_request_key_outranks_config() {
        let credential =
            resolve_credential(&config(Some("std"), Some("pro")), Some("mine")).unwrap();
        assert_eq!(credential.api_key(), "mine");
        assert_eq!(credential.tier(), CredentialTier::Elevated);
    }

    #[test]
    fn test_blank_request_key_is_ignored() {
        let credential = resolve_credential(&config(Some("std"), None), Some("  ")).unwrap();
        assert_eq!(credential.api_key(), "std");
    }

    #[test]
    fn test_no_key_is_config_error() {
        let err = resolve_credential(&config(None, None), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_credential_debug_redacts_key() {
        let credential = Credential::new("super-secret", CredentialTier::Standard);
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_provider_resolves_per_request_tiers() {
        let provider = GeminiProvider::new(config(Some("std"), None)).unwrap();
        assert_eq!(provider.resolve(None).unwrap().tier, CredentialTier::Standard);
        assert_eq!(
            provider.resolve(Some("mine")).unwrap().tier,
            CredentialTier::Elevated
        );
    }
}
