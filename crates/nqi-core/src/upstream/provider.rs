//! Provider list construction.
//!
//! The list is built once from validated configuration: configured premium endpoints in
//! order, then the public fallback, which is always present.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Compiled-in public endpoint used when no valid override is configured.
pub const DEFAULT_PUBLIC_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Display name of the public fallback provider.
pub const DEFAULT_PUBLIC_RPC_NAME: &str = "Public RPC";

/// Whether a provider was explicitly configured or is the compiled-in public fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTier {
    Premium,
    Public,
}

impl ProviderTier {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Public => "public",
        }
    }
}

/// One endpoint being probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint_url: String,
    pub tier: ProviderTier,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, endpoint_url: impl Into<String>, tier: ProviderTier) -> Self {
        Self { name: name.into(), endpoint_url: endpoint_url.into(), tier }
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.tier == ProviderTier::Premium
    }
}

/// A configured premium endpoint, as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumProviderEntry {
    pub name: String,
    pub url: String,
}

/// `[providers]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Premium providers in display order.
    #[serde(default)]
    pub premium: Vec<PremiumProviderEntry>,

    /// Name of the public fallback (default: "Public RPC")
    #[serde(default = "default_public_name")]
    pub public_name: String,

    /// URL of the public fallback (default: Solana mainnet-beta)
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_public_name() -> String {
    DEFAULT_PUBLIC_RPC_NAME.to_string()
}
fn default_public_url() -> String {
    DEFAULT_PUBLIC_RPC_URL.to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            premium: Vec::new(),
            public_name: default_public_name(),
            public_url: default_public_url(),
        }
    }
}

/// Parses `raw` as an absolute `http`/`https` URL.
#[must_use]
pub fn parse_endpoint_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Ordered, immutable provider list for one snapshot.
#[derive(Debug, Clone)]
pub struct ProviderSet {
    providers: Vec<ProviderConfig>,
}

impl ProviderSet {
    /// Builds the list from configuration.
    ///
    /// Invalid or blank premium URLs and duplicate names are dropped, never rejected. An
    /// invalid public URL falls back to [`DEFAULT_PUBLIC_RPC_URL`].
    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let public_name = if config.public_name.trim().is_empty() {
            DEFAULT_PUBLIC_RPC_NAME.to_string()
        } else {
            config.public_name.trim().to_string()
        };

        let mut seen = HashSet::new();
        seen.insert(public_name.clone());

        let mut providers = Vec::with_capacity(config.premium.len() + 1);
        for entry in &config.premium {
            let name = entry.name.trim();
            if name.is_empty() {
                debug!("skipping premium provider with empty name");
                continue;
            }
            if parse_endpoint_url(&entry.url).is_none() {
                debug!(provider = name, "skipping premium provider with invalid url");
                continue;
            }
            if !seen.insert(name.to_string()) {
                warn!(provider = name, "skipping duplicate provider name");
                continue;
            }
            providers.push(ProviderConfig::new(name, entry.url.trim(), ProviderTier::Premium));
        }

        let public_url = if parse_endpoint_url(&config.public_url).is_some() {
            config.public_url.trim().to_string()
        } else {
            warn!("invalid public provider url, using compiled default");
            DEFAULT_PUBLIC_RPC_URL.to_string()
        };
        providers.push(ProviderConfig::new(public_name, public_url, ProviderTier::Public));

        Self { providers }
    }

    /// Builds a set from an explicit list, bypassing validation.
    #[must_use]
    pub fn from_providers(providers: Vec<ProviderConfig>) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    #[must_use]
    pub fn premium_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_premium()).count()
    }
}
