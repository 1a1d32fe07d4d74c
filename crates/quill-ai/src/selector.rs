//! Provider selector: maps backend identifiers to configured adapters.
//!
//! The set of identifiers is closed. Display metadata lives in an
//! immutable [`ProviderCatalog`] built once and held by the selector.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::{anthropic, openai};
use crate::{AiError, AnthropicClient, ChatProvider, OpenAiClient, ProviderConfig};

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// Which backend serves a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::DeepSeek,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = AiError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AiError::UnsupportedProvider(wanted.to_string()))
    }
}

/// User-facing description of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    pub display_name: &'static str,
    pub default_model: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
}

/// Immutable metadata table for every supported backend.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    entries: BTreeMap<ProviderKind, ProviderMetadata>,
}

impl ProviderCatalog {
    pub fn builtin() -> Self {
        let entries = BTreeMap::from([
            (
                ProviderKind::Anthropic,
                ProviderMetadata {
                    display_name: "Anthropic Claude",
                    default_model: anthropic::DEFAULT_MODEL,
                    description: "Claude models via the Anthropic Messages API",
                    base_url: anthropic::DEFAULT_BASE_URL,
                },
            ),
            (
                ProviderKind::OpenAi,
                ProviderMetadata {
                    display_name: "OpenAI",
                    default_model: openai::OPENAI_DEFAULT_MODEL,
                    description: "GPT models via the OpenAI chat completions API",
                    base_url: openai::OPENAI_BASE_URL,
                },
            ),
            (
                ProviderKind::DeepSeek,
                ProviderMetadata {
                    display_name: "DeepSeek",
                    default_model: DEEPSEEK_DEFAULT_MODEL,
                    description: "DeepSeek models via an OpenAI-compatible endpoint",
                    base_url: DEEPSEEK_BASE_URL,
                },
            ),
        ]);
        Self { entries }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderMetadata> {
        self.entries.get(&kind)
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderKind, &ProviderMetadata)> {
        self.entries.iter().map(|(kind, meta)| (*kind, meta))
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builds adapters for supported backend identifiers.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelector {
    catalog: ProviderCatalog,
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Construct the adapter for `identifier`.
    pub fn create(
        &self,
        identifier: &str,
        config: ProviderConfig,
    ) -> Result<Arc<dyn ChatProvider>, AiError> {
        let kind: ProviderKind = identifier.parse()?;
        debug!(provider = %kind, model = ?config.model, "creating provider");

        let provider: Arc<dyn ChatProvider> = match kind {
            ProviderKind::Anthropic => Arc::new(AnthropicClient::new(config)?),
            ProviderKind::OpenAi => Arc::new(OpenAiClient::new(config)?),
            ProviderKind::DeepSeek => Arc::new(OpenAiClient::compatible(
                kind.id(),
                DEEPSEEK_DEFAULT_MODEL,
                DEEPSEEK_BASE_URL,
                config,
            )?),
        };
        Ok(provider)
    }

    pub fn supported_identifiers(&self) -> BTreeSet<&'static str> {
        ProviderKind::ALL.iter().map(|kind| kind.id()).collect()
    }

    pub fn is_supported(&self, candidate: &str) -> bool {
        candidate.parse::<ProviderKind>().is_ok()
    }

    pub fn metadata_for(&self, identifier: &str) -> Option<&ProviderMetadata> {
        let kind = identifier.parse().ok()?;
        self.catalog.get(kind)
    }
}
