//! Credential resolution for backend providers.
//!
//! Order: inline `api_key`, then the variable named by `api_key_env`,
//! then the conventional `<ID>_API_KEY`. Empty values are skipped.

use crate::schema::ProviderSettings;

/// Conventional environment variable for a provider id (`openai` → `OPENAI_API_KEY`).
pub fn default_env_var(id: &str) -> String {
    let upper: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{upper}_API_KEY")
}

/// Resolve the credential for `id` from settings and the process environment.
pub fn resolve_credential(id: &str, settings: &ProviderSettings) -> Option<String> {
    resolve_credential_with(id, settings, |name| std::env::var(name).ok())
}

/// Same as [`resolve_credential`] with an injectable environment lookup.
pub fn resolve_credential_with(
    id: &str,
    settings: &ProviderSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_empty = |value: String| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    if let Some(key) = settings.api_key.clone().and_then(non_empty) {
        return Some(key);
    }

    if let Some(var) = settings.api_key_env.as_deref() {
        if let Some(key) = lookup(var).and_then(non_empty) {
            return Some(key);
        }
    }

    lookup(&default_env_var(id)).and_then(non_empty)
}
