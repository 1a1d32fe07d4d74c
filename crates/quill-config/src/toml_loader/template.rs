/// Default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Quill Configuration
# Only override what you want to change -- missing fields use defaults.

[provider]
# Backend used for new sessions: anthropic, openai, deepseek
default = "anthropic"

[session]
# system_prompt = "You are Quill, a creative writing assistant. ..."
# stream = true

[logging]
# tracing filter directive; RUST_LOG and --log-level take precedence
# level = "quill=info"

# Per-backend settings. Credentials are read from api_key, then the variable
# named by api_key_env, then <ID>_API_KEY (e.g. ANTHROPIC_API_KEY).

[providers.anthropic]
# model = "claude-sonnet-4-20250514"
# max_tokens = 4096       # 1-200000
# temperature = 0.7       # 0.0-2.0
# timeout_secs = 120      # 1-600
# base_url = "https://api.anthropic.com"

[providers.openai]
# model = "gpt-4o-mini"
# base_url = "https://api.openai.com/v1"

[providers.deepseek]
# model = "deepseek-chat"
# base_url = "https://api.deepseek.com"
"##
}
