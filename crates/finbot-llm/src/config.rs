//! Provider configuration, read from the environment once at
//! construction time
//!
//! A missing credential never fails construction; it makes the
//! provider report itself unavailable so the failover chain can move
//! on.

/// Default instruction text used when the caller supplies no system
/// prompt. Injectable through [`AiManager::with_system_prompt`];
/// deployments override it with their domain prompt.
///
/// [`AiManager::with_system_prompt`]: crate::manager::AiManager::with_system_prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn env_opt(key: &str) -> Option<String> {
    // Best-effort .env load, ignore errors
    let _ = dotenvy::dotenv();
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Configuration for the DeepSeek provider
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl DeepSeekConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("DEEPSEEK_API_KEY"),
            base_url: env_opt("FINBOT_DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
            model: env_opt("FINBOT_DEEPSEEK_MODEL")
                .unwrap_or_else(|| "deepseek-chat".to_string()),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Configuration for the OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("OPENAI_API_KEY"),
            base_url: env_opt("FINBOT_OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: env_opt("FINBOT_OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Configuration for the Claude provider
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl ClaudeConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("ANTHROPIC_API_KEY"),
            base_url: env_opt("FINBOT_CLAUDE_BASE_URL")
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: env_opt("FINBOT_CLAUDE_MODEL")
                .unwrap_or_else(|| "claude-3-5-sonnet-20241022".to_string()),
            max_tokens: 1024,
        }
    }
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
