use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_api_key: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub openai_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub llm_retry_base_delay_ms: u64,
    pub chat_history_limit: usize,
    pub session_idle_timeout_secs: u64,
    pub redis_url: Option<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_api_key: String::new(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_temperature: 0.7,
            openai_timeout_secs: 30,
            llm_max_attempts: 3,
            llm_retry_base_delay_ms: 1000,
            chat_history_limit: 20,
            session_idle_timeout_secs: 1800,
            redis_url: None,
            port: 8000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, falling back to the in-memory store");
                    String::new()
                }),
            supabase_api_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            openai_api_key: env::var("OPENAI_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("OPENAI_API_KEY not set, chat replies will use the fallback text");
                    String::new()
                }),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or(defaults.openai_model),
            openai_temperature: parse_or("OPENAI_TEMPERATURE", defaults.openai_temperature),
            openai_timeout_secs: parse_or("OPENAI_TIMEOUT_SECS", defaults.openai_timeout_secs),
            llm_max_attempts: parse_or("LLM_MAX_ATTEMPTS", defaults.llm_max_attempts),
            llm_retry_base_delay_ms: parse_or("LLM_RETRY_BASE_DELAY_MS", defaults.llm_retry_base_delay_ms),
            chat_history_limit: parse_or("CHAT_HISTORY_LIMIT", defaults.chat_history_limit),
            session_idle_timeout_secs: parse_or("CHAT_SESSION_IDLE_SECS", defaults.session_idle_timeout_secs),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            port: parse_or("PORT", defaults.port),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - records will only live in process memory");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_api_key.is_empty()
    }

    pub fn is_llm_configured(&self) -> bool {
        !self.openai_api_key.is_empty() && !self.openai_base_url.is_empty()
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
