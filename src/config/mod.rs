use std::env;
use std::path::PathBuf;

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_JARVIS_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Session tokens issued by the auth provider (HS256). None → every request is anonymous.
    pub session_jwt_secret: Option<String>,

    // Jarvis / LLM
    pub openai_api_key: Option<String>,
    pub jarvis_model: String,
    pub jarvis_max_tokens: u32,
    pub llm_base_url: String,

    // Local-device fallback for watchlist and stock notes
    pub device_store_dir: PathBuf,

    // Journal
    pub journal_autosave_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            session_jwt_secret: non_empty(env::var("SESSION_JWT_SECRET").ok()),

            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            jarvis_model: env::var("JARVIS_MODEL").unwrap_or_else(|_| DEFAULT_JARVIS_MODEL.into()),
            jarvis_max_tokens: env::var("JARVIS_MAX_TOKENS")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1000),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.into()),

            device_store_dir: env::var("DEVICE_STORE_DIR")
                .unwrap_or_else(|_| "./device-store".into())
                .into(),

            journal_autosave_ms: env::var("JOURNAL_AUTOSAVE_MS")
                .unwrap_or_else(|_| "2000".into())
                .parse()
                .unwrap_or(2000),
        })
    }

    /// Returns true if session tokens can be verified.
    pub fn has_session_auth(&self) -> bool {
        self.session_jwt_secret.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
