use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Absent means in-memory storage.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub backup_api_key: Option<String>,
}

fn env_str(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            server: ServerConfig {
                host: env_str("SERVER_HOST", "127.0.0.1"),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                path: env_opt("DATABASE_PATH").map(PathBuf::from),
            },
            llm: LlmConfig {
                base_url: env_str("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: env_str("OPENAI_MODEL", "gpt-4o"),
                api_key: env_opt("OPENAI_API_KEY"),
                backup_api_key: env_opt("OPENAI_API_KEY_BACKUP"),
            },
        }
    }
}
