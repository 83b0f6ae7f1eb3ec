use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub xai_api_key: String,
    pub xai_base_url: String,
    pub xai_model: String,
    pub llm_timeout_secs: u64,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .unwrap_or_else(|_| "sqlite://leads.db".to_string())
                .trim()
                .to_string(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            xai_api_key: std::env::var("XAI_API_KEY")
                .or_else(|_| std::env::var("GROK_API_KEY"))
                .map_err(|_| {
                    anyhow::anyhow!("XAI_API_KEY or GROK_API_KEY environment variable required")
                })
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("XAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            xai_base_url: std::env::var("XAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.x.ai/v1".to_string()),
            xai_model: std::env::var("XAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "grok-4-latest".to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LLM_TIMEOUT_SECS must be a whole number of seconds"))?,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        };

        config.validate()?;

        // Never log the API key
        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!("xAI Base URL: {}", config.xai_base_url);
        tracing::debug!("xAI Model: {}", config.xai_model);
        tracing::debug!("CORS origin: {}", config.cors_origin);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Checks the values that `from_env` cannot reject while parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!("DATABASE_URL must start with sqlite:");
        }
        if !self.xai_base_url.starts_with("http://") && !self.xai_base_url.starts_with("https://")
        {
            anyhow::bail!("XAI_BASE_URL must start with http:// or https://");
        }
        if self.llm_timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}
