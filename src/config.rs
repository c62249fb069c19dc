use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub jsonapi_endpoint: String,
    pub api_timeout_ms: u64,
    pub with_credentials: bool,
    pub api_username: Option<String>,
    pub api_password: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_base_url: std::env::var("API_BASE_URL")
                .map_err(|_| anyhow::anyhow!("API_BASE_URL environment variable required"))
                .and_then(|base| {
                    let base = base.trim().trim_end_matches('/').to_string();
                    if base.is_empty() {
                        anyhow::bail!("API_BASE_URL cannot be empty");
                    }
                    if !base.starts_with("http://") && !base.starts_with("https://") {
                        anyhow::bail!("API_BASE_URL must start with http:// or https://");
                    }
                    // Catch malformed hosts at startup rather than on the first request
                    url::Url::parse(&base)
                        .map_err(|e| anyhow::anyhow!("API_BASE_URL is not a valid URL: {}", e))?;
                    Ok(base)
                })?,
            jsonapi_endpoint: {
                let path = std::env::var("JSONAPI_ENDPOINT")
                    .unwrap_or_else(|_| "/jsonapi".to_string())
                    .trim()
                    .trim_end_matches('/')
                    .to_string();
                if !path.starts_with('/') {
                    anyhow::bail!("JSONAPI_ENDPOINT must start with /");
                }
                path
            },
            api_timeout_ms: std::env::var("API_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_TIMEOUT_MS must be a positive integer"))
                .and_then(|ms: u64| {
                    if ms == 0 {
                        anyhow::bail!("API_TIMEOUT_MS must be greater than zero");
                    }
                    Ok(ms)
                })?,
            with_credentials: std::env::var("WITH_CREDENTIALS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            api_username: std::env::var("API_USERNAME")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            api_password: std::env::var("API_PASSWORD")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
        };

        if config.with_credentials
            && (config.api_username.is_none() || config.api_password.is_none())
        {
            anyhow::bail!("WITH_CREDENTIALS=true requires API_USERNAME and API_PASSWORD");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("API Base URL: {}", config.api_base_url);
        tracing::debug!("JSON:API endpoint: {}", config.jsonapi_endpoint);
        tracing::debug!("Request timeout: {}ms", config.api_timeout_ms);
        tracing::debug!("Attach credentials: {}", config.with_credentials);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Root of the document API: base URL plus the JSON:API path.
    pub fn api_root(&self) -> String {
        format!("{}{}", self.api_base_url, self.jsonapi_endpoint)
    }
}
