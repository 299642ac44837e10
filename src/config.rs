use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Path to the model weights artifact.
    pub model_path: String,
    /// Path to the fitted scaler artifact.
    pub scaler_path: String,
    /// Currency label attached to predictions.
    pub currency: String,
    /// Optional file that receives a copy of every log line.
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: "modelo_lstm_acao.json".to_string(),
            scaler_path: "scaler.json".to_string(),
            currency: "USD".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            scaler_path: env::var("SCALER_PATH").unwrap_or(defaults.scaler_path),
            currency: env::var("CURRENCY")
                .ok()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.currency),
            log_file: env::var("LOG_FILE").ok().filter(|p| !p.trim().is_empty()),
        }
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
