use anyhow::{Result, bail};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    /// `None` leaves the decision to the chosen store.
    pub preload_sample_data: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        );

        let preload_sample_data = match std::env::var("PRELOAD_SAMPLE_DATA") {
            Ok(raw) => Some(parse_flag("PRELOAD_SAMPLE_DATA", &raw)?),
            Err(_) => None,
        };

        Ok(Self {
            cors_allowed_origins,
            preload_sample_data,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}
