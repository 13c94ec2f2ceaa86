use std::env;
use std::path::PathBuf;

/// How startup reacts to a contract that cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Abort startup.
    Strict,
    /// Serve an empty contract and report not-ready.
    Lenient,
}

impl OperatingMode {
    pub fn from_env() -> Self {
        Self::parse(&env::var("TOOLFIT_MODE").unwrap_or_default())
    }

    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "strict" | "fail-fast" => Self::Strict,
            _ => Self::Lenient,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path to the OpenAPI contract (JSON) loaded at startup.
    pub openapi_spec_path: PathBuf,
    /// Content budget in characters for tool output.
    pub max_content_length: usize,
    /// Strings longer than this are candidates for field truncation.
    pub truncation_threshold: usize,
    pub shutdown_timeout_secs: u64,
    /// Request body cap for the truncation endpoints.
    pub max_body_bytes: usize,
    pub mode: OperatingMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5500,
            openapi_spec_path: PathBuf::from("./resources/openapi-spec.json"),
            max_content_length: 50_000,
            truncation_threshold: 100,
            shutdown_timeout_secs: 30,
            max_body_bytes: 50 * 1024 * 1024,
            mode: OperatingMode::Lenient,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `TOOLFIT_MODE=strict` makes a missing or unreadable contract fatal;
    /// any other value starts the service with an empty contract instead.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            openapi_spec_path: env::var("OPENAPI_SPEC")
                .map(PathBuf::from)
                .unwrap_or(defaults.openapi_spec_path),
            max_content_length: env::var("MAX_CONTENT_LENGTH")
                .unwrap_or_else(|_| defaults.max_content_length.to_string())
                .parse()?,
            truncation_threshold: env::var("TRUNCATION_THRESHOLD")
                .unwrap_or_else(|_| defaults.truncation_threshold.to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| defaults.shutdown_timeout_secs.to_string())
                .parse()?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| defaults.max_body_bytes.to_string())
                .parse()?,
            mode: OperatingMode::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_content_length == 0 {
            anyhow::bail!("MAX_CONTENT_LENGTH must be greater than zero");
        }
        if self.truncation_threshold == 0 {
            anyhow::bail!("TRUNCATION_THRESHOLD must be greater than zero");
        }
        Ok(())
    }
}
