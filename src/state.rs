use crate::config::{Config, OperatingMode};
use crate::error::Result;
use crate::schema::{normalize_document, SchemaDocument};
use crate::tools::ToolCatalog;
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// The contract and the tools derived from it are normalized once here and
/// never mutated afterwards, so handlers read them without locking.
pub struct AppState {
    pub schema: Arc<SchemaDocument>,
    pub tools: Arc<ToolCatalog>,
    /// Whether `schema` came from a contract file or is the empty stand-in
    pub contract_loaded: bool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load, normalize and index the contract named by `config`.
    ///
    /// In strict mode a contract that cannot be loaded is an error. Otherwise
    /// the service comes up with an empty contract and stays not-ready.
    pub fn new(config: Config) -> Result<Self> {
        match SchemaDocument::load(&config.openapi_spec_path) {
            Ok(document) => Ok(Self::from_document(config, document)),
            Err(e) if config.mode == OperatingMode::Strict => Err(e),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %config.openapi_spec_path.display(),
                    "Starting without an OpenAPI contract"
                );
                Ok(Self::unloaded(config))
            }
        }
    }

    /// Normalize `document` and build state around it.
    pub fn from_document(config: Config, mut document: SchemaDocument) -> Self {
        let report = normalize_document(&mut document);
        let tools = ToolCatalog::from_document(&document);

        tracing::info!(
            refs_inlined = report.resolve.inlined,
            cycles = report.resolve.cycles,
            unresolved = report.resolve.unresolved,
            array_responses_stripped = report.array_responses_stripped,
            tools = tools.len(),
            "OpenAPI contract normalized"
        );

        Self {
            schema: Arc::new(document),
            tools: Arc::new(tools),
            contract_loaded: true,
            config: Arc::new(config),
        }
    }

    fn unloaded(config: Config) -> Self {
        Self {
            schema: Arc::new(SchemaDocument::empty()),
            tools: Arc::new(ToolCatalog::default()),
            contract_loaded: false,
            config: Arc::new(config),
        }
    }

    /// Check if the contract is loaded and tools are available.
    pub fn is_ready(&self) -> bool {
        self.contract_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::path::PathBuf;

    fn missing_contract(mode: OperatingMode) -> Config {
        Config {
            openapi_spec_path: PathBuf::from("/nonexistent/openapi.json"),
            mode,
            ..Config::default()
        }
    }

    #[test]
    fn test_lenient_mode_starts_unready() {
        let state = AppState::new(missing_contract(OperatingMode::Lenient)).unwrap();
        assert!(!state.is_ready());
        assert!(state.tools.is_empty());
    }

    #[test]
    fn test_document_state_is_ready_with_tools() {
        let document = SchemaDocument::from_value(serde_json::json!({
            "paths": { "/ping": { "get": { "operationId": "ping" } } }
        }))
        .unwrap();

        let state = AppState::from_document(Config::default(), document);

        assert!(state.contract_loaded);
        assert!(state.is_ready());
        assert!(state.tools.get("ping").is_some());
    }

    #[test]
    fn test_strict_mode_fails() {
        let result = AppState::new(missing_contract(OperatingMode::Strict));
        assert!(matches!(result, Err(AppError::SchemaError(_))));
    }
}
