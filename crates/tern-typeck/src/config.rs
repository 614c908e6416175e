use serde::Deserialize;
use std::path::Path;

/// Checker settings, usually read from a `tern.toml` file.
///
/// Every key is optional:
///
/// ```toml
/// [solver]
/// max_passes = 10000
///
/// [diagnostics]
/// color = false
/// filename = "main.tn"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TypeckConfig {
    pub solver: SolverConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// The `[solver]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on solver passes over one queue.
    pub max_passes: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { max_passes: 10_000 }
    }
}

/// The `[diagnostics]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Emit ANSI colors in rendered reports.
    pub color: bool,
    /// Source name shown in rendered reports.
    pub filename: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig {
            color: false,
            filename: "<input>".to_string(),
        }
    }
}

impl TypeckConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<TypeckConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<TypeckConfig, String> {
        let config: TypeckConfig =
            toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))?;
        if config.solver.max_passes == 0 {
            return Err("Failed to parse config: solver.max_passes must be at least 1".to_string());
        }
        Ok(config)
    }
}
