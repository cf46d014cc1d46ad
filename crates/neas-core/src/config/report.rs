//! Document-generation service configuration.

use serde::{Deserialize, Serialize};

/// Where the serverless PDF report function lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Endpoint path relative to the backend URL, or an absolute URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Directory reports are written to by the CLI.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_endpoint() -> String {
    "/functions/v1/generate-report".to_string()
}

fn default_output_dir() -> String {
    "reports".to_string()
}
