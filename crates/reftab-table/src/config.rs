use serde::{Deserialize, Serialize};

use crate::error::TableResult;

/// Catalog-wide settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Treat every `init` as forced, replacing an existing registry.
    pub force_by_default: bool,
    /// Pretty-print documents produced through [`CatalogConfig::export_options`].
    pub pretty_documents: bool,
}

impl CatalogConfig {
    /// Parse a TOML fragment. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> TableResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Export options derived from this configuration.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            pretty: self.pretty_documents,
            ..ExportOptions::default()
        }
    }
}

/// Options for [`Table::init`](crate::Table::init).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Replace the registry even if the table was initialized before.
    pub force: bool,
}

impl InitOptions {
    /// Options that bypass the re-initialization guard.
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// Options for writing table documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Write the `table_name` key.
    pub include_table_name: bool,
    /// Indent the JSON output.
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_table_name: true,
            pretty: false,
        }
    }
}

impl ExportOptions {
    /// Defaults, without the `table_name` key.
    pub fn anonymous() -> Self {
        Self {
            include_table_name: false,
            ..Self::default()
        }
    }
}
