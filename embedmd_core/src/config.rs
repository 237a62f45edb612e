use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::EmbedError;
use crate::EmbedResult;
use crate::Mounts;
use crate::fetch::DEFAULT_TIMEOUT;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["embedmd.toml", ".embedmd.toml", ".config/embedmd.toml"];

/// Project configuration, usually read from `embedmd.toml`:
///
/// ```toml
/// [mounts]
/// otel = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-go/main"
///
/// [http]
/// timeout_secs = 10
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedConfig {
	/// Mount tokens and the prefix each one expands to. The leading `$` is
	/// optional in the file.
	#[serde(default)]
	pub mounts: BTreeMap<String, String>,
	#[serde(default)]
	pub http: HttpConfig,
}

/// Settings for remote content.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			timeout_secs: default_timeout_secs(),
		}
	}
}

impl HttpConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT.as_secs()
}

impl EmbedConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no candidate exists.
	pub fn load(root: &Path) -> EmbedResult<Option<EmbedConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load an explicitly named config file.
	pub fn load_file(path: &Path) -> EmbedResult<EmbedConfig> {
		let content = std::fs::read_to_string(path)?;
		let config: EmbedConfig =
			toml::from_str(&content).map_err(|e| EmbedError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %path.display(), mounts = config.mounts.len(), "loaded config");
		Ok(config)
	}

	/// The configured mounts in a form the embedder accepts.
	pub fn mounts(&self) -> Mounts {
		self.mounts.iter().collect()
	}
}
