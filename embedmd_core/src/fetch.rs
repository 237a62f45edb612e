use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use ureq::Agent;
use ureq::http::Uri;

use crate::FetchError;

/// Default timeout for remote content.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of the bytes a command embeds.
///
/// `path_or_url` is either a forward-slash relative path, resolved against
/// `base_dir`, or an `http://` / `https://` url.
pub trait Fetcher {
	fn fetch(&self, base_dir: &Path, path_or_url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
	fn fetch(&self, base_dir: &Path, path_or_url: &str) -> Result<Vec<u8>, FetchError> {
		(**self).fetch(base_dir, path_or_url)
	}
}

/// Whether the target is fetched over the network.
pub fn is_url(path_or_url: &str) -> bool {
	path_or_url.starts_with("http://") || path_or_url.starts_with("https://")
}

/// Join a forward-slash relative path onto `base_dir` using the platform
/// separator.
pub fn resolve_local_path(base_dir: &Path, path: &str) -> PathBuf {
	let mut resolved = base_dir.to_path_buf();
	for segment in path.split('/').filter(|segment| !segment.is_empty()) {
		resolved.push(segment);
	}

	resolved
}

/// Reads local files relative to the base directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
	fn fetch(&self, base_dir: &Path, path: &str) -> Result<Vec<u8>, FetchError> {
		let resolved = resolve_local_path(base_dir, path);
		tracing::trace!(path = %resolved.display(), "reading local file");

		std::fs::read(&resolved).map_err(|e| {
			if e.kind() == ErrorKind::NotFound {
				FetchError::NotFound
			} else {
				FetchError::Io(e)
			}
		})
	}
}

/// Performs blocking GET requests. Any status other than 2xx is an error.
#[derive(Clone)]
pub struct HttpFetcher {
	agent: Agent,
}

impl HttpFetcher {
	pub fn new(timeout: Duration) -> Self {
		let agent = Agent::config_builder()
			.timeout_global(Some(timeout))
			.http_status_as_error(false)
			.build()
			.into();

		Self { agent }
	}
}

impl Default for HttpFetcher {
	fn default() -> Self {
		Self::new(DEFAULT_TIMEOUT)
	}
}

impl Fetcher for HttpFetcher {
	fn fetch(&self, _base_dir: &Path, url: &str) -> Result<Vec<u8>, FetchError> {
		let uri: Uri = url.parse().map_err(|e: ureq::http::uri::InvalidUri| {
			FetchError::InvalidUrl {
				url: url.to_string(),
				reason: e.to_string(),
			}
		})?;

		tracing::debug!(url, "fetching remote content");
		let response = self
			.agent
			.get(uri)
			.call()
			.map_err(|e| FetchError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::Status(status.to_string()));
		}

		let mut body = response.into_body();
		body.read_to_vec()
			.map_err(|e| FetchError::Http(e.to_string()))
	}
}

/// Dispatches urls to [`HttpFetcher`] and everything else to [`FileFetcher`].
#[derive(Clone, Default)]
pub struct DefaultFetcher {
	files: FileFetcher,
	http: HttpFetcher,
}

impl DefaultFetcher {
	pub fn new(timeout: Duration) -> Self {
		Self {
			files: FileFetcher,
			http: HttpFetcher::new(timeout),
		}
	}
}

impl Fetcher for DefaultFetcher {
	fn fetch(&self, base_dir: &Path, path_or_url: &str) -> Result<Vec<u8>, FetchError> {
		if is_url(path_or_url) {
			self.http.fetch(base_dir, path_or_url)
		} else {
			self.files.fetch(base_dir, path_or_url)
		}
	}
}
