//! Base URLs for the hosted services and `file://` object links.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, InvalidInputError};

/// Hosts allowed to speak plain HTTP: local emulators and test servers.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Where a service lives, or where a stored object sits on disk.
///
/// Remote services must be reached over HTTPS; loopback hosts may use HTTP.
/// `file://` URLs are produced by the filesystem backend for stored images.
///
/// ```
/// use diabeto_core::ServiceUrl;
///
/// let api = ServiceUrl::new("https://api.openai.com/").unwrap();
/// assert_eq!(api.join("v1/chat/completions"), "https://api.openai.com/v1/chat/completions");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let reject = |reason: &str| InvalidInputError::ServiceUrl {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(s).map_err(|e| reject(&e.to_string()))?;
        match url.scheme() {
            "https" if url.host_str().is_some() => {}
            "http" if url.host_str().is_some_and(|h| LOOPBACK_HOSTS.contains(&h)) => {}
            "http" | "https" => {
                return Err(reject("plain HTTP is only allowed for localhost").into());
            }
            "file" => {}
            other => return Err(reject(&format!("unsupported scheme '{other}'")).into()),
        }
        Ok(Self(url))
    }

    /// Link to a file written by the filesystem backend.
    pub fn from_file_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        Url::from_file_path(path).map(Self).map_err(|()| {
            InvalidInputError::ServiceUrl {
                value: path.display().to_string(),
                reason: "path must be absolute".to_string(),
            }
            .into()
        })
    }

    /// `path` below this base, with exactly one slash between them.
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The on-disk location of a `file://` URL.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        match self.0.scheme() {
            "file" => self.0.to_file_path().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_endpoints_accepted() {
        for base in [
            "https://identitytoolkit.googleapis.com",
            "https://firebasestorage.googleapis.com",
            "http://127.0.0.1:9099",
            "http://localhost:8080",
        ] {
            assert!(ServiceUrl::new(base).is_ok(), "{base}");
        }
    }

    #[test]
    fn insecure_or_odd_urls_rejected() {
        assert!(ServiceUrl::new("http://api.openai.com").is_err());
        assert!(ServiceUrl::new("/v1/chat").is_err());
        assert!(ServiceUrl::new("ftp://example.com").is_err());
        assert!(ServiceUrl::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn join_handles_slashes() {
        let url = ServiceUrl::new("https://api.openai.com/").unwrap();
        assert_eq!(
            url.join("/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn join_keeps_base_path() {
        let url = ServiceUrl::new("http://localhost:8080/emulator").unwrap();
        assert_eq!(
            url.join("v1/accounts:signUp"),
            "http://localhost:8080/emulator/v1/accounts:signUp"
        );
    }

    #[cfg(unix)]
    #[test]
    fn stored_object_links_resolve_to_disk() {
        let url = ServiceUrl::from_file_path("/tmp/diabeto/objects/a.jpg").unwrap();
        assert_eq!(url.to_string(), "file:///tmp/diabeto/objects/a.jpg");
        assert_eq!(
            ServiceUrl::new(url.as_str()).unwrap().to_file_path(),
            Some(PathBuf::from("/tmp/diabeto/objects/a.jpg"))
        );
    }

    #[test]
    fn relative_file_path_rejected() {
        assert!(ServiceUrl::from_file_path("relative/path").is_err());
    }

    #[test]
    fn network_url_has_no_file_path() {
        let url = ServiceUrl::new("https://firebasestorage.googleapis.com").unwrap();
        assert!(url.to_file_path().is_none());
    }
}
