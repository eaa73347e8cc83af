use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use url::Url;

use super::{BackendKind, Detail};
use crate::safety::normalize_member_path;
use crate::stream::MemberStream;
use crate::{Error, FileHint, Result};

/// Backend for resource trees served over HTTP(S).
///
/// Members are resolved against the base URL and fetched with blocking GET
/// requests. Remote trees cannot be listed or scanned, so hints are recorded
/// as given rather than resolved.
#[derive(Debug)]
pub struct Http {
    base: Url,
    path: PathBuf,
    client: Client,
    used_hint: Option<String>,
}

impl Http {
    /// Creates a backend rooted at `location`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if `location` is not an absolute URL.
    pub fn open(location: &str, hint: &FileHint) -> Result<Self> {
        let mut base =
            Url::parse(location).map_err(|e| Error::InvalidUrl(format!("{location}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        log::debug!("http backend rooted at {}", base);
        Ok(Self {
            path: PathBuf::from(location),
            base,
            client: Client::builder().build()?,
            used_hint: hint.first().map(str::to_string),
        })
    }

    /// The base URL members are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn member_url(&self, member: &str) -> Result<Url> {
        let relative = normalize_member_path(member).ok_or_else(|| self.not_found(member))?;
        self.base
            .join(&relative)
            .map_err(|e| Error::InvalidUrl(format!("{relative}: {e}")))
    }

    fn not_found(&self, member: &str) -> Error {
        Error::NotFound {
            archive: self.path.clone(),
            member: member.to_string(),
        }
    }
}

impl Detail for Http {
    fn kind(&self) -> BackendKind {
        BackendKind::Http
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn open_member(&self, member: &str) -> Result<MemberStream> {
        let url = self.member_url(member)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.not_found(member));
        }
        let response = response.error_for_status()?;
        Ok(MemberStream::sequential(member, response))
    }

    fn exists(&self, member: &str) -> bool {
        let Ok(url) = self.member_url(member) else {
            return false;
        };
        match self.client.head(url).send() {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::debug!("HEAD {} failed: {}", member, e);
                false
            }
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        Err(Error::Unsupported {
            operation: "listing",
            backend: "http",
        })
    }

    fn find_file(&self, _filename: &str) -> Option<String> {
        None
    }

    fn apply_hint(&mut self, hint: &FileHint) -> Result<()> {
        self.used_hint = hint.first().map(str::to_string);
        Ok(())
    }

    fn used_hint(&self) -> Option<String> {
        self.used_hint.clone()
    }

    fn changed(&self) -> bool {
        false
    }

    fn handles_schema(&self, schema: &str) -> bool {
        matches!(schema, "http" | "https")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_gets_trailing_slash() {
        let backend = Http::open("http://localhost:1/data", &FileHint::default()).unwrap();
        assert_eq!(backend.base().as_str(), "http://localhost:1/data/");
        assert_eq!(
            backend.member_url("tiles/0.bin").unwrap().as_str(),
            "http://localhost:1/data/tiles/0.bin"
        );
    }

    #[test]
    fn test_member_cannot_escape_base() {
        let backend = Http::open("http://localhost:1/data/", &FileHint::default()).unwrap();
        assert!(backend.member_url("../secret").unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_url() {
        let err = Http::open("not a url", &FileHint::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_hint_is_recorded_and_listing_unsupported() {
        let mut backend =
            Http::open("https://example.invalid/", &FileHint::single("a.json")).unwrap();
        assert_eq!(backend.used_hint().as_deref(), Some("a.json"));
        backend.apply_hint(&FileHint::new(["b.json", "c.json"])).unwrap();
        assert_eq!(backend.used_hint().as_deref(), Some("b.json"));
        assert!(matches!(backend.list(), Err(Error::Unsupported { .. })));
        assert_eq!(backend.find_file("b.json"), None);
        assert!(!backend.changed());
        assert!(backend.handles_schema("https"));
        assert!(!backend.directio());
    }
}
