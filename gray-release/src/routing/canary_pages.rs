use std::fs;
use std::path::Path;

use crate::{api::errors::GrayReleaseError, routing::path_normalizer::PATH_SEPARATOR};

/// Path prefixes of the pages that exist in both bundles. Loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanaryPageSet {
    prefixes: Vec<String>,
}

impl CanaryPageSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| prefix.as_ref().trim_start_matches(PATH_SEPARATOR).to_string())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self { prefixes }
    }

    /// Reads a JSON array of path prefixes.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<CanaryPageSet, GrayReleaseError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| GrayReleaseError::CanaryPages {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let prefixes: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| GrayReleaseError::CanaryPages {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let pages = CanaryPageSet::new(prefixes);
        tracing::info!(
            "loaded {} canary page prefixes from {}",
            pages.len(),
            path.display()
        );
        Ok(pages)
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// `path` must already have the canary prefix stripped.
    pub fn is_eligible(&self, path: &str) -> bool {
        let path = path.trim_start_matches(PATH_SEPARATOR);
        self.prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_prefix_matching() {
        let pages = CanaryPageSet::new(["pages/order", "/pages/user/"]);

        assert!(pages.is_eligible("pages/order/index"));
        assert!(pages.is_eligible("pages/orderDetail/index"));
        assert!(pages.is_eligible("/pages/user/profile"));
        assert!(!pages.is_eligible("pages/user"));
        assert!(!pages.is_eligible("pages/home/index"));
        assert_eq!(pages.prefixes(), ["pages/order", "pages/user/"]);
    }

    #[test]
    fn test_empty_set_has_no_eligible_pages() {
        let pages = CanaryPageSet::new(Vec::<String>::new());
        assert!(pages.is_empty());
        assert!(!pages.is_eligible("pages/order/index"));

        // an empty entry would match everything, so it is dropped
        let pages = CanaryPageSet::new(["", "/"]);
        assert!(pages.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["pages/order", "/pages/pay"]"#).unwrap();

        let pages = CanaryPageSet::from_json_file(file.path()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages.is_eligible("pages/pay/index"));
    }

    #[test]
    fn test_load_errors() {
        match CanaryPageSet::from_json_file("/definitely/not/here.json") {
            Err(GrayReleaseError::CanaryPages { path, .. }) => {
                assert_eq!(path, "/definitely/not/here.json")
            }
            other => panic!("Expected CanaryPages error, got {:?}", other),
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pages": "nope"}}"#).unwrap();
        assert!(matches!(
            CanaryPageSet::from_json_file(file.path()),
            Err(GrayReleaseError::CanaryPages { .. })
        ));
    }
}
