//! Image domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a container image as requested by a deployment
///
/// Usually a digest reference (`registry/repo@sha256:...`), which lets the
/// pipeline detect that the exact image is already present. Tag references
/// are accepted as well but never match an existing image digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageReference(String);

/// Error returned when parsing an image reference fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidImageReference {
    #[error("image reference cannot be empty")]
    Empty,
    #[error("image reference cannot contain whitespace")]
    Whitespace,
    #[error("image reference has an empty digest")]
    EmptyDigest,
    #[error("image reference has an empty repository name")]
    EmptyName,
    #[error("image reference contains more than one '@'")]
    MultipleDigests,
    #[error("image name must start with a letter or digit")]
    InvalidName,
}

impl ImageReference {
    /// Parses and validates an image reference
    pub fn parse(reference: impl Into<String>) -> Result<Self, InvalidImageReference> {
        let reference = reference.into();
        let trimmed = reference.trim();

        if trimmed.is_empty() {
            return Err(InvalidImageReference::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidImageReference::Whitespace);
        }
        if trimmed.matches('@').count() > 1 {
            return Err(InvalidImageReference::MultipleDigests);
        }
        if trimmed.ends_with('@') {
            return Err(InvalidImageReference::EmptyDigest);
        }

        let name = trimmed.split('@').next().unwrap_or_default();
        match name.chars().next() {
            None => return Err(InvalidImageReference::EmptyName),
            // A leading `-` would reach the runtime CLI as a flag
            Some(first) if !first.is_ascii_alphanumeric() => {
                return Err(InvalidImageReference::InvalidName);
            }
            Some(_) => {}
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The full reference as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The image name without the digest part
    ///
    /// `ghcr.io/acme/api@sha256:abc` becomes `ghcr.io/acme/api`.
    pub fn name(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    /// The digest part, if this is a digest reference
    pub fn digest(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, digest)| digest)
    }

    /// Whether the image name starts with the given allow-list prefix
    pub fn is_allowed_by(&self, prefix: &str) -> bool {
        self.name().starts_with(prefix)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ImageReference {
    type Error = InvalidImageReference;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ImageReference> for String {
    fn from(value: ImageReference) -> Self {
        value.0
    }
}

/// A locally present image as reported by the container runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub repo_digests: Vec<String>,
}

impl ImageSummary {
    /// Whether this image is exactly the referenced digest
    pub fn matches(&self, reference: &ImageReference) -> bool {
        self.repo_digests
            .iter()
            .any(|digest| digest == reference.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST_REF: &str = "ghcr.io/acme/api@sha256:0f3e9a";

    #[test]
    fn test_parse_digest_reference() {
        let image = ImageReference::parse(DIGEST_REF).unwrap();
        assert_eq!(image.name(), "ghcr.io/acme/api");
        assert_eq!(image.digest(), Some("sha256:0f3e9a"));
        assert_eq!(image.to_string(), DIGEST_REF);
    }

    #[test]
    fn test_parse_tag_reference_has_no_digest() {
        let image = ImageReference::parse("nginx:1.27").unwrap();
        assert_eq!(image.name(), "nginx:1.27");
        assert_eq!(image.digest(), None);
    }

    #[test]
    fn test_parse_rejects_invalid_input() {
        assert_eq!(
            ImageReference::parse("   "),
            Err(InvalidImageReference::Empty)
        );
        assert_eq!(
            ImageReference::parse("nginx latest"),
            Err(InvalidImageReference::Whitespace)
        );
        assert_eq!(
            ImageReference::parse("nginx@"),
            Err(InvalidImageReference::EmptyDigest)
        );
        assert_eq!(
            ImageReference::parse("@sha256:abc"),
            Err(InvalidImageReference::EmptyName)
        );
        assert_eq!(
            ImageReference::parse("a@b@c"),
            Err(InvalidImageReference::MultipleDigests)
        );
        assert_eq!(
            ImageReference::parse(":tag"),
            Err(InvalidImageReference::InvalidName)
        );
        assert_eq!(
            ImageReference::parse("/acme/api@sha256:abc"),
            Err(InvalidImageReference::InvalidName)
        );
        assert_eq!(
            ImageReference::parse("--help"),
            Err(InvalidImageReference::InvalidName)
        );
    }

    #[test]
    fn test_parse_accepts_registry_with_port() {
        let image = ImageReference::parse("localhost:5000/api@sha256:abc").unwrap();
        assert_eq!(image.name(), "localhost:5000/api");
    }

    #[test]
    fn test_allow_list_prefix() {
        let image = ImageReference::parse(DIGEST_REF).unwrap();
        assert!(image.is_allowed_by("ghcr.io/acme/"));
        assert!(!image.is_allowed_by("docker.io/"));
    }

    #[test]
    fn test_summary_matches_exact_digest_only() {
        let image = ImageReference::parse(DIGEST_REF).unwrap();
        let present = ImageSummary {
            id: "sha256:1111".to_string(),
            repo_digests: vec![DIGEST_REF.to_string()],
        };
        let other = ImageSummary {
            id: "sha256:2222".to_string(),
            repo_digests: vec!["ghcr.io/acme/api@sha256:ffff".to_string()],
        };

        assert!(present.matches(&image));
        assert!(!other.matches(&image));
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Result<ImageReference, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());

        let parsed: ImageReference = serde_json::from_str(&format!("\"{}\"", DIGEST_REF)).unwrap();
        assert_eq!(parsed.as_str(), DIGEST_REF);
    }
}
