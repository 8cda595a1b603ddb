//! Post reference parsing.
//!
//! A post reference is the canonical identifier extracted from a post link
//! of the form `https://www.instagram.com/p/<token>/`. The token is taken
//! verbatim; no length or character-set validation is applied.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a post link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostReferenceError {
    /// Input does not contain a `/p/<token>` path segment
    #[error("Invalid post URL: {0}")]
    InvalidReference(String),
}

/// A parsed post link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostReference {
    raw_url: String,
    post_id: String,
}

impl PostReference {
    /// Parse a post link. See [`parse_post_reference`].
    pub fn parse(url: &str) -> Result<Self, PostReferenceError> {
        parse_post_reference(url)
    }

    /// The URL exactly as supplied by the caller.
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// The post identifier extracted from the URL.
    pub fn post_id(&self) -> &str {
        &self.post_id
    }
}

impl fmt::Display for PostReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.post_id)
    }
}

fn post_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/p/([^/?]+)").expect("post path pattern is valid"))
}

/// Extract the post identifier from a post link.
///
/// The first `/p/<token>` segment wins, where `<token>` runs up to the next
/// `/` or `?`. Anything else fails with [`PostReferenceError::InvalidReference`].
pub fn parse_post_reference(url: &str) -> Result<PostReference, PostReferenceError> {
    let post_id = post_path_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PostReferenceError::InvalidReference(url.to_string()))?;

    Ok(PostReference {
        raw_url: url.to_string(),
        post_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_reference_success_cases() {
        // Canonical link
        let post = parse_post_reference("https://www.instagram.com/p/C8xYz12AbCd/").unwrap();
        assert_eq!(post.post_id(), "C8xYz12AbCd");
        assert_eq!(post.raw_url(), "https://www.instagram.com/p/C8xYz12AbCd/");

        // Without trailing slash
        assert_eq!(
            parse_post_reference("https://instagram.com/p/C8xYz12AbCd")
                .unwrap()
                .post_id(),
            "C8xYz12AbCd"
        );

        // With share query parameters
        assert_eq!(
            parse_post_reference("https://www.instagram.com/p/C8xYz12AbCd/?igsh=MWQ1ZGUxMzBk")
                .unwrap()
                .post_id(),
            "C8xYz12AbCd"
        );

        // Query directly after the token
        assert_eq!(
            parse_post_reference("https://www.instagram.com/p/C8xYz12AbCd?img_index=2")
                .unwrap()
                .post_id(),
            "C8xYz12AbCd"
        );

        // Tokens are taken verbatim
        assert_eq!(
            parse_post_reference("https://www.instagram.com/p/a-b_c.d/")
                .unwrap()
                .post_id(),
            "a-b_c.d"
        );
    }

    #[test]
    fn test_parse_post_reference_error_cases() {
        for input in [
            "",
            "not a url",
            "https://www.instagram.com/",
            "https://www.instagram.com/p/",
            "https://www.instagram.com/p/?x=1",
            "https://www.instagram.com/reel/C8xYz12AbCd/",
            "https://www.instagram.com/explore/tags/cars/",
        ] {
            assert_eq!(
                parse_post_reference(input),
                Err(PostReferenceError::InvalidReference(input.to_string())),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_post_reference_display_is_post_id() {
        let post = PostReference::parse("https://www.instagram.com/p/XYZ/").unwrap();
        assert_eq!(post.to_string(), "XYZ");
    }
}
