//! Base location and URL resolution
//!
//! Rules only ever look at same-origin URLs. The base location supplies both the
//! origin to compare against and the href that relative inputs resolve against.
//! It is passed explicitly to every call and never mutated.

use std::fmt;

use url::{Origin, Url};

use crate::RuleError;

/// The href a relative URL resolves against, usually the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parses an absolute href into a location
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::Location;
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// assert_eq!(location.origin().ascii_serialization(), "http://localhost");
    /// ```
    pub fn parse(href: &str) -> Result<Self, RuleError> {
        Url::parse(href)
            .map(Self::from)
            .map_err(|source| RuleError::InvalidUrl {
                input: href.to_string(),
                source,
            })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> Origin {
        self.url.origin()
    }

    /// Whether `url` shares this location's scheme, host and port
    ///
    /// Opaque origins (`javascript:`, `data:`, ...) are never same-origin.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin()
    }

    /// Resolves a string or URL into an absolute URL
    ///
    /// Strings follow relative-reference resolution against [`Location::href`]:
    /// absolute strings ignore the base, `//host/..` keeps the base scheme,
    /// `?query` and `#hash` keep the base path. Parsed URLs are returned as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::Location;
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// let url = location.resolve("./a/b?c=d").unwrap();
    /// assert_eq!(url.as_str(), "http://localhost/a/b?c=d");
    /// ```
    pub fn resolve<'a>(&self, input: impl Into<UrlLike<'a>>) -> Result<Url, RuleError> {
        match input.into() {
            UrlLike::Url(url) => Ok(url.clone()),
            UrlLike::Str(s) => self.url.join(s).map_err(|source| RuleError::InvalidUrl {
                input: s.to_string(),
                source,
            }),
        }
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href())
    }
}

/// Anything a rule can be matched against: a raw href or an already parsed URL
#[derive(Debug, Clone, Copy)]
pub enum UrlLike<'a> {
    Str(&'a str),
    Url(&'a Url),
}

impl<'a> From<&'a str> for UrlLike<'a> {
    fn from(s: &'a str) -> Self {
        UrlLike::Str(s)
    }
}

impl<'a> From<&'a String> for UrlLike<'a> {
    fn from(s: &'a String) -> Self {
        UrlLike::Str(s.as_str())
    }
}

impl<'a> From<&'a Url> for UrlLike<'a> {
    fn from(url: &'a Url) -> Self {
        UrlLike::Url(url)
    }
}
