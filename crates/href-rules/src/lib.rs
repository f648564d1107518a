//! # href-rules
//!
//! Bidirectional URL rules. One declarative [`Rule`] both recognises URLs and
//! builds them:
//! - Path templates (`/users/:id`, `/:type(checking|saving)/:id`, `/:name?`)
//! - Query value templates (`from = ":fromDate([0-9-]+)"`)
//! - A condition for checks the templates cannot express
//!
//! ## Matching
//!
//! [`match_url`] resolves the input against a base [`Location`], rejects other
//! origins, then runs the path and query templates. Path matching is
//! case-insensitive and tolerates one trailing slash. `%2F` inside a segment
//! stays part of that segment.
//!
//! ## Generation
//!
//! [`to_href`] fills the templates from a parameter map, percent-encoding every
//! value, and emits query pairs in ascending name order. Missing required
//! values, values that break their pattern and condition rejections are errors.
//!
//! ## Example
//!
//! ```
//! use href_rules::{match_url, to_href, params_from_pairs, Location, Rule};
//!
//! let location = Location::parse("http://localhost/").unwrap();
//! let rule = Rule::new()
//!     .with_path("/:accType(checking|saving|credit)/:accId/:accName([^$]+)?");
//!
//! let matched = match_url(&rule, &location, "/saving/123/My%20Savings").unwrap();
//! assert_eq!(matched.param("accName"), Some("My Savings"));
//!
//! let href = to_href(&rule, &location, &params_from_pairs(&[
//!     ("accType", "saving"),
//!     ("accId", "abcdef"),
//! ])).unwrap();
//! assert_eq!(href, "/saving/abcdef");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod codec;
pub mod config;
mod error;
mod href;
mod location;
mod matching;
mod params;
mod rule;
pub mod template;

pub use config::RouterConfig;
pub use error::RuleError;
pub use location::{Location, UrlLike};
pub use params::{params_from, params_from_pairs, Match, Params};
pub use rule::{CompiledRule, Condition, Rule};

// ============================================================================
// Entry Points
// ============================================================================

/// Tests `url` against `rule`
///
/// Returns `None` for other origins, path or query mismatches and condition
/// rejections. Never fails.
pub fn match_url<'a>(
    rule: &Rule,
    location: &Location,
    url: impl Into<UrlLike<'a>>,
) -> Option<Match> {
    rule.matches(location, url)
}

/// Generates the href `rule` describes for `params`
///
/// Extra entries in `params` are ignored.
pub fn to_href(rule: &Rule, location: &Location, params: &Params) -> Result<String, RuleError> {
    rule.to_href(location, params)
}
