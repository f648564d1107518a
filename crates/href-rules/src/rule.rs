//! Rules: declarative path + query + condition descriptions
//!
//! A [`Rule`] only holds template text. [`Rule::compile`] turns it into a
//! [`CompiledRule`] that can be matched and generated against repeatedly.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::template::{Generator, GeneratorOptions, Matcher, MatcherOptions};
use crate::{params_from, params_from_pairs, Location, Match, Params, RuleError, UrlLike};

/// Cross-field check run on a match (or on the params of a generated href)
pub type Condition = fn(&Match) -> bool;

/// Describes a family of URLs
///
/// - `path`: path template; `None` (or empty) accepts any path
/// - `search`: query parameter name → value template
/// - `condition`: extra predicate over the resolved [`Match`]
///
/// # Examples
///
/// ```
/// use href_rules::{Location, Rule, params_from_pairs};
///
/// let location = Location::parse("http://localhost/").unwrap();
/// let rule = Rule::new()
///     .with_path("/:accType(checking|saving|credit)/:accId")
///     .with_search("from", ":fromDate?");
///
/// let matched = rule.matches(&location, "/saving/123?from=2020-01-01").unwrap();
/// assert_eq!(matched.param("accType"), Some("saving"));
/// assert_eq!(matched.param("fromDate"), Some("2020-01-01"));
///
/// let href = rule
///     .to_href(&location, &params_from_pairs(&[("accType", "credit"), ("accId", "9")]))
///     .unwrap();
/// assert_eq!(href, "/credit/9");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub path: Option<String>,
    pub search: BTreeMap<String, String>,
    pub condition: Option<Condition>,
}

impl Rule {
    /// Creates a rule with no constraints: it matches every same-origin URL
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Functional Builder Methods
    // ========================================================================

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a query parameter whose value must satisfy `template`
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::Rule;
    ///
    /// let rule = Rule::new()
    ///     .with_search("page", ":pageNumber([0-9]+)?")
    ///     .with_search("from", ":fromDate");
    /// assert_eq!(rule.search.len(), 2);
    /// ```
    pub fn with_search(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.search.insert(name.into(), template.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Path template with an empty template treated as absent
    pub fn path_template(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| !path.is_empty())
    }

    /// Compiles every template of this rule
    ///
    /// The matching side compiles the path with one trailing `/` removed, so
    /// `/a/b/c` and `/a/b/c/` accept the same URLs. The generating side keeps
    /// the template as written and trims the output instead.
    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        let path = match self.path_template() {
            Some(template) => {
                let trimmed = template.strip_suffix('/').unwrap_or(template);
                Some(CompiledTemplate {
                    matcher: Matcher::compile(trimmed, MatcherOptions::path())?,
                    generator: Generator::compile(template, GeneratorOptions::path())?,
                })
            }
            None => None,
        };

        let search = self
            .search
            .iter()
            .map(|(name, template)| {
                Ok(SearchEntry {
                    name: name.clone(),
                    template: CompiledTemplate {
                        matcher: Matcher::compile(template, MatcherOptions::query_value())?,
                        generator: Generator::compile(template, GeneratorOptions::query_value())?,
                    },
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(CompiledRule {
            path,
            search,
            condition: self.condition,
        })
    }

    /// Tests a URL against this rule
    ///
    /// Compiles on every call; use [`Rule::compile`] to match many URLs.
    /// A broken template never matches and is reported as a warning.
    pub fn matches<'a>(&self, location: &Location, url: impl Into<UrlLike<'a>>) -> Option<Match> {
        match self.compile() {
            Ok(compiled) => compiled.matches(location, url),
            Err(err) => {
                warn!(error = %err, "rule cannot be compiled, treating as no match");
                None
            }
        }
    }

    /// Generates the href for `params`
    ///
    /// Compiles on every call; use [`Rule::compile`] to generate many hrefs.
    pub fn to_href(&self, location: &Location, params: &Params) -> Result<String, RuleError> {
        self.compile()?.to_href(location, params)
    }

    /// Generates the href from name/value pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::{Location, Rule};
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// let rule = Rule::new().with_path("/posts/:year/:slug");
    /// let href = rule
    ///     .to_href_params(&location, &[("year", "2024"), ("slug", "hello world")])
    ///     .unwrap();
    /// assert_eq!(href, "/posts/2024/hello%20world");
    /// ```
    pub fn to_href_params(
        &self,
        location: &Location,
        params: &[(&str, &str)],
    ) -> Result<String, RuleError> {
        self.to_href(location, &params_from_pairs(params))
    }

    /// Generates the href from a serializable struct, see [`params_from`]
    pub fn href_for<T: Serialize>(
        &self,
        location: &Location,
        value: &T,
    ) -> Result<String, RuleError> {
        self.to_href(location, &params_from(value)?)
    }
}

/// Matcher/generator pair compiled from one template
#[derive(Debug, Clone)]
pub(crate) struct CompiledTemplate {
    pub(crate) matcher: Matcher,
    pub(crate) generator: Generator,
}

#[derive(Debug, Clone)]
pub(crate) struct SearchEntry {
    pub(crate) name: String,
    pub(crate) template: CompiledTemplate,
}

/// A rule with its templates compiled
///
/// Matching lives in `matching.rs`, generation in `href.rs`.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub(crate) path: Option<CompiledTemplate>,
    /// Sorted by query parameter name
    pub(crate) search: Vec<SearchEntry>,
    pub(crate) condition: Option<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        fn always(_: &Match) -> bool {
            true
        }
        let rule = Rule::new()
            .with_path("/a")
            .with_search("b", ":b?")
            .with_condition(always);
        assert_eq!(rule.path.as_deref(), Some("/a"));
        assert_eq!(rule.search.get("b").map(String::as_str), Some(":b?"));
        assert!(rule.condition.is_some());
    }

    #[test]
    fn test_empty_path_is_absent() {
        assert_eq!(Rule::new().with_path("").path_template(), None);
        assert_eq!(Rule::new().path_template(), None);
        assert_eq!(Rule::new().with_path("/").path_template(), Some("/"));
    }

    #[test]
    fn test_compile_sorts_search_entries() {
        let compiled = Rule::new()
            .with_search("to", ":to?")
            .with_search("from", ":from?")
            .with_search("page", ":page?")
            .compile()
            .unwrap();
        let names: Vec<_> = compiled.search.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["from", "page", "to"]);
    }

    #[test]
    fn test_compile_reports_broken_template() {
        let err = Rule::new().with_path("/:").compile().unwrap_err();
        assert!(matches!(err, RuleError::Template { .. }));

        let err = Rule::new()
            .with_search("q", ":q((?=x))")
            .compile()
            .unwrap_err();
        assert!(matches!(err, RuleError::Pattern { .. }));
    }

    #[test]
    fn test_broken_rule_never_matches() {
        let location = Location::parse("http://localhost/").unwrap();
        assert!(Rule::new()
            .with_path("/(")
            .matches(&location, "/")
            .is_none());
    }
}
