//! Params → href
//!
//! Output is `pathname` followed by `?name=value&...` for every query value the
//! params produce, with names in ascending order so equal params always give
//! equal hrefs.

use tracing::debug;

use crate::codec::{encode_component, encode_params};
use crate::rule::CompiledRule;
use crate::{Location, Match, Params, RuleError};

impl CompiledRule {
    /// Generates the href for `params`
    ///
    /// Parameters the rule does not mention are ignored. Fails when a required
    /// value is missing, a value breaks its pattern, or the condition rejects
    /// the generated URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::{Location, Rule, params_from_pairs};
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// let rule = Rule::new()
    ///     .with_search("to", ":toDate?")
    ///     .with_search("from", ":fromDate")
    ///     .compile()
    ///     .unwrap();
    ///
    /// let params = params_from_pairs(&[("fromDate", "2020-01-01"), ("toDate", "2020-02-01")]);
    /// assert_eq!(rule.to_href(&location, &params).unwrap(), "?from=2020-01-01&to=2020-02-01");
    /// assert!(rule.to_href(&location, &Default::default()).is_err());
    /// ```
    pub fn to_href(&self, location: &Location, params: &Params) -> Result<String, RuleError> {
        let pathname = match &self.path {
            Some(path) => path
                .generator
                .generate(params)
                .inspect_err(|err| debug!(error = %err, "href generation failed: path"))?,
            None => String::new(),
        };
        let pathname = if pathname.len() > 1 {
            pathname.strip_suffix('/').unwrap_or(&pathname)
        } else {
            pathname.as_str()
        };

        let encoded = encode_params(params);
        let mut query = Vec::new();
        for entry in &self.search {
            let value = entry.template.generator.generate(&encoded).inspect_err(|err| {
                debug!(error = %err, name = %entry.name, "href generation failed: query parameter")
            })?;
            if !value.is_empty() {
                query.push(format!("{}={}", encode_component(&entry.name), value));
            }
        }

        let href = if query.is_empty() {
            pathname.to_string()
        } else {
            format!("{}?{}", pathname, query.join("&"))
        };

        if let Some(condition) = self.condition {
            let provisional = Match::new(params.clone(), location.resolve(&href)?);
            if !condition(&provisional) {
                debug!(href = %href, "generated href rejected by condition");
                return Err(RuleError::ConditionRejected { href });
            }
        }

        Ok(href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params_from_pairs, Rule};

    fn localhost() -> Location {
        Location::parse("http://localhost/").unwrap()
    }

    #[test]
    fn test_no_path_no_search_is_empty() {
        let rule = Rule::new().compile().unwrap();
        assert_eq!(rule.to_href(&localhost(), &Params::new()).unwrap(), "");
    }

    #[test]
    fn test_root_keeps_single_slash() {
        let rule = Rule::new().with_path("/").compile().unwrap();
        assert_eq!(rule.to_href(&localhost(), &Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_trailing_slash_trimmed_once() {
        let rule = Rule::new().with_path("/a/b/c/").compile().unwrap();
        assert_eq!(rule.to_href(&localhost(), &Params::new()).unwrap(), "/a/b/c");
    }

    #[test]
    fn test_search_name_is_encoded() {
        let rule = Rule::new().with_search("a b", ":v").compile().unwrap();
        let href = rule
            .to_href(&localhost(), &params_from_pairs(&[("v", "x y")]))
            .unwrap();
        assert_eq!(href, "?a%20b=x%20y");
    }

    #[test]
    fn test_search_value_violation_is_error() {
        let rule = Rule::new()
            .with_search("page", ":page([0-9]+)?")
            .compile()
            .unwrap();
        let err = rule
            .to_href(&localhost(), &params_from_pairs(&[("page", "one")]))
            .unwrap_err();
        assert!(matches!(err, RuleError::ConstraintViolation { ref name, .. } if name == "page"));
    }

    #[test]
    fn test_condition_receives_unencoded_params() {
        fn raw_value(m: &Match) -> bool {
            m.param("q") == Some("a&b") && m.url.query() == Some("q=a%26b")
        }
        let rule = Rule::new()
            .with_search("q", ":q")
            .with_condition(raw_value)
            .compile()
            .unwrap();
        let href = rule
            .to_href(&localhost(), &params_from_pairs(&[("q", "a&b")]))
            .unwrap();
        assert_eq!(href, "?q=a%26b");
    }

    #[test]
    fn test_condition_rejection() {
        fn never(_: &Match) -> bool {
            false
        }
        let rule = Rule::new()
            .with_path("/x")
            .with_condition(never)
            .compile()
            .unwrap();
        let err = rule.to_href(&localhost(), &Params::new()).unwrap_err();
        assert!(matches!(err, RuleError::ConditionRejected { ref href } if href == "/x"));
    }
}
