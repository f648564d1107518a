//! URL → match
//!
//! A URL matches when it is same-origin, its path satisfies the path template,
//! every declared query value satisfies its value template and the condition
//! (if any) accepts the result. Failing any step is an ordinary `None`.

use tracing::debug;
use url::Url;

use crate::codec::encode_component;
use crate::rule::CompiledRule;
use crate::{Location, Match, Params, UrlLike};

/// First value of a query parameter; absent parameters read as empty
fn query_value(url: &Url, name: &str) -> String {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

impl CompiledRule {
    /// Tests a URL against this rule
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::{Location, Rule};
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// let rule = Rule::new().with_search("src", ":src?").compile().unwrap();
    ///
    /// let matched = rule.matches(&location, "/anything?src=a%26b%3F").unwrap();
    /// assert_eq!(matched.param("src"), Some("a&b?"));
    /// assert!(rule.matches(&location, "https://elsewhere/?src=x").is_none());
    /// ```
    pub fn matches<'a>(&self, location: &Location, url: impl Into<UrlLike<'a>>) -> Option<Match> {
        let url = match location.resolve(url) {
            Ok(url) => url,
            Err(err) => {
                debug!(error = %err, "no match: unresolvable URL");
                return None;
            }
        };

        if !location.is_same_origin(&url) {
            debug!(url = %url, base = %location, "no match: different origin");
            return None;
        }

        let mut params = Params::new();

        if let Some(path) = &self.path {
            let Some(captured) = path.matcher.matches(url.path()) else {
                debug!(url = %url, template = path.matcher.template(), "no match: path");
                return None;
            };
            params.extend(captured);
        }

        for entry in &self.search {
            let raw = query_value(&url, &entry.name);
            // The value template expects encoded input, like a path segment
            let encoded = encode_component(&raw);
            let Some(captured) = entry.template.matcher.matches(&encoded) else {
                debug!(
                    url = %url,
                    name = %entry.name,
                    template = entry.template.matcher.template(),
                    "no match: query parameter"
                );
                return None;
            };
            params.extend(captured);
        }

        let matched = Match::new(params, url);

        if let Some(condition) = self.condition {
            if !condition(&matched) {
                debug!(url = %matched.url, "no match: condition rejected");
                return None;
            }
        }

        Some(matched)
    }
}
