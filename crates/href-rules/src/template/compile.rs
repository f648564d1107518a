//! Compiles parsed templates into a matcher and a generator
//!
//! The matcher is a single anchored, case-insensitive regex; the generator walks
//! the token list and checks each value against its key's pattern.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::codec::{decode_component, encode_component};
use crate::{Params, RuleError};

use super::parser::{parse, Key, Modifier, Token};

/// Delimiters separating path segments
pub const PATH_DELIMITERS: &str = "/#?";
/// Delimiter separating query pairs
pub const QUERY_DELIMITERS: &str = "&";

pub type EncodeFn = for<'a> fn(&'a str) -> Cow<'a, str>;
pub type DecodeFn = for<'a> fn(&'a str) -> Option<Cow<'a, str>>;

fn identity(value: &str) -> Cow<'_, str> {
    Cow::Borrowed(value)
}

/// Options for [`Matcher::compile`]
#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    pub delimiters: &'static str,
    /// Applied to every captured value
    pub decode: DecodeFn,
}

impl MatcherOptions {
    /// Path templates: `/`, `#` and `?` delimit segments, captures are percent-decoded
    pub fn path() -> Self {
        Self {
            delimiters: PATH_DELIMITERS,
            decode: decode_component,
        }
    }

    /// Query value templates: `&` is the only delimiter, captures are percent-decoded
    pub fn query_value() -> Self {
        Self {
            delimiters: QUERY_DELIMITERS,
            decode: decode_component,
        }
    }
}

/// Options for [`Generator::compile`]
#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    pub delimiters: &'static str,
    /// Applied to every substituted value before validation
    pub encode: EncodeFn,
}

impl GeneratorOptions {
    /// Path templates: values are percent-encoded before substitution
    pub fn path() -> Self {
        Self {
            delimiters: PATH_DELIMITERS,
            encode: encode_component,
        }
    }

    /// Query value templates: values are expected to arrive already encoded
    pub fn query_value() -> Self {
        Self {
            delimiters: QUERY_DELIMITERS,
            encode: identity,
        }
    }
}

fn build_regex(template: &str, source: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::Pattern {
            template: template.to_string(),
            source,
        })
}

/// Regex fragment for one key
fn key_to_regex(key: &Key) -> String {
    let prefix = regex::escape(&key.prefix);
    let suffix = regex::escape(&key.suffix);
    let modifier = key.modifier.as_regex();
    let pattern = &key.pattern;

    if pattern.is_empty() {
        return format!("(?:{prefix}{suffix}){modifier}");
    }

    match (prefix.is_empty() && suffix.is_empty(), key.modifier.is_repeat()) {
        (true, true) => format!("((?:{pattern}){modifier})"),
        (true, false) => format!("({pattern}){modifier}"),
        (false, true) => {
            let optional = if key.modifier == Modifier::ZeroOrMore { "?" } else { "" };
            format!(
                "(?:{prefix}((?:{pattern})(?:{suffix}{prefix}(?:{pattern}))*){suffix}){optional}"
            )
        }
        (false, false) => format!("(?:{prefix}({pattern}){suffix}){modifier}"),
    }
}

/// Tests whole inputs against a template and extracts its keys
///
/// # Examples
///
/// ```
/// use href_rules::template::{Matcher, MatcherOptions};
///
/// let matcher = Matcher::compile("/users/:id", MatcherOptions::path()).unwrap();
/// let params = matcher.matches("/USERS/caf%C3%A9/").unwrap();
/// assert_eq!(params.get("id").map(String::as_str), Some("café"));
/// assert!(matcher.matches("/users/1/posts").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    template: String,
    regex: Regex,
    keys: Vec<Key>,
    decode: DecodeFn,
}

impl Matcher {
    pub fn compile(template: &str, options: MatcherOptions) -> Result<Self, RuleError> {
        let tokens = parse(template, options.delimiters)?;
        let mut source = String::from("^");
        let mut keys = Vec::new();

        for token in tokens {
            match token {
                Token::Literal(text) => source.push_str(&regex::escape(&text)),
                Token::Key(key) => {
                    source.push_str(&key_to_regex(&key));
                    if !key.pattern.is_empty() {
                        keys.push(key);
                    }
                }
            }
        }

        // Non-strict: one trailing delimiter is tolerated before the end
        source.push_str(&format!("[{}]?$", regex::escape(options.delimiters)));
        trace!(template, regex = %source, "compiled template matcher");

        Ok(Self {
            template: template.to_string(),
            regex: build_regex(template, &source)?,
            keys,
            decode: options.decode,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Matches the entire input, returning decoded captures
    ///
    /// Keys that did not participate in the match (absent optionals) are left
    /// out. An undecodable capture makes the whole match fail.
    pub fn matches(&self, input: &str) -> Option<Params> {
        let captures = self.regex.captures(input)?;
        let mut params = Params::new();

        for (index, key) in self.keys.iter().enumerate() {
            let Some(capture) = captures.get(index + 1) else {
                continue;
            };
            let value = if key.modifier.is_repeat() {
                self.decode_repeated(key, capture.as_str())?
            } else {
                (self.decode)(capture.as_str())?.into_owned()
            };
            params.insert(key.name.clone(), value);
        }

        Some(params)
    }

    /// Decodes each repetition separately, keeping the separators intact
    fn decode_repeated(&self, key: &Key, raw: &str) -> Option<String> {
        // Repetitions inside a `{prefix:name suffix}+` capture are joined by
        // suffix then prefix, see `key_to_regex`
        let separator = format!("{}{}", key.suffix, key.prefix);
        if separator.is_empty() {
            return (self.decode)(raw).map(Cow::into_owned);
        }
        let parts = raw
            .split(separator.as_str())
            .map(|part| (self.decode)(part).map(Cow::into_owned))
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join(&separator))
    }
}

/// Builds strings from a template and a parameter map
///
/// # Examples
///
/// ```
/// use href_rules::template::{Generator, GeneratorOptions};
/// use href_rules::Params;
///
/// let generator = Generator::compile("/users/:id(\\d+)", GeneratorOptions::path()).unwrap();
/// let mut params = Params::new();
/// params.insert("id".to_string(), "42".to_string());
/// assert_eq!(generator.generate(&params).unwrap(), "/users/42");
///
/// params.insert("id".to_string(), "abc".to_string());
/// assert!(generator.generate(&params).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    template: String,
    tokens: Vec<Token>,
    /// One anchored validator per token; `None` for literals
    validators: Vec<Option<Regex>>,
    encode: EncodeFn,
}

impl Generator {
    pub fn compile(template: &str, options: GeneratorOptions) -> Result<Self, RuleError> {
        let tokens = parse(template, options.delimiters)?;
        let validators = tokens
            .iter()
            .map(|token| match token {
                Token::Literal(_) => Ok(None),
                Token::Key(key) => {
                    build_regex(template, &format!("^(?:{})$", key.pattern)).map(Some)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            template: template.to_string(),
            tokens,
            validators,
            encode: options.encode,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes `params` into the template
    ///
    /// Keys missing from `params` are skipped when optional and rejected
    /// otherwise. Entries in `params` the template does not mention are ignored.
    pub fn generate(&self, params: &Params) -> Result<String, RuleError> {
        let mut out = String::new();

        for (token, validator) in self.tokens.iter().zip(&self.validators) {
            let key = match token {
                Token::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Token::Key(key) => key,
            };

            match params.get(&key.name) {
                Some(value) => {
                    let segment = (self.encode)(value);
                    if let Some(validator) = validator {
                        if !validator.is_match(&segment) {
                            return Err(RuleError::ConstraintViolation {
                                name: key.name.clone(),
                                pattern: key.pattern.clone(),
                                value: segment.into_owned(),
                            });
                        }
                    }
                    out.push_str(&key.prefix);
                    out.push_str(&segment);
                    out.push_str(&key.suffix);
                }
                None if key.modifier.is_optional() => {}
                None => {
                    return Err(RuleError::MissingParam {
                        name: key.name.clone(),
                    })
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_matcher_root() {
        let matcher = Matcher::compile("", MatcherOptions::path()).unwrap();
        assert_eq!(matcher.matches("/"), Some(Params::new()));
        assert_eq!(matcher.matches(""), Some(Params::new()));
        assert_eq!(matcher.matches("/a"), None);
    }

    #[test]
    fn test_matcher_static_is_case_insensitive() {
        let matcher = Matcher::compile("/index.html", MatcherOptions::path()).unwrap();
        assert!(matcher.matches("/index.HTML").is_some());
        assert!(matcher.matches("/index:html").is_none());
        assert!(matcher.matches("/index.htmls").is_none());
    }

    #[test]
    fn test_matcher_trailing_delimiter() {
        let matcher = Matcher::compile("/a/b/c", MatcherOptions::path()).unwrap();
        assert!(matcher.matches("/a/b/c").is_some());
        assert!(matcher.matches("/a/b/c/").is_some());
        assert!(matcher.matches("/a/b/c//").is_none());
        assert!(matcher.matches("/a/b/c/d").is_none());
    }

    #[test]
    fn test_matcher_encoded_slash_is_literal() {
        let plain = Matcher::compile("/a/b/c", MatcherOptions::path()).unwrap();
        let encoded = Matcher::compile("/a%2Fb/c", MatcherOptions::path()).unwrap();
        assert!(plain.matches("/a%2Fb/c").is_none());
        assert!(encoded.matches("/a%2Fb/c").is_some());
        assert!(encoded.matches("/A%2FB/C").is_some());
        assert!(encoded.matches("/a/b/c").is_none());
    }

    #[test]
    fn test_matcher_optional_key() {
        let matcher =
            Matcher::compile("/:accType(checking|saving)/:accName([^$]+)?", MatcherOptions::path())
                .unwrap();
        assert_eq!(matcher.matches("/saving"), Some(params(&[("accType", "saving")])));
        assert_eq!(
            matcher.matches("/saving/My%20Savings"),
            Some(params(&[("accType", "saving"), ("accName", "My Savings")]))
        );
        assert_eq!(matcher.matches("/saving/bad-$"), None);
    }

    #[test]
    fn test_matcher_query_value() {
        let matcher = Matcher::compile(":src?", MatcherOptions::query_value()).unwrap();
        assert_eq!(matcher.matches(""), Some(Params::new()));
        assert_eq!(matcher.matches("a%26b%3F"), Some(params(&[("src", "a&b?")])));
        assert_eq!(matcher.matches("a&b"), None);
    }

    #[test]
    fn test_matcher_repeat_decodes_each_part() {
        let matcher = Matcher::compile("/files/:path+", MatcherOptions::path()).unwrap();
        assert_eq!(
            matcher.matches("/files/a%20b/c"),
            Some(params(&[("path", "a b/c")]))
        );
        assert_eq!(matcher.matches("/files"), None);
    }

    #[test]
    fn test_matcher_grouped_repeat_splits_between_affixes() {
        let matcher = Matcher::compile("/list{-:item.}+", MatcherOptions::path()).unwrap();
        assert_eq!(
            matcher.matches("/list-a%20b.-c%2Ed."),
            Some(params(&[("item", "a b.-c.d")]))
        );
        assert_eq!(matcher.matches("/list-a%ZZ.-%FF."), None);
    }

    #[test]
    fn test_matcher_invalid_utf8_is_no_match() {
        let matcher = Matcher::compile("/:id", MatcherOptions::path()).unwrap();
        assert_eq!(matcher.matches("/%FF"), None);
    }

    #[test]
    fn test_matcher_unsupported_regex() {
        let err = Matcher::compile("/:id((?=a)a)", MatcherOptions::path()).unwrap_err();
        assert!(matches!(err, RuleError::Pattern { .. }));
    }

    #[test]
    fn test_generator_encodes_and_validates() {
        let generator = Generator::compile("/:id", GeneratorOptions::path()).unwrap();
        assert_eq!(generator.generate(&params(&[("id", "café")])).unwrap(), "/caf%C3%A9");
        assert!(matches!(
            generator.generate(&Params::new()),
            Err(RuleError::MissingParam { .. })
        ));
    }

    #[test]
    fn test_generator_skips_optional_and_ignores_extra() {
        let generator =
            Generator::compile("/:a/:b?", GeneratorOptions::path()).unwrap();
        assert_eq!(
            generator.generate(&params(&[("a", "x"), ("unused", "y")])).unwrap(),
            "/x"
        );
    }

    #[test]
    fn test_generator_constraint_is_case_insensitive() {
        let generator =
            Generator::compile("/:t(checking|saving)", GeneratorOptions::path()).unwrap();
        assert_eq!(generator.generate(&params(&[("t", "SAVING")])).unwrap(), "/SAVING");
        let err = generator.generate(&params(&[("t", "sav")])).unwrap_err();
        assert!(matches!(err, RuleError::ConstraintViolation { ref name, .. } if name == "t"));
    }

    #[test]
    fn test_generator_query_value_uses_value_as_is() {
        let generator = Generator::compile(":src?", GeneratorOptions::query_value()).unwrap();
        assert_eq!(generator.generate(&params(&[("src", "a%26b")])).unwrap(), "a%26b");
        assert_eq!(generator.generate(&Params::new()).unwrap(), "");
    }

    #[test]
    fn test_generator_literal_passthrough() {
        let generator = Generator::compile("/a%2Fb/c/", GeneratorOptions::path()).unwrap();
        assert_eq!(generator.generate(&Params::new()).unwrap(), "/a%2Fb/c/");
    }
}
