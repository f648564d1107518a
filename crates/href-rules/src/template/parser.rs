//! Template parsing: lexemes → literal text and parameter keys
//!
//! Pure functional parser built on [`lex`]. The result is the token list both
//! the matcher and the generator are compiled from.

use crate::RuleError;

use super::pattern::{lex, Lexeme};

/// Characters that become a key's prefix when written right before it
const PREFIXES: &str = "./";

/// How many times a key may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    /// Exactly once
    #[default]
    One,
    /// `?`: zero or one
    Optional,
    /// `*`: zero or more
    ZeroOrMore,
    /// `+`: one or more
    OneOrMore,
}

impl Modifier {
    fn from_char(c: char) -> Self {
        match c {
            '?' => Modifier::Optional,
            '*' => Modifier::ZeroOrMore,
            '+' => Modifier::OneOrMore,
            _ => Modifier::One,
        }
    }

    pub fn as_regex(self) -> &'static str {
        match self {
            Modifier::One => "",
            Modifier::Optional => "?",
            Modifier::ZeroOrMore => "*",
            Modifier::OneOrMore => "+",
        }
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Modifier::Optional | Modifier::ZeroOrMore)
    }

    pub fn is_repeat(self) -> bool {
        matches!(self, Modifier::ZeroOrMore | Modifier::OneOrMore)
    }
}

/// A named (or numbered) capture in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Parameter name; unnamed `(pattern)`s are numbered from `"0"`
    pub name: String,
    pub prefix: String,
    pub suffix: String,
    /// Regex the value must satisfy; empty for a group without a capture
    pub pattern: String,
    pub modifier: Modifier,
}

/// Parsed template element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Key(Key),
}

/// Default pattern for keys without an explicit one: anything up to the next delimiter
pub fn default_pattern(delimiters: &str) -> String {
    format!("[^{}]+?", regex::escape(delimiters))
}

/// Cursor over lexemes, mirroring the try/must consume style of the grammar
struct Cursor<'a> {
    template: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn try_char(&mut self) -> Option<char> {
        match self.peek() {
            Some(Lexeme::Char(_, c)) => {
                let c = *c;
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    fn try_escaped(&mut self) -> Option<char> {
        match self.peek() {
            Some(Lexeme::Escaped(_, c)) => {
                let c = *c;
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    fn try_name(&mut self) -> Option<String> {
        match self.peek() {
            Some(Lexeme::Name(_, name)) => {
                let name = name.clone();
                self.pos += 1;
                Some(name)
            }
            _ => None,
        }
    }

    fn try_pattern(&mut self) -> Option<String> {
        match self.peek() {
            Some(Lexeme::Pattern(_, pattern)) => {
                let pattern = pattern.clone();
                self.pos += 1;
                Some(pattern)
            }
            _ => None,
        }
    }

    fn try_modifier(&mut self) -> Modifier {
        match self.peek() {
            Some(Lexeme::Modifier(_, c)) => {
                let modifier = Modifier::from_char(*c);
                self.pos += 1;
                modifier
            }
            _ => Modifier::One,
        }
    }

    fn try_open(&mut self) -> bool {
        let open = matches!(self.peek(), Some(Lexeme::Open(_)));
        if open {
            self.pos += 1;
        }
        open
    }

    fn must_consume(&mut self, expected: &str) -> Result<(), RuleError> {
        match self.peek() {
            Some(lexeme) if lexeme.kind() == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(lexeme) => Err(RuleError::template(
                self.template,
                format!(
                    "Unexpected {} at {}, expected {}",
                    lexeme.kind(),
                    lexeme.index(),
                    expected
                ),
            )),
            None => Err(RuleError::template(
                self.template,
                format!("Unexpected end, expected {expected}"),
            )),
        }
    }

    /// Consumes a run of plain and escaped characters
    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.try_char().or_else(|| self.try_escaped()) {
            text.push(c);
        }
        text
    }
}

/// Parses a template into tokens
///
/// `delimiters` decides the default pattern of keys without an explicit one:
/// `"/#?"` for paths, `"&"` for query values.
///
/// # Examples
///
/// ```
/// use href_rules::template::parser::{parse, Token};
///
/// let tokens = parse("/users/:id", "/#?").unwrap();
/// assert_eq!(tokens[0], Token::Literal("/users".to_string()));
/// assert!(matches!(&tokens[1], Token::Key(key) if key.name == "id" && key.prefix == "/"));
/// ```
pub fn parse(template: &str, delimiters: &str) -> Result<Vec<Token>, RuleError> {
    let mut cursor = Cursor {
        template,
        lexemes: lex(template)?,
        pos: 0,
    };
    let default = default_pattern(delimiters);
    let mut tokens = Vec::new();
    let mut path = String::new();
    let mut next_index = 0usize;

    let mut numbered = || {
        let name = next_index.to_string();
        next_index += 1;
        name
    };

    loop {
        let ch = cursor.try_char();
        let name = cursor.try_name();
        let pattern = cursor.try_pattern();

        if name.is_some() || pattern.is_some() {
            let mut prefix = ch.map(String::from).unwrap_or_default();
            if !prefix.is_empty() && !PREFIXES.contains(prefix.as_str()) {
                path.push_str(&prefix);
                prefix.clear();
            }
            if !path.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut path)));
            }
            let name = match name {
                Some(name) => name,
                None => numbered(),
            };
            tokens.push(Token::Key(Key {
                name,
                prefix,
                suffix: String::new(),
                pattern: pattern.unwrap_or_else(|| default.clone()),
                modifier: cursor.try_modifier(),
            }));
            continue;
        }

        if let Some(c) = ch.or_else(|| cursor.try_escaped()) {
            path.push(c);
            continue;
        }

        if !path.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut path)));
        }

        if cursor.try_open() {
            let prefix = cursor.consume_text();
            let name = cursor.try_name();
            let pattern = cursor.try_pattern();
            let suffix = cursor.consume_text();
            cursor.must_consume("CLOSE")?;

            let (name, pattern) = match (name, pattern) {
                (Some(name), Some(pattern)) => (name, pattern),
                (Some(name), None) => (name, default.clone()),
                (None, Some(pattern)) => (numbered(), pattern),
                (None, None) => (String::new(), String::new()),
            };
            tokens.push(Token::Key(Key {
                name,
                prefix,
                suffix,
                pattern,
                modifier: cursor.try_modifier(),
            }));
            continue;
        }

        cursor.must_consume("END")?;
        return Ok(tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, prefix: &str, pattern: &str, modifier: Modifier) -> Token {
        Token::Key(Key {
            name: name.to_string(),
            prefix: prefix.to_string(),
            suffix: String::new(),
            pattern: pattern.to_string(),
            modifier,
        })
    }

    #[test]
    fn test_parse_static() {
        let tokens = parse("/a/b/c", "/#?").unwrap();
        assert_eq!(tokens, vec![Token::Literal("/a/b/c".to_string())]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("", "/#?").unwrap().is_empty());
    }

    #[test]
    fn test_parse_required_and_optional() {
        let tokens = parse("/:accType(checking|saving)/:accId/:accName([^$]+)?", "/#?").unwrap();
        assert_eq!(
            tokens,
            vec![
                key("accType", "/", "checking|saving", Modifier::One),
                key("accId", "/", r"[^/\#\?]+?", Modifier::One),
                key("accName", "/", "[^$]+", Modifier::Optional),
            ]
        );
    }

    #[test]
    fn test_parse_query_value_default_pattern() {
        let tokens = parse(":src?", "&").unwrap();
        assert_eq!(tokens, vec![key("src", "", r"[^\&]+?", Modifier::Optional)]);
    }

    #[test]
    fn test_parse_non_prefix_char_stays_literal() {
        let tokens = parse("/file-:name", "/#?").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("/file-".to_string()),
                key("name", "", r"[^/\#\?]+?", Modifier::One),
            ]
        );
    }

    #[test]
    fn test_parse_dot_prefix() {
        let tokens = parse("/:file.:ext", "/#?").unwrap();
        assert_eq!(tokens[1], key("ext", ".", r"[^/\#\?]+?", Modifier::One));
    }

    #[test]
    fn test_parse_unnamed_patterns_are_numbered() {
        let tokens = parse("/(\\d+)/(\\w+)", "/#?").unwrap();
        assert_eq!(
            tokens,
            vec![
                key("0", "/", r"\d+", Modifier::One),
                key("1", "/", r"\w+", Modifier::One),
            ]
        );
    }

    #[test]
    fn test_parse_group() {
        let tokens = parse("/posts{-:slug}?", "/#?").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("/posts".to_string()),
                Token::Key(Key {
                    name: "slug".to_string(),
                    prefix: "-".to_string(),
                    suffix: String::new(),
                    pattern: r"[^/\#\?]+?".to_string(),
                    modifier: Modifier::Optional,
                }),
            ]
        );
    }

    #[test]
    fn test_parse_repeat_modifiers() {
        let tokens = parse("/:path*", "/#?").unwrap();
        assert_eq!(tokens, vec![key("path", "/", r"[^/\#\?]+?", Modifier::ZeroOrMore)]);
    }

    #[test]
    fn test_parse_stray_modifier_fails() {
        let err = parse("/a?", "/#?").unwrap_err();
        assert!(err.to_string().contains("Unexpected MODIFIER"));
    }

    #[test]
    fn test_parse_unclosed_group_fails() {
        assert!(parse("/{a", "/#?").is_err());
    }
}
