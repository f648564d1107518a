//! Lexical analysis of template strings
//!
//! Pure functional lexer: template text → flat list of [`Lexeme`]s.
//! Grouping them into literals and keys is the parser's job.

use crate::RuleError;

/// One lexical unit of a template
///
/// Each variant carries the character offset where it starts, used in error messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    /// `?`, `*` or `+`
    Modifier(usize, char),
    /// `\x`: a character taken literally
    Escaped(usize, char),
    /// `{`
    Open(usize),
    /// `}`
    Close(usize),
    /// `:name`
    Name(usize, String),
    /// `(pattern)`, without the outer parentheses
    Pattern(usize, String),
    /// Any other character
    Char(usize, char),
    /// End of input
    End(usize),
}

impl Lexeme {
    pub fn index(&self) -> usize {
        match self {
            Lexeme::Modifier(i, _)
            | Lexeme::Escaped(i, _)
            | Lexeme::Open(i)
            | Lexeme::Close(i)
            | Lexeme::Name(i, _)
            | Lexeme::Pattern(i, _)
            | Lexeme::Char(i, _)
            | Lexeme::End(i) => *i,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Lexeme::Modifier(..) => "MODIFIER",
            Lexeme::Escaped(..) => "ESCAPED_CHAR",
            Lexeme::Open(_) => "OPEN",
            Lexeme::Close(_) => "CLOSE",
            Lexeme::Name(..) => "NAME",
            Lexeme::Pattern(..) => "PATTERN",
            Lexeme::Char(..) => "CHAR",
            Lexeme::End(_) => "END",
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits a template into lexemes
///
/// # Errors
///
/// - `:` not followed by a name character
/// - `(` patterns that are empty, unbalanced, start with `?`, or contain a
///   capturing group (nested groups must be written `(?:...)`)
///
/// # Examples
///
/// ```
/// use href_rules::template::pattern::{lex, Lexeme};
///
/// let lexemes = lex("/:id(\\d+)?").unwrap();
/// assert_eq!(lexemes[1], Lexeme::Name(1, "id".to_string()));
/// assert_eq!(lexemes[2], Lexeme::Pattern(4, "\\d+".to_string()));
/// ```
pub fn lex(template: &str) -> Result<Vec<Lexeme>, RuleError> {
    let chars: Vec<char> = template.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c @ ('*' | '+' | '?') => {
                lexemes.push(Lexeme::Modifier(i, c));
                i += 1;
            }
            '\\' => {
                let escaped = chars.get(i + 1).copied().ok_or_else(|| {
                    RuleError::template(template, format!("Trailing escape at {i}"))
                })?;
                lexemes.push(Lexeme::Escaped(i, escaped));
                i += 2;
            }
            '{' => {
                lexemes.push(Lexeme::Open(i));
                i += 1;
            }
            '}' => {
                lexemes.push(Lexeme::Close(i));
                i += 1;
            }
            ':' => {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| is_name_char(**c))
                    .collect();
                if name.is_empty() {
                    return Err(RuleError::template(
                        template,
                        format!("Missing parameter name at {i}"),
                    ));
                }
                let len = name.chars().count();
                lexemes.push(Lexeme::Name(i, name));
                i += 1 + len;
            }
            '(' => {
                let (pattern, next) = lex_pattern(template, &chars, i)?;
                lexemes.push(Lexeme::Pattern(i, pattern));
                i = next;
            }
            c => {
                lexemes.push(Lexeme::Char(i, c));
                i += 1;
            }
        }
    }

    lexemes.push(Lexeme::End(i));
    Ok(lexemes)
}

/// Reads a parenthesised pattern starting at `start`, returning it and the index after `)`
fn lex_pattern(template: &str, chars: &[char], start: usize) -> Result<(String, usize), RuleError> {
    let mut depth = 1;
    let mut pattern = String::new();
    let mut j = start + 1;

    if chars.get(j) == Some(&'?') {
        return Err(RuleError::template(
            template,
            format!("Pattern cannot start with \"?\" at {j}"),
        ));
    }

    while j < chars.len() {
        match chars[j] {
            '\\' => {
                pattern.push('\\');
                if let Some(&next) = chars.get(j + 1) {
                    pattern.push(next);
                }
                j += 2;
                continue;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    j += 1;
                    break;
                }
            }
            '(' => {
                depth += 1;
                if chars.get(j + 1) != Some(&'?') {
                    return Err(RuleError::template(
                        template,
                        format!("Capturing groups are not allowed at {j}"),
                    ));
                }
            }
            _ => {}
        }
        pattern.push(chars[j]);
        j += 1;
    }

    if depth != 0 {
        return Err(RuleError::template(
            template,
            format!("Unbalanced pattern at {start}"),
        ));
    }
    if pattern.is_empty() {
        return Err(RuleError::template(
            template,
            format!("Missing pattern at {start}"),
        ));
    }

    Ok((pattern, j))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_literal() {
        let lexemes = lex("/a").unwrap();
        assert_eq!(
            lexemes,
            vec![Lexeme::Char(0, '/'), Lexeme::Char(1, 'a'), Lexeme::End(2)]
        );
    }

    #[test]
    fn test_lex_empty() {
        assert_eq!(lex("").unwrap(), vec![Lexeme::End(0)]);
    }

    #[test]
    fn test_lex_name_with_pattern_and_modifier() {
        let lexemes = lex(":accName([^$]+)?").unwrap();
        assert_eq!(
            lexemes,
            vec![
                Lexeme::Name(0, "accName".to_string()),
                Lexeme::Pattern(8, "[^$]+".to_string()),
                Lexeme::Modifier(15, '?'),
                Lexeme::End(16),
            ]
        );
    }

    #[test]
    fn test_lex_name_stops_at_punctuation() {
        let lexemes = lex(":a.b").unwrap();
        assert_eq!(lexemes[0], Lexeme::Name(0, "a".to_string()));
        assert_eq!(lexemes[1], Lexeme::Char(2, '.'));
    }

    #[test]
    fn test_lex_escape_and_groups() {
        let lexemes = lex("{\\:x}").unwrap();
        assert_eq!(
            lexemes,
            vec![
                Lexeme::Open(0),
                Lexeme::Escaped(1, ':'),
                Lexeme::Char(3, 'x'),
                Lexeme::Close(4),
                Lexeme::End(5),
            ]
        );
    }

    #[test]
    fn test_lex_non_capturing_group_allowed() {
        let lexemes = lex("((?:a|b)c)").unwrap();
        assert_eq!(lexemes[0], Lexeme::Pattern(0, "(?:a|b)c".to_string()));
    }

    #[test]
    fn test_lex_errors() {
        for template in [":", "/:/", "(", "()", "(?a)", "((a))", "\\"] {
            assert!(
                matches!(lex(template), Err(RuleError::Template { .. })),
                "{template}"
            );
        }
    }
}
