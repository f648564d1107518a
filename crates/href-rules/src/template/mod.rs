//! Template module: path and query-value templates
//!
//! Turns template text like `/:accType(checking|saving)/:accId?` into a
//! [`Matcher`] (URL → params) and a [`Generator`] (params → URL).
//!
//! - `:name`: required key, matches up to the next delimiter
//! - `:name(pattern)`: required key constrained by a regex
//! - `:name?`, `:name(pattern)?`: optional key
//! - `:name*`, `:name+`: repeated key
//! - `{prefix:name(pattern)suffix}`: group with explicit affixes
//! - `\c`: literal character

pub mod compile;
pub mod parser;
pub mod pattern;

pub use compile::{
    Generator, GeneratorOptions, Matcher, MatcherOptions, PATH_DELIMITERS, QUERY_DELIMITERS,
};
pub use parser::{parse, Key, Modifier, Token};
