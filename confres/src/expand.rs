//! Placeholder expansion engine.
//!
//! The [`Expander`] understands a shell-compatible subset of parameter
//! expansion and reads variables exclusively through a [`VarSource`], so
//! callers decide whether expansion sees the real process environment, a
//! fixed map, or a [`ProbeEnv`] that only records which names were asked for.
//!
//! | form              | result                                           |
//! |-------------------|--------------------------------------------------|
//! | `$NAME`, `${NAME}`| value of `NAME`                                  |
//! | `${NAME:-word}`   | `word` when `NAME` is unset or empty             |
//! | `${NAME-word}`    | `word` when `NAME` is unset                      |
//! | `${NAME:=word}`   | as `:-`, nothing is written back                 |
//! | `${NAME:+word}`   | `word` when `NAME` is set and non-empty, else "" |
//! | `${NAME+word}`    | `word` when `NAME` is set, else ""               |
//! | `${NAME:?msg}`    | error when `NAME` is unset or empty              |
//! | `${NAME?msg}`     | error when `NAME` is unset                       |
//!
//! `word` is expanded recursively. `\$` and `$$` yield a literal `$`.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap},
};

use crate::error::ExpandError;

/// Value returned by [`ProbeEnv`] for every lookup.
pub const PROBE_SENTINEL: &str = "mocked_value";

/// Source of variable values consulted during expansion.
pub trait VarSource {
    /// Returns the value bound to `name`, or `None` when it is unset.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> VarSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Reads variables from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed in-memory variable bindings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl VarSource for MapEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Records every requested name and answers with [`PROBE_SENTINEL`].
///
/// Used to enumerate the variables a document references without reading
/// or modifying the real environment.
#[derive(Debug, Default)]
pub struct ProbeEnv {
    requested: RefCell<BTreeSet<String>>,
}

impl ProbeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the probe and returns the recorded names.
    pub fn into_names(self) -> BTreeSet<String> {
        self.requested.into_inner()
    }
}

impl VarSource for ProbeEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        self.requested.borrow_mut().insert(name.to_string());
        Some(PROBE_SENTINEL.to_string())
    }
}

/// What happens when a plain reference names an unset variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unbound {
    /// Fail with [`ExpandError::Unbound`].
    Error,
    /// Substitute the empty string.
    Empty,
}

/// Placeholder expander bound to a variable source and an unbound policy.
pub struct Expander<'a> {
    source: &'a dyn VarSource,
    unbound: Unbound,
}

impl<'a> Expander<'a> {
    pub fn new(source: &'a dyn VarSource, unbound: Unbound) -> Self {
        Self { source, unbound }
    }

    /// Expands every placeholder in `input`.
    ///
    /// # Errors
    ///
    /// Fails on unbound variables under [`Unbound::Error`], on failed `?`
    /// checks, and on malformed brace expressions.
    pub fn expand(&self, input: &str) -> Result<String, ExpandError> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' if chars.peek() == Some(&'$') => {
                    chars.next();
                    result.push('$');
                }
                '$' => match chars.peek() {
                    Some('$') => {
                        chars.next();
                        result.push('$');
                    }
                    Some('{') => {
                        chars.next();
                        let mut expr = String::new();
                        let mut depth = 1;
                        let mut closed = false;

                        for ch in chars.by_ref() {
                            match ch {
                                '{' => depth += 1,
                                '}' => {
                                    depth -= 1;
                                    if depth == 0 {
                                        closed = true;
                                        break;
                                    }
                                }
                                _ => {}
                            }
                            expr.push(ch);
                        }

                        if !closed {
                            return Err(ExpandError::UnterminatedBrace {
                                input: input.to_string(),
                            });
                        }
                        result.push_str(&self.expand_braced(&expr)?);
                    }
                    Some(&c) if is_name_start(c) => {
                        let mut name = String::new();
                        while let Some(&c) = chars.peek() {
                            if !is_name_char(c) {
                                break;
                            }
                            name.push(c);
                            chars.next();
                        }
                        result.push_str(&self.plain(&name)?);
                    }
                    _ => result.push('$'),
                },
                _ => result.push(ch),
            }
        }

        Ok(result)
    }

    fn plain(&self, name: &str) -> Result<String, ExpandError> {
        match self.source.lookup(name) {
            Some(value) => Ok(value),
            None => match self.unbound {
                Unbound::Error => Err(ExpandError::Unbound {
                    name: name.to_string(),
                }),
                Unbound::Empty => Ok(String::new()),
            },
        }
    }

    fn expand_braced(&self, expr: &str) -> Result<String, ExpandError> {
        let name_len = expr
            .char_indices()
            .find(|&(i, c)| if i == 0 { !is_name_start(c) } else { !is_name_char(c) })
            .map(|(i, _)| i)
            .unwrap_or(expr.len());

        if name_len == 0 {
            return Err(ExpandError::BadSubstitution {
                expr: expr.to_string(),
            });
        }

        let (name, rest) = expr.split_at(name_len);
        if rest.is_empty() {
            return self.plain(name);
        }

        let (colon, rest) = match rest.strip_prefix(':') {
            Some(r) => (true, r),
            None => (false, rest),
        };
        let mut op_chars = rest.chars();
        let op = op_chars.next();
        let word = op_chars.as_str();

        let value = self.source.lookup(name);
        // With ':' an empty value counts as unset.
        let is_set = match &value {
            Some(v) => !colon || !v.is_empty(),
            None => false,
        };

        match op {
            Some('-') | Some('=') => match value {
                Some(v) if is_set => Ok(v),
                _ => self.expand(word),
            },
            Some('+') => {
                if is_set {
                    self.expand(word)
                } else {
                    Ok(String::new())
                }
            }
            Some('?') => match value {
                Some(v) if is_set => Ok(v),
                _ => {
                    let message = if word.is_empty() {
                        "parameter null or not set".to_string()
                    } else {
                        self.expand(word)?
                    };
                    Err(ExpandError::NullOrUnset {
                        name: name.to_string(),
                        message,
                    })
                }
            },
            _ => Err(ExpandError::BadSubstitution {
                expr: expr.to_string(),
            }),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> MapEnv {
        MapEnv::new()
            .with("HOME", "/home/test")
            .with("USER", "alice")
            .with("EMPTY", "")
    }

    fn strict(input: &str) -> Result<String, ExpandError> {
        let env = env();
        Expander::new(&env, Unbound::Error).expand(input)
    }

    fn lenient(input: &str) -> Result<String, ExpandError> {
        let env = env();
        Expander::new(&env, Unbound::Empty).expand(input)
    }

    #[test]
    fn test_plain_references() {
        assert_eq!(strict("$HOME").unwrap(), "/home/test");
        assert_eq!(strict("${HOME}/bin").unwrap(), "/home/test/bin");
        assert_eq!(strict("$USER@$HOME").unwrap(), "alice@/home/test");
        assert_eq!(strict("${USER}_x").unwrap(), "alice_x");
        // A bare name stops at the first non-name character.
        assert_eq!(strict("$USER.name").unwrap(), "alice.name");
    }

    #[test]
    fn test_unbound_policy() {
        assert_eq!(
            strict("$MISSING"),
            Err(ExpandError::Unbound {
                name: "MISSING".into()
            })
        );
        assert_eq!(lenient("a${MISSING}b").unwrap(), "ab");
        assert_eq!(lenient("$MISSING").unwrap(), "");
    }

    #[test]
    fn test_default_forms() {
        assert_eq!(strict("${MISSING:-fallback}").unwrap(), "fallback");
        assert_eq!(strict("${EMPTY:-fallback}").unwrap(), "fallback");
        assert_eq!(strict("${EMPTY-fallback}").unwrap(), "");
        assert_eq!(strict("${HOME:-fallback}").unwrap(), "/home/test");
        assert_eq!(strict("${MISSING:=assigned}").unwrap(), "assigned");
        assert_eq!(strict("${MISSING:-${USER}}").unwrap(), "alice");
        assert_eq!(strict("${MISSING:-${OTHER:-deep}}").unwrap(), "deep");
    }

    #[test]
    fn test_alternate_forms() {
        assert_eq!(strict("${USER:+set}").unwrap(), "set");
        assert_eq!(strict("${EMPTY:+set}").unwrap(), "");
        assert_eq!(strict("${EMPTY+set}").unwrap(), "set");
        assert_eq!(strict("${MISSING+set}").unwrap(), "");
    }

    #[test]
    fn test_check_forms() {
        assert_eq!(strict("${USER:?need user}").unwrap(), "alice");
        assert_eq!(
            lenient("${MISSING:?need it}"),
            Err(ExpandError::NullOrUnset {
                name: "MISSING".into(),
                message: "need it".into()
            })
        );
        assert!(strict("${EMPTY:?}").is_err());
        assert_eq!(strict("${EMPTY?}").unwrap(), "");
    }

    #[test]
    fn test_literal_dollars() {
        assert_eq!(strict("").unwrap(), "");
        assert_eq!(strict("$").unwrap(), "$");
        assert_eq!(strict("cost: 5$").unwrap(), "cost: 5$");
        assert_eq!(strict("$1").unwrap(), "$1");
        assert_eq!(strict(r"\$HOME").unwrap(), "$HOME");
        assert_eq!(strict("$$").unwrap(), "$");
        assert_eq!(strict("$$HOME").unwrap(), "$HOME");
        assert_eq!(strict("a$$$USER").unwrap(), "a$alice");
    }

    #[test]
    fn test_malformed_braces() {
        assert!(matches!(
            strict("${HOME"),
            Err(ExpandError::UnterminatedBrace { .. })
        ));
        assert!(matches!(
            strict("${}"),
            Err(ExpandError::BadSubstitution { .. })
        ));
        assert!(matches!(
            strict("${HOME:0:3}"),
            Err(ExpandError::BadSubstitution { .. })
        ));
    }

    #[test]
    fn test_probe_records_names() {
        let probe = ProbeEnv::new();
        let out = Expander::new(&probe, Unbound::Error)
            .expand("${A}-$B-${C:-x}")
            .unwrap();
        assert_eq!(out, "mocked_value-mocked_value-mocked_value");
        let names: Vec<_> = probe.into_names().into_iter().collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_closure_source() {
        let source = |name: &str| (name == "X").then(|| "42".to_string());
        assert_eq!(
            Expander::new(&source, Unbound::Empty)
                .expand("${X}${Y}")
                .unwrap(),
            "42"
        );
    }
}
