//! Regex-like values.
//!
//! A `RegexValue` keeps the source pattern, its flag set, a compiled
//! matcher, and a `last_index` cursor. The cursor makes global matching
//! stateful: `exec` resumes where the previous match ended.

use std::fmt;
use std::rc::Rc;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Flag set for a regex-like value, rendered canonically as a subset of
/// `"gim"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexFlags {
    /// Stateful matching: `exec` starts at `last_index` and advances it.
    pub global: bool,
    pub case_insensitive: bool,
    pub multiline: bool,
}

impl RegexFlags {
    /// Parse a flag string such as `"gi"`.
    pub fn parse(flags: &str) -> Result<Self, ValueError> {
        let mut parsed = RegexFlags::default();
        for ch in flags.chars() {
            match ch {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multiline = true,
                other => return Err(ValueError::UnknownFlag(other)),
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.case_insensitive {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

/// A regex-like value.
///
/// The compiled matcher is shared between copies; the observable state is
/// the pattern, the flags, and the cursor.
#[derive(Clone)]
pub struct RegexValue {
    pattern: String,
    flags: RegexFlags,
    compiled: Rc<Regex>,
    last_index: usize,
}

impl RegexValue {
    /// Compile `pattern` under `flags`. Case-insensitive and multiline
    /// flags become inline groups; the global flag only affects `exec`.
    pub fn new(pattern: impl Into<String>, flags: RegexFlags) -> Result<Self, ValueError> {
        let pattern = pattern.into();
        let mut inline = String::new();
        if flags.case_insensitive {
            inline.push('i');
        }
        if flags.multiline {
            inline.push('m');
        }
        let expr = if inline.is_empty() {
            pattern.clone()
        } else {
            format!("(?{inline}){pattern}")
        };
        let compiled = Regex::new(&expr).map_err(|err| ValueError::InvalidPattern {
            pattern: pattern.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            pattern,
            flags,
            compiled: Rc::new(compiled),
            last_index: 0,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    /// Byte offset where the next global `exec` will start.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn set_last_index(&mut self, index: usize) {
        self.last_index = index;
    }

    /// Test `haystack` without touching the cursor.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled.is_match(haystack)
    }

    /// Find the next match, returning its byte offset and text.
    ///
    /// Without the global flag every call searches from the start. With
    /// it, the search resumes at `last_index` and the cursor advances past
    /// the match (one past, for an empty match); a miss resets the cursor
    /// to zero.
    pub fn exec(&mut self, haystack: &str) -> Option<(usize, String)> {
        let start = if self.flags.global { self.last_index } else { 0 };
        let tail = match haystack.get(start..) {
            Some(tail) => tail,
            None => {
                if self.flags.global {
                    self.last_index = 0;
                }
                return None;
            }
        };
        match self.compiled.find(tail) {
            Some(found) => {
                let begin = start + found.start();
                let end = start + found.end();
                if self.flags.global {
                    self.last_index = if end == begin { end + 1 } else { end };
                }
                Some((begin, haystack[begin..end].to_string()))
            }
            None => {
                if self.flags.global {
                    self.last_index = 0;
                }
                None
            }
        }
    }

    /// Fresh value with the same pattern, flags, and cursor.
    pub fn replicate(&self) -> Self {
        self.clone()
    }
}

/// Pattern and flags identify a regex-like value; the cursor is part of
/// its observable state, so it participates in equality too.
impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.flags == other.flags
            && self.last_index == other.last_index
    }
}

impl fmt::Debug for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexValue")
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .field("last_index", &self.last_index)
            .finish()
    }
}

impl fmt::Display for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing_and_display() {
        let flags = RegexFlags::parse("mig").unwrap();
        assert!(flags.global && flags.case_insensitive && flags.multiline);
        assert_eq!(flags.to_string(), "gim");

        assert_eq!(RegexFlags::parse("").unwrap(), RegexFlags::default());
        assert!(matches!(
            RegexFlags::parse("gx"),
            Err(ValueError::UnknownFlag('x'))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = RegexValue::new("fo(o", RegexFlags::default()).unwrap_err();
        assert!(matches!(err, ValueError::InvalidPattern { .. }));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let re = RegexValue::new("foo", RegexFlags::parse("i").unwrap()).unwrap();
        assert!(re.is_match("FOOBAR"));

        let re = RegexValue::new("foo", RegexFlags::default()).unwrap();
        assert!(!re.is_match("FOOBAR"));
    }

    #[test]
    fn test_global_exec_advances_cursor() {
        let mut re = RegexValue::new("ab", RegexFlags::parse("g").unwrap()).unwrap();

        assert_eq!(re.exec("xxabyyab"), Some((2, "ab".to_string())));
        assert_eq!(re.last_index(), 4);
        assert_eq!(re.exec("xxabyyab"), Some((6, "ab".to_string())));
        assert_eq!(re.last_index(), 8);

        // Exhausted: miss resets the cursor.
        assert_eq!(re.exec("xxabyyab"), None);
        assert_eq!(re.last_index(), 0);
    }

    #[test]
    fn test_non_global_exec_ignores_cursor() {
        let mut re = RegexValue::new("ab", RegexFlags::default()).unwrap();
        assert_eq!(re.exec("abab"), Some((0, "ab".to_string())));
        assert_eq!(re.exec("abab"), Some((0, "ab".to_string())));
        assert_eq!(re.last_index(), 0);
    }

    #[test]
    fn test_replicate_carries_cursor() {
        let mut re = RegexValue::new("foobar", RegexFlags::parse("g").unwrap()).unwrap();
        re.set_last_index(3);

        let copy = re.replicate();
        assert_eq!(copy, re);
        assert_eq!(copy.pattern(), "foobar");
        assert_eq!(copy.last_index(), 3);
    }
}
