//! Compiled pattern payloads behind `Value::Regex` / `RegexSubst` /
//! `Transliteration` (§4.7/C7).
//!
//! This crate owns the *data* (so `Value` can hold it without a dependency
//! cycle on `strand-regex`); `strand-regex` owns the *operations*
//! (compilation caching, match/substitute/transliterate, exception
//! raising) built on top of these types.

use std::fmt;

use regex::Regex;

/// Option bits independent of the regex engine's own flags. The `global`
/// flag is kept out of the engine's bitflags entirely (§9 open question:
/// the source's global-flag bit overlapped with the compiled library's
/// option bits; here it is just a separate field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexOptions {
    pub case_insensitive: bool,
    pub dot_matches_all: bool,
    pub extended: bool,
    pub multi_line: bool,
    pub global: bool,
}

#[derive(Clone)]
pub struct CompiledRegex {
    pub source: String,
    pub options: RegexOptions,
    pub engine: Regex,
}

impl fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRegex").field("source", &self.source).field("options", &self.options).finish()
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.options == other.options
    }
}

#[derive(Clone)]
pub struct CompiledSubst {
    pub regex: CompiledRegex,
    pub template: String,
}

impl fmt::Debug for CompiledSubst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSubst").field("regex", &self.regex).field("template", &self.template).finish()
    }
}

impl PartialEq for CompiledSubst {
    fn eq(&self, other: &Self) -> bool {
        self.regex == other.regex && self.template == other.template
    }
}

/// Two parallel character sets with range expansion already performed
/// (§4.7). `source[i]` maps to `target[i]`; if `target` is shorter,
/// trailing `source` bytes map to `target`'s last byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transliteration {
    pub source: Vec<u8>,
    pub target: Vec<u8>,
}

impl Transliteration {
    pub fn map_byte(&self, b: u8) -> u8 {
        match self.source.iter().position(|&s| s == b) {
            None => b,
            Some(idx) => {
                if idx < self.target.len() {
                    self.target[idx]
                } else {
                    *self.target.last().unwrap_or(&b)
                }
            }
        }
    }

    pub fn execute(&self, input: &[u8]) -> Vec<u8> {
        input.iter().map(|b| self.map_byte(*b)).collect()
    }
}
