//! Compiled-pattern cache: a pattern is compiled via the embedded engine on
//! first use and reused by (source, options) thereafter (§4.7: "compiled on
//! first use").

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::RegexBuilder;

use strand_value::pattern::{CompiledRegex, CompiledSubst, RegexOptions};

use crate::error::RegexError;

#[derive(Default)]
pub struct PatternCache {
    regexes: Mutex<HashMap<(String, RegexOptions), Arc<CompiledRegex>>>,
    substs: Mutex<HashMap<(String, RegexOptions, String), Arc<CompiledSubst>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        PatternCache::default()
    }

    pub fn compile(&self, source: &str, options: RegexOptions) -> Result<Arc<CompiledRegex>, RegexError> {
        let key = (source.to_string(), options);
        if let Some(cached) = self.regexes.lock().get(&key) {
            return Ok(cached.clone());
        }
        let compiled = Arc::new(build_regex(source, options)?);
        self.regexes.lock().insert(key, compiled.clone());
        Ok(compiled)
    }

    pub fn compile_subst(
        &self,
        source: &str,
        options: RegexOptions,
        template: &str,
    ) -> Result<Arc<CompiledSubst>, RegexError> {
        let key = (source.to_string(), options, template.to_string());
        if let Some(cached) = self.substs.lock().get(&key) {
            return Ok(cached.clone());
        }
        let regex = build_regex(source, options)?;
        let compiled = Arc::new(CompiledSubst { regex, template: template.to_string() });
        self.substs.lock().insert(key, compiled.clone());
        Ok(compiled)
    }
}

fn build_regex(source: &str, options: RegexOptions) -> Result<CompiledRegex, RegexError> {
    let engine = RegexBuilder::new(source)
        .case_insensitive(options.case_insensitive)
        .dot_matches_new_line(options.dot_matches_all)
        .multi_line(options.multi_line)
        .ignore_whitespace(options.extended)
        .build()
        .map_err(|e| RegexError::InvalidPattern { source: source.to_string(), message: e.to_string() })?;
    Ok(CompiledRegex { source: source.to_string(), options, engine })
}

/// The process-wide cache used by the builtin regex operators. A program
/// doesn't own one itself — patterns are plain values and compiling the
/// same literal pattern twice in unrelated programs should still share one
/// compiled engine.
pub fn global() -> &'static PatternCache {
    static CACHE: Lazy<PatternCache> = Lazy::new(PatternCache::new);
    &CACHE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_pattern_and_options_share_one_compiled_engine() {
        let cache = PatternCache::new();
        let a = cache.compile("a+", RegexOptions::default()).unwrap();
        let b = cache.compile("a+", RegexOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_options_compile_separately() {
        let cache = PatternCache::new();
        let a = cache.compile("a+", RegexOptions::default()).unwrap();
        let b = cache
            .compile("a+", RegexOptions { case_insensitive: true, ..Default::default() })
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalid_pattern_errors() {
        let cache = PatternCache::new();
        assert!(matches!(cache.compile("(", RegexOptions::default()), Err(RegexError::InvalidPattern { .. })));
    }
}
