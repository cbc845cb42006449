//! `match`/`extract_substrings`/`substitute` against a compiled pattern
//! (§4.7).

use strand_value::pattern::{CompiledRegex, CompiledSubst};
use strand_value::Value;

pub fn matches(pattern: &CompiledRegex, target: &str) -> bool {
    pattern.engine.is_match(target)
}

/// `extract_substrings`: captured groups of the first match, or — in
/// `global` mode — every group of every non-overlapping match in sequence,
/// flattened into one list (§4.7). Unmatched groups appear as `Nothing`.
pub fn extract_substrings(pattern: &CompiledRegex, target: &str) -> Vec<Value> {
    let mut out = Vec::new();
    if pattern.options.global {
        for caps in pattern.engine.captures_iter(target) {
            push_groups(&caps, &mut out);
        }
    } else if let Some(caps) = pattern.engine.captures(target) {
        push_groups(&caps, &mut out);
    }
    out
}

fn push_groups(caps: &regex::Captures<'_>, out: &mut Vec<Value>) {
    // Group 0 is the whole match; callers want the capture groups only.
    for i in 1..caps.len() {
        match caps.get(i) {
            Some(m) => out.push(Value::string(m.as_str())),
            None => out.push(Value::Nothing),
        }
    }
}

/// `substitute`: `\$` is a literal dollar, `$N` references group N (clipped
/// to the valid range; references beyond the actual group count are
/// dropped silently). Exactly one substitution unless the pattern is
/// `global`, in which case every match is replaced (§4.7).
pub fn substitute(subst: &CompiledSubst, target: &str) -> String {
    let engine = &subst.regex.engine;
    if subst.regex.options.global {
        let mut out = String::new();
        let mut last_end = 0;
        for caps in engine.captures_iter(target) {
            let m = caps.get(0).expect("whole match always present");
            out.push_str(&target[last_end..m.start()]);
            expand_template(&subst.template, &caps, &mut out);
            last_end = m.end();
        }
        out.push_str(&target[last_end..]);
        out
    } else if let Some(caps) = engine.captures(target) {
        let m = caps.get(0).expect("whole match always present");
        let mut out = String::with_capacity(target.len());
        out.push_str(&target[..m.start()]);
        expand_template(&subst.template, &caps, &mut out);
        out.push_str(&target[m.end()..]);
        out
    } else {
        target.to_string()
    }
}

/// Expands `\$` and `$N` against one match's captures into `out`. Any other
/// backslash escape or bare character is copied through unchanged.
fn expand_template(template: &str, caps: &regex::Captures<'_>, out: &mut String) {
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && bytes[i + 1] == b'$' => {
                out.push('$');
                i += 2;
            }
            b'$' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > i + 1 {
                    if let Ok(n) = template[i + 1..j].parse::<usize>() {
                        // Out-of-range group references are dropped silently.
                        if let Some(m) = caps.get(n) {
                            out.push_str(m.as_str());
                        }
                    }
                    i = j;
                } else {
                    out.push('$');
                    i += 1;
                }
            }
            _ => {
                // Byte-level scanning for the ASCII markers above is safe
                // inside UTF-8 (0x00-0x7F never appears inside a multi-byte
                // sequence), but the pass-through char itself may be
                // multi-byte, so re-decode it rather than casting the byte.
                let ch = template[i..].chars().next().expect("non-empty at a char boundary");
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PatternCache;
    use strand_value::pattern::RegexOptions;

    #[test]
    fn match_reports_presence() {
        let cache = PatternCache::new();
        let p = cache.compile(r"\d+", RegexOptions::default()).unwrap();
        assert!(matches(&p, "abc123"));
        assert!(!matches(&p, "abc"));
    }

    #[test]
    fn extract_substrings_non_global_takes_first_match_only() {
        let cache = PatternCache::new();
        let p = cache.compile(r"(\w)=(\d+)", RegexOptions::default()).unwrap();
        let groups = extract_substrings(&p, "a=1 b=2");
        assert_eq!(groups, vec![Value::string("a"), Value::string("1")]);
    }

    #[test]
    fn extract_substrings_global_flattens_every_match() {
        let cache = PatternCache::new();
        let p = cache
            .compile(r"(\w)=(\d+)", RegexOptions { global: true, ..Default::default() })
            .unwrap();
        let groups = extract_substrings(&p, "a=1 b=2");
        assert_eq!(
            groups,
            vec![Value::string("a"), Value::string("1"), Value::string("b"), Value::string("2")]
        );
    }

    #[test]
    fn substitute_single_replaces_first_match_with_group_reference() {
        let cache = PatternCache::new();
        let subst = cache.compile_subst(r"(\w+)@(\w+)", RegexOptions::default(), "$2@$1").unwrap();
        assert_eq!(substitute(&subst, "user@host other@thing"), "host@user other@thing");
    }

    #[test]
    fn substitute_global_replaces_every_match() {
        let cache = PatternCache::new();
        let subst = cache
            .compile_subst(r"\d+", RegexOptions { global: true, ..Default::default() }, "N")
            .unwrap();
        assert_eq!(substitute(&subst, "a1b22c333"), "aNbNcN");
    }

    #[test]
    fn substitute_escapes_literal_dollar_and_drops_out_of_range_group() {
        let cache = PatternCache::new();
        let subst = cache.compile_subst(r"(\w+)", RegexOptions::default(), r"\$$9-$1").unwrap();
        assert_eq!(substitute(&subst, "abc"), "$-abc");
    }
}
