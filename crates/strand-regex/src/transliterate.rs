//! Compiles a transliteration's `source`/`target` character-set
//! specifications (with `a-z`-style range expansion) into the flat byte
//! tables `Transliteration::execute` maps through (§4.7).

use strand_value::pattern::Transliteration;

use crate::error::RegexError;

/// Expands `a-z` ranges in a transliteration spec into the literal bytes it
/// denotes. A bare `-` at the start or end of the spec, or next to another
/// `-`, is a literal hyphen rather than a range marker.
pub fn expand_ranges(spec: &str) -> Result<Vec<u8>, RegexError> {
    let bytes: Vec<u8> = spec.bytes().collect();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let is_range = i + 2 < bytes.len() && bytes[i + 1] == b'-';
        if is_range {
            let (start, end) = (bytes[i], bytes[i + 2]);
            if start > end {
                return Err(RegexError::InvalidRange { range: format!("{}-{}", start as char, end as char) });
            }
            out.extend(start..=end);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

pub fn compile(source_spec: &str, target_spec: &str) -> Result<Transliteration, RegexError> {
    let source = expand_ranges(source_spec)?;
    if source.is_empty() {
        return Err(RegexError::InvalidRange { range: source_spec.to_string() });
    }
    let target = expand_ranges(target_spec)?;
    Ok(Transliteration { source, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_a_simple_range() {
        assert_eq!(expand_ranges("a-e").unwrap(), b"abcde");
    }

    #[test]
    fn mixes_literal_chars_and_ranges() {
        assert_eq!(expand_ranges("xa-cz").unwrap(), b"xabcz");
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(expand_ranges("z-a"), Err(RegexError::InvalidRange { .. })));
    }

    #[test]
    fn rejects_empty_source_spec() {
        assert!(matches!(compile("", "x"), Err(RegexError::InvalidRange { .. })));
    }

    #[test]
    fn shorter_target_maps_missing_positions_to_its_last_byte() {
        let t = compile("abcde", "12").unwrap();
        assert_eq!(t.execute(b"abcde"), b"12222");
    }
}
