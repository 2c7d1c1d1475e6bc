//! Shader substitution protocol (spec 6): a `KEY:VALUE ...` replacements
//! string drives textual substitution of `-KEY` occurrences in shader
//! source. Per spec 9's open question, a value that itself contains the
//! `:` separator is treated as opaque - everything after the first colon
//! is taken verbatim rather than re-parsed.

use fxhash::FxHashMap;

/// Parses a whitespace-separated `KEY:VALUE` string into a replacement
/// map. Only the first `:` in each token is significant; a value
/// containing further colons is carried through unchanged.
pub fn parse_replacements(spec: &str) -> FxHashMap<String, String> {
    spec.split_whitespace()
        .filter_map(|token| token.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// A replacement value is only emitted if it looks like a recognized
/// option token (alnum, `_`, `.`, `-`) - this keeps whitespace or
/// delimiter characters out of the substituted text, which is what makes
/// a second `substitute` pass over fully-covering replacements a no-op.
fn is_recognized_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Replaces every `-KEY` occurrence in `text` with its mapped value.
/// Unknown keys, and keys whose value fails [`is_recognized_value`], pass
/// through unchanged.
pub fn substitute(text: &str, replacements: &FxHashMap<String, String>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '-' {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let key: String = chars[i + 1..j].iter().collect();
            if !key.is_empty() {
                if let Some(value) = replacements.get(&key).filter(|v| is_recognized_value(v)) {
                    out.push_str(value);
                    i = j;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_is_replaced() {
        let reps = parse_replacements("LIGHT_COUNT:3 BLEND:off");
        assert_eq!(substitute("count = -LIGHT_COUNT;", &reps), "count = 3;");
    }

    #[test]
    fn unknown_key_passes_through_unchanged() {
        let reps = parse_replacements("LIGHT_COUNT:3");
        assert_eq!(substitute("-UNKNOWN thing", &reps), "-UNKNOWN thing");
    }

    #[test]
    fn value_containing_the_separator_is_taken_opaque() {
        let reps = parse_replacements("PATH:a:b:c");
        assert_eq!(reps.get("PATH").unwrap(), "a:b:c");
    }

    #[test]
    fn fully_covering_replacements_are_idempotent() {
        let reps = parse_replacements("A:1 B:2 C:3");
        let text = "-A + -B + -C";
        let once = substitute(text, &reps);
        let twice = substitute(&once, &reps);
        assert_eq!(once, twice);
    }
}
