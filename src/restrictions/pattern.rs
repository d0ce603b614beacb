//! Pattern restriction
//!
//! Translates the regular expression of a format validator into an XSD
//! `pattern` facet. XSD patterns are implicitly anchored at both ends, so
//! explicit `^`/`\A` and `$`/`\z` anchors are stripped and an unanchored
//! side is padded with `[\s\S]*`. Constructs with no XSD counterpart
//! (lookaround, backreferences, word boundaries, lazy quantifiers, inline
//! flags, anchors in the middle of the expression) make the translation
//! fail, in which case no facet is written.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{options, ColumnDescriptor, ValidatorDescriptor, ValidatorKind};

use super::{unconditional, Facet, Restriction, RestrictionStrategy};

/// Padding for an unanchored side
const ANY_TEXT: &str = r"[\s\S]*";

static POSIX_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[:\^?[a-z]+:\]").unwrap());

/// Facets from format validators
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRestriction;

impl RestrictionStrategy for PatternRestriction {
    fn name(&self) -> &str {
        "pattern"
    }

    fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        for validator in unconditional(validators, &ValidatorKind::Format) {
            let Some(source) = validator
                .option_any(&[options::WITH, options::FORMAT])
                .and_then(|v| v.as_str())
            else {
                continue;
            };

            match translate(source) {
                Some(pattern) => restriction.push(Facet::Pattern(pattern)),
                None => tracing::warn!(
                    column = %column.name,
                    pattern = source,
                    "no XSD equivalent for format pattern, skipping"
                ),
            }
        }
    }
}

/// Translate a regular expression into XSD pattern syntax
pub fn translate(source: &str) -> Option<String> {
    if Regex::new(source).is_err() || POSIX_CLASS.is_match(source) {
        return None;
    }

    let (body, anchored_start) = strip_start_anchor(source);
    let (body, anchored_end) = strip_end_anchor(body);

    let mut out = String::with_capacity(body.len() + 2 * ANY_TEXT.len());
    if !anchored_start {
        out.push_str(ANY_TEXT);
    }
    translate_body(body, &mut out)?;
    if !anchored_end {
        out.push_str(ANY_TEXT);
    }
    Some(out)
}

fn strip_start_anchor(source: &str) -> (&str, bool) {
    if let Some(rest) = source.strip_prefix(r"\A") {
        (rest, true)
    } else if let Some(rest) = source.strip_prefix('^') {
        (rest, true)
    } else {
        (source, false)
    }
}

fn strip_end_anchor(body: &str) -> (&str, bool) {
    for anchor in [r"\z", "$"] {
        if let Some(rest) = body.strip_suffix(anchor) {
            // `\$` and `\\z` are literals, not anchors
            if trailing_backslashes(rest) % 2 == 0 {
                return (rest, true);
            }
        }
    }
    (body, false)
}

fn trailing_backslashes(s: &str) -> usize {
    s.chars().rev().take_while(|&c| c == '\\').count()
}

fn translate_body(body: &str, out: &mut String) -> Option<()> {
    let chars: Vec<char> = body.chars().collect();
    let mut in_class = false;
    let mut class_start = false;
    let mut after_quantifier = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let quantifier = !in_class && matches!(c, '*' | '+' | '?' | '}');

        match c {
            '\\' => {
                let next = *chars.get(i + 1)?;
                i += 1;
                translate_escape(next, &chars, &mut i, out)?;
            }
            '[' if in_class => {
                if chars.get(i + 1) == Some(&':') {
                    return None;
                }
                out.push_str(r"\[");
            }
            '[' => {
                in_class = true;
                class_start = true;
                out.push(c);
                i += 1;
                if chars.get(i) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                continue;
            }
            ']' if in_class && class_start => out.push_str(r"\]"),
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '&' if in_class && chars.get(i + 1) == Some(&'&') => return None,
            '^' | '$' if !in_class => return None,
            '(' if chars.get(i + 1) == Some(&'?') => {
                if chars.get(i + 2) == Some(&':') {
                    out.push('(');
                    i += 3;
                    after_quantifier = false;
                    class_start = false;
                    continue;
                }
                return None;
            }
            '?' | '+' if after_quantifier => return None,
            _ => out.push(c),
        }

        after_quantifier = quantifier;
        class_start = false;
        i += 1;
    }

    if in_class {
        return None;
    }
    Some(())
}

fn translate_escape(next: char, chars: &[char], i: &mut usize, out: &mut String) -> Option<()> {
    match next {
        // Escapes with the same meaning in XSD
        'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'n' | 'r' | 't' | '\\' | '|' | '.' | '-' | '^'
        | '?' | '*' | '+' | '{' | '}' | '(' | ')' | '[' | ']' => {
            out.push('\\');
            out.push(next);
        }
        'p' | 'P' => {
            out.push('\\');
            out.push(next);
            match chars.get(*i + 1) {
                Some('{') => {}
                Some(&letter) if letter.is_ascii_alphabetic() => {
                    out.push('{');
                    out.push(letter);
                    out.push('}');
                    *i += 1;
                }
                _ => return None,
            }
        }
        '$' => out.push('$'),
        // Escaped punctuation that is not special in XSD
        c if c.is_ascii_punctuation() || c == ' ' => out.push(c),
        _ => return None,
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_pattern() {
        assert_eq!(translate(r"\A[a-z]+\z").as_deref(), Some("[a-z]+"));
        assert_eq!(translate(r"^\d{3}-\d{4}$").as_deref(), Some(r"\d{3}-\d{4}"));
    }

    #[test]
    fn test_unanchored_pattern_is_padded() {
        assert_eq!(
            translate(r"@").as_deref(),
            Some(r"[\s\S]*@[\s\S]*")
        );
        assert_eq!(translate(r"^abc").as_deref(), Some(r"abc[\s\S]*"));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(translate(r"\Ahttps?:\/\/\S+\z").as_deref(), Some(r"https?://\S+"));
        assert_eq!(translate(r"\A\pL+\z").as_deref(), Some(r"\p{L}+"));
        assert_eq!(translate(r"\A\$\d+\z").as_deref(), Some(r"$\d+"));
        assert_eq!(translate(r"\Aprice\$").as_deref(), Some(r"price$[\s\S]*"));
    }

    #[test]
    fn test_non_capturing_group() {
        assert_eq!(translate(r"\A(?:ab)+\z").as_deref(), Some("(ab)+"));
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(translate(r"\A[^\s@]+\z").as_deref(), Some(r"[^\s@]+"));
        assert_eq!(translate(r"\A[]a]\z").as_deref(), Some(r"[\]a]"));
        assert_eq!(translate(r"\A[$^]\z").as_deref(), Some("[$^]"));
    }

    #[test]
    fn test_untranslatable_patterns() {
        assert_eq!(translate(r"\bword\b"), None);
        assert_eq!(translate(r"(?i)abc"), None);
        assert_eq!(translate(r"a.*?b"), None);
        assert_eq!(translate(r"(a)\1"), None);
        assert_eq!(translate(r"a^b"), None);
        assert_eq!(translate(r"\A[[:alpha:]]+\z"), None);
        assert_eq!(translate(r"\x41"), None);
        assert_eq!(translate(r"(unclosed"), None);
    }

    #[test]
    fn test_conditional_format_writes_nothing() {
        use crate::types::{map_type, ColumnType};

        let column = ColumnDescriptor::new("slug", ColumnType::String);
        let mut restriction = Restriction::new(map_type(&column.column_type).unwrap());
        let validators = vec![
            ValidatorDescriptor::format("slug", r"\A[a-z-]+\z").with_option(options::UNLESS, "draft?"),
            ValidatorDescriptor::format("slug", r"(?=x)"),
        ];
        PatternRestriction.apply(&column, &validators, &mut restriction);
        assert!(restriction.is_empty());
    }
}
