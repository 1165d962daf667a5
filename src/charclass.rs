//! Character classes
//!
//! Parses the content of a `[...]` class into a set of characters. Elements
//! are separated by `;`, `,` or `|` outside quotes and may be:
//!
//! - a quoted string, contributing each of its characters
//! - a range `"a"-"z"`, `#30-#39`, or any mix of quoted and hex endpoints
//! - a hex character `#41`
//! - a Unicode general category such as `L` or `Nd`

use crate::error::{GrammarError, Result};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use unicode_general_category::{get_general_category, GeneralCategory};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeSet {
    /// Sorted, non-overlapping ranges stored as (start, end) inclusive
    ranges: Vec<(char, char)>,
}

impl Default for RangeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeSet {
    pub fn new() -> Self {
        RangeSet { ranges: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn add_char(&mut self, ch: char) {
        self.add_range(ch, ch);
    }

    /// Add `start..=end`; a reversed range adds nothing
    pub fn add_range(&mut self, start: char, end: char) {
        if start > end {
            return;
        }
        self.ranges.push((start, end));
        self.normalize();
    }

    /// Sort and merge overlapping or adjacent ranges
    fn normalize(&mut self) {
        if self.ranges.len() <= 1 {
            return;
        }
        self.ranges.sort_by_key(|r| r.0);
        let mut merged = Vec::with_capacity(self.ranges.len());
        let mut current = self.ranges[0];

        for &(start, end) in &self.ranges[1..] {
            if start as u32 <= current.1 as u32 + 1 {
                current.1 = current.1.max(end);
            } else {
                merged.push(current);
                current = (start, end);
            }
        }
        merged.push(current);
        self.ranges = merged;
    }

    pub fn union(&self, other: &RangeSet) -> RangeSet {
        let mut result = self.clone();
        result.ranges.extend_from_slice(&other.ranges);
        result.normalize();
        result
    }

    pub fn contains(&self, ch: char) -> bool {
        self.ranges
            .iter()
            .any(|&(start, end)| start <= ch && ch <= end)
    }

    /// Number of characters in the set
    pub fn len(&self) -> usize {
        const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);
        self.ranges
            .iter()
            .map(|&(start, end)| {
                let (start, end) = (start as u32, end as u32);
                let span = end - start + 1;
                // chars never fall in the surrogate block, a range can only span it
                let gap = if start < SURROGATES.0 && end > SURROGATES.1 {
                    SURROGATES.1 - SURROGATES.0 + 1
                } else {
                    0
                };
                (span - gap) as usize
            })
            .sum()
    }

    /// Characters of the set in ascending order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.ranges.iter().flat_map(|&(start, end)| start..=end)
    }
}

/// Split class content at separators that are not inside quotes
fn split_charclass_content(content: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in content.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == ';' || ch == ',' || ch == '|' => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    elements.push(trimmed.to_string());
                }
                current.clear();
            }
            None => current.push(ch),
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        elements.push(trimmed.to_string());
    }

    elements
}

fn category_matches(cat: GeneralCategory, name: &str) -> Option<bool> {
    use GeneralCategory::*;

    let hit = match name {
        "L" => matches!(
            cat,
            UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter
        ),
        "LC" => matches!(cat, UppercaseLetter | LowercaseLetter | TitlecaseLetter),
        "M" => matches!(cat, NonspacingMark | SpacingMark | EnclosingMark),
        "N" => matches!(cat, DecimalNumber | LetterNumber | OtherNumber),
        "P" => matches!(
            cat,
            ConnectorPunctuation
                | DashPunctuation
                | OpenPunctuation
                | ClosePunctuation
                | InitialPunctuation
                | FinalPunctuation
                | OtherPunctuation
        ),
        "S" => matches!(cat, MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol),
        "Z" => matches!(cat, SpaceSeparator | LineSeparator | ParagraphSeparator),
        "C" => matches!(cat, Control | Format | Surrogate | PrivateUse | Unassigned),
        "Lu" => cat == UppercaseLetter,
        "Ll" => cat == LowercaseLetter,
        "Lt" => cat == TitlecaseLetter,
        "Lm" => cat == ModifierLetter,
        "Lo" => cat == OtherLetter,
        "Mn" => cat == NonspacingMark,
        "Mc" => cat == SpacingMark,
        "Me" => cat == EnclosingMark,
        "Nd" => cat == DecimalNumber,
        "Nl" => cat == LetterNumber,
        "No" => cat == OtherNumber,
        "Pc" => cat == ConnectorPunctuation,
        "Pd" => cat == DashPunctuation,
        "Ps" => cat == OpenPunctuation,
        "Pe" => cat == ClosePunctuation,
        "Pi" => cat == InitialPunctuation,
        "Pf" => cat == FinalPunctuation,
        "Po" => cat == OtherPunctuation,
        "Sm" => cat == MathSymbol,
        "Sc" => cat == CurrencySymbol,
        "Sk" => cat == ModifierSymbol,
        "So" => cat == OtherSymbol,
        "Zs" => cat == SpaceSeparator,
        "Zl" => cat == LineSeparator,
        "Zp" => cat == ParagraphSeparator,
        "Cc" => cat == Control,
        "Cf" => cat == Format,
        "Cs" => cat == Surrogate,
        "Co" => cat == PrivateUse,
        "Cn" => cat == Unassigned,
        _ => return None,
    };
    Some(hit)
}

/// Characters of a Unicode general category, major (`L`) or minor (`Lu`).
///
/// Computing a category scans every code point, so results are cached.
pub fn unicode_category_to_rangeset(category_name: &str) -> Option<RangeSet> {
    static CACHE: OnceLock<Mutex<HashMap<String, RangeSet>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(set) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(category_name)
    {
        return Some(set.clone());
    }

    // reject unknown names before the scan
    category_matches(GeneralCategory::Unassigned, category_name)?;

    let mut result = RangeSet::new();
    let mut run: Option<(char, char)> = None;

    for ch in (0u32..=0x10FFFF).filter_map(char::from_u32) {
        if category_matches(get_general_category(ch), category_name) == Some(true) {
            run = Some(match run {
                Some((start, _)) => (start, ch),
                None => (ch, ch),
            });
        } else if let Some((start, end)) = run.take() {
            result.add_range(start, end);
        }
    }
    if let Some((start, end)) = run {
        result.add_range(start, end);
    }

    cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(category_name.to_string(), result.clone());

    Some(result)
}

/// One side of a class element: a quoted string or a hex character
#[derive(Debug, PartialEq)]
enum Endpoint {
    Quoted(String),
    Hex(char),
}

impl Endpoint {
    fn single(self) -> Option<char> {
        match self {
            Endpoint::Hex(ch) => Some(ch),
            Endpoint::Quoted(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(ch),
                    _ => None,
                }
            }
        }
    }
}

/// Read an endpoint from the front of `s`, returning it and the rest
fn read_endpoint(s: &str) -> std::result::Result<(Endpoint, &str), String> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, quote @ ('"' | '\''))) => {
            let mut text = String::new();
            let mut rest = chars.peekable();
            while let Some((i, ch)) = rest.next() {
                if ch != quote {
                    text.push(ch);
                } else if rest.peek().is_some_and(|&(_, next)| next == quote) {
                    text.push(quote);
                    rest.next();
                } else {
                    return Ok((Endpoint::Quoted(text), &s[i + ch.len_utf8()..]));
                }
            }
            Err(format!("unterminated string in {}", s))
        }
        Some((_, '#')) => {
            let digits_end = s[1..]
                .find(|c: char| !c.is_ascii_hexdigit())
                .map_or(s.len(), |i| i + 1);
            let digits = &s[1..digits_end];
            u32::from_str_radix(digits, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|ch| (Endpoint::Hex(ch), &s[digits_end..]))
                .ok_or_else(|| format!("invalid hex character #{}", digits))
        }
        _ => Err(format!("unexpected element '{}'", s)),
    }
}

/// Add one separated element of a class to `set`
fn add_element(set: &mut RangeSet, element: &str) -> std::result::Result<(), String> {
    if !element.starts_with(&['"', '\'', '#'][..]) {
        let category = unicode_category_to_rangeset(element)
            .ok_or_else(|| format!("unknown Unicode category '{}'", element))?;
        *set = set.union(&category);
        return Ok(());
    }

    let (first, rest) = read_endpoint(element)?;
    let rest = rest.trim_start();

    if rest.is_empty() {
        match first {
            Endpoint::Hex(ch) => set.add_char(ch),
            Endpoint::Quoted(s) => s.chars().for_each(|ch| set.add_char(ch)),
        }
        return Ok(());
    }

    let Some(rest) = rest.strip_prefix('-') else {
        return Err(format!("unexpected '{}' after {:?}", rest, first));
    };
    let (last, trailing) = read_endpoint(rest.trim_start())?;
    if !trailing.trim().is_empty() {
        return Err(format!("unexpected '{}' after range", trailing.trim()));
    }

    match (first.single(), last.single()) {
        (Some(start), Some(end)) if start <= end => {
            set.add_range(start, end);
            Ok(())
        }
        (Some(_), Some(_)) => Err(format!("range {} is reversed", element)),
        _ => Err(format!("range endpoints in {} must be single characters", element)),
    }
}

/// Parse the content between the brackets of a class.
pub fn parse_class(content: &str) -> Result<RangeSet> {
    let mut set = RangeSet::new();
    for element in split_charclass_content(content) {
        add_element(&mut set, &element).map_err(|reason| GrammarError::UnsupportedClass {
            class: content.to_string(),
            reason,
        })?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_range() {
        let set = parse_class(r#""a"-"z""#).unwrap();
        assert_eq!(set.len(), 26);
        assert!(set.contains('m'));
        assert!(!set.contains('A'));
    }

    #[test]
    fn test_mixed_elements_merge() {
        let set = parse_class(r#""0"-"9"; "abc", #41-#43 | 'x'"#).unwrap();
        let chars: String = set.chars().collect();
        assert_eq!(chars, "0123456789ABCabcx");
    }

    #[test]
    fn test_separators_inside_quotes() {
        let set = parse_class(r#"";,|""#).unwrap();
        assert_eq!(set.chars().collect::<String>(), ",;|");
    }

    #[test]
    fn test_hex_and_quoted_endpoints() {
        let set = parse_class(r#"#30-"2""#).unwrap();
        assert_eq!(set.chars().collect::<String>(), "012");
    }

    #[test]
    fn test_unicode_category() {
        let set = parse_class("Nd").unwrap();
        assert!(set.contains('7'));
        assert!(set.contains('٣')); // ARABIC-INDIC DIGIT THREE
        assert!(!set.contains('a'));
        assert!(set.len() > 10);
    }

    #[test]
    fn test_len_skips_surrogates() {
        let mut set = RangeSet::new();
        set.add_range('\u{D7FF}', '\u{E000}');
        assert_eq!(set.len(), 2);
        assert_eq!(set.chars().count(), 2);
    }

    #[test]
    fn test_empty_class() {
        assert!(parse_class("").unwrap().is_empty());
        assert!(parse_class("  ;  ").unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        for content in [r#""z"-"a""#, r#""ab"-"z""#, "Xyz", r#""a" "b""#, "#zz"] {
            assert!(
                matches!(parse_class(content), Err(GrammarError::UnsupportedClass { .. })),
                "{} should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_union() {
        let mut a = RangeSet::new();
        a.add_range('a', 'c');
        let mut b = RangeSet::new();
        b.add_range('d', 'f');
        let u = a.union(&b);
        assert_eq!(u.len(), 6);
        assert_eq!(u.chars().collect::<String>(), "abcdef");
    }
}
