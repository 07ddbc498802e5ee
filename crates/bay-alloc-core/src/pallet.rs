// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Extraction of pallet ordinals from scanned or typed pallet codes.
//!
//! Codes in the field come in many shapes (`PALLET007`, `PLT-012`, `00045`,
//! `P_03-A`), so the parser is a best-effort heuristic: an ordered list of
//! matchers is tried and the first one that yields a number wins. No range
//! validation happens here.

use regex::Regex;
use std::{fmt::Display, num::NonZeroU32};

/// A pallet number as used for slot computation. Always `>= 1`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PalletOrdinal(NonZeroU32);

impl PalletOrdinal {
    #[inline]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0.get()
    }
}

impl Display for PalletOrdinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PalletOrdinal({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    TrailingDigits,
    PrefixedDigits,
    TailFallback,
}

impl Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherKind::TrailingDigits => write!(f, "trailing-digits"),
            MatcherKind::PrefixedDigits => write!(f, "prefixed-digits"),
            MatcherKind::TailFallback => write!(f, "tail-fallback"),
        }
    }
}

/// A single extraction strategy.
#[derive(Debug, Clone)]
pub enum PalletCodeMatcher {
    /// A run of 2-3 digits anchored at the end of the code.
    TrailingDigits(Regex),
    /// `PALLET`, `PLT` or `P`, an optional `_`/`-`, then 2-3 digits; anywhere, any case.
    PrefixedDigits(Regex),
    /// The last three characters if all digits, else the last two if all digits.
    TailFallback,
}

impl PalletCodeMatcher {
    pub fn trailing_digits() -> Self {
        PalletCodeMatcher::TrailingDigits(
            Regex::new(r"([0-9]{2,3})$").expect("valid trailing digits pattern"),
        )
    }

    pub fn prefixed_digits() -> Self {
        PalletCodeMatcher::PrefixedDigits(
            Regex::new(r"(?i)(?:PALLET|PLT|P)[_-]?([0-9]{2,3})")
                .expect("valid prefixed digits pattern"),
        )
    }

    #[inline]
    pub fn tail_fallback() -> Self {
        PalletCodeMatcher::TailFallback
    }

    #[inline]
    pub fn kind(&self) -> MatcherKind {
        match self {
            PalletCodeMatcher::TrailingDigits(_) => MatcherKind::TrailingDigits,
            PalletCodeMatcher::PrefixedDigits(_) => MatcherKind::PrefixedDigits,
            PalletCodeMatcher::TailFallback => MatcherKind::TailFallback,
        }
    }

    /// Applies this strategy alone. Never panics; anything that does not
    /// produce a number is `None`.
    pub fn extract(&self, code: &str) -> Option<u32> {
        match self {
            PalletCodeMatcher::TrailingDigits(re) | PalletCodeMatcher::PrefixedDigits(re) => re
                .captures(code)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            PalletCodeMatcher::TailFallback => Self::tail_digits(code),
        }
    }

    fn tail_digits(code: &str) -> Option<u32> {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() < 2 {
            return None;
        }
        let all_digits = |s: &[char]| !s.is_empty() && s.iter().all(|c| c.is_ascii_digit());
        let last3 = &chars[chars.len().saturating_sub(3)..];
        let tail = if all_digits(last3) {
            last3
        } else {
            &chars[chars.len() - 2..]
        };
        if !all_digits(tail) {
            return None;
        }
        tail.iter().collect::<String>().parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PalletCodeMatch {
    value: u32,
    matcher: MatcherKind,
}

impl PalletCodeMatch {
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn matcher(&self) -> MatcherKind {
        self.matcher
    }

    #[inline]
    pub fn ordinal(&self) -> Option<PalletOrdinal> {
        PalletOrdinal::new(self.value)
    }
}

/// Ordered chain of [`PalletCodeMatcher`]s.
///
/// ```
/// use bay_alloc_core::pallet::PalletCodeParser;
///
/// let parser = PalletCodeParser::default();
/// assert_eq!(parser.parse("PALLET007"), Some(7));
/// assert_eq!(parser.parse("PLT-012"), Some(12));
/// assert_eq!(parser.parse("00045"), Some(45));
/// assert_eq!(parser.parse("AB"), None);
/// ```
#[derive(Debug, Clone)]
pub struct PalletCodeParser {
    matchers: Vec<PalletCodeMatcher>,
}

impl Default for PalletCodeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PalletCodeParser {
    pub fn new() -> Self {
        Self::with_matchers(vec![
            PalletCodeMatcher::trailing_digits(),
            PalletCodeMatcher::prefixed_digits(),
            PalletCodeMatcher::tail_fallback(),
        ])
    }

    #[inline]
    pub fn with_matchers(matchers: Vec<PalletCodeMatcher>) -> Self {
        Self { matchers }
    }

    #[inline]
    pub fn matchers(&self) -> &[PalletCodeMatcher] {
        &self.matchers
    }

    /// Runs the matchers in order. A trailing line break left by the
    /// scanner is dropped first; only ASCII digits count as digits.
    pub fn parse_detailed(&self, code: &str) -> Option<PalletCodeMatch> {
        let code = code.trim_end_matches(['\r', '\n']);
        self.matchers.iter().find_map(|m| {
            m.extract(code).map(|value| PalletCodeMatch {
                value,
                matcher: m.kind(),
            })
        })
    }

    #[inline]
    pub fn parse(&self, code: &str) -> Option<u32> {
        self.parse_detailed(code).map(|m| m.value())
    }

    /// Like [`parse`](Self::parse), but `0` counts as no match.
    #[inline]
    pub fn parse_ordinal(&self, code: &str) -> Option<PalletOrdinal> {
        self.parse(code).and_then(PalletOrdinal::new)
    }
}
