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

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Number of pallets a single location holds.
pub const LOCATION_CAPACITY: usize = 2;

/// Canonical decimal only: ASCII digits without leading zeros, so that
/// every accepted identifier displays exactly as it was written.
#[inline]
fn parse_ascii_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("invalid bay prefix `{input}`: expected an uppercase letter followed by digits")]
pub struct BayPrefixParseError {
    input: String,
}

impl BayPrefixParseError {
    #[inline]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A physical truck bay, e.g. `C1`.
///
/// Bays order by their number first and their letter second, which is the
/// order in which free bays are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BayPrefix {
    number: u32,
    letter: u8,
}

impl BayPrefix {
    /// Creates a bay prefix from an uppercase ASCII letter and a bay number.
    ///
    /// Returns `None` if `letter` is not in `A..=Z`.
    ///
    /// ```
    /// use bay_alloc_core::location::BayPrefix;
    ///
    /// let bay = BayPrefix::new('C', 2).unwrap();
    /// assert_eq!(bay.to_string(), "C2");
    /// assert!(BayPrefix::new('c', 2).is_none());
    /// ```
    #[inline]
    pub fn new(letter: char, number: u32) -> Option<Self> {
        if letter.is_ascii_uppercase() {
            Some(Self {
                number,
                letter: letter as u8,
            })
        } else {
            None
        }
    }

    #[inline]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub const fn letter(&self) -> char {
        self.letter as char
    }

    #[inline]
    pub fn location(&self, group: u32) -> LocationId {
        LocationId::new(*self, group)
    }
}

impl Display for BayPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.letter(), self.number)
    }
}

impl FromStr for BayPrefix {
    type Err = BayPrefixParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(|| BayPrefixParseError::new(s))?;
        let number =
            parse_ascii_digits(chars.as_str()).ok_or_else(|| BayPrefixParseError::new(s))?;
        BayPrefix::new(letter, number).ok_or_else(|| BayPrefixParseError::new(s))
    }
}

impl TryFrom<String> for BayPrefix {
    type Error = BayPrefixParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BayPrefix> for String {
    fn from(value: BayPrefix) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("invalid location identifier `{input}`: expected `<Letter><Bay>-<Group>`")]
pub struct LocationParseError {
    input: String,
}

impl LocationParseError {
    #[inline]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An addressable slot-group within a bay, written `<Bay>-<Group>` (e.g. `C1-3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationId {
    bay: BayPrefix,
    group: u32,
}

impl LocationId {
    #[inline]
    pub const fn new(bay: BayPrefix, group: u32) -> Self {
        Self { bay, group }
    }

    #[inline]
    pub const fn bay(&self) -> BayPrefix {
        self.bay
    }

    #[inline]
    pub const fn group(&self) -> u32 {
        self.group
    }

    #[inline]
    pub fn is_in_bay(&self, bay: BayPrefix) -> bool {
        self.bay == bay
    }
}

impl Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.bay, self.group)
    }
}

impl FromStr for LocationId {
    type Err = LocationParseError;

    /// Accepts exactly `^[A-Z]\d+-\d+$` with no leading zeros.
    ///
    /// ```
    /// use bay_alloc_core::location::LocationId;
    ///
    /// let loc: LocationId = "C1-3".parse().unwrap();
    /// assert_eq!(loc.bay().number(), 1);
    /// assert_eq!(loc.group(), 3);
    /// assert!("C1-".parse::<LocationId>().is_err());
    /// assert!("1-3".parse::<LocationId>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bay, group) = s.split_once('-').ok_or_else(|| LocationParseError::new(s))?;
        let bay: BayPrefix = bay.parse().map_err(|_| LocationParseError::new(s))?;
        let group = parse_ascii_digits(group).ok_or_else(|| LocationParseError::new(s))?;
        Ok(LocationId::new(bay, group))
    }
}

impl TryFrom<String> for LocationId {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocationId> for String {
    fn from(value: LocationId) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("slot {value} is out of range; a location has slots 1 and 2")]
pub struct SlotOutOfRangeError {
    value: u8,
}

impl SlotOutOfRangeError {
    #[inline]
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }
}

/// One of the two pallet positions of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub const ALL: [Slot; LOCATION_CAPACITY] = [Slot::First, Slot::Second];

    #[inline]
    pub const fn value(self) -> u8 {
        match self {
            Slot::First => 1,
            Slot::Second => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = SlotOutOfRangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::First),
            2 => Ok(Slot::Second),
            other => Err(SlotOutOfRangeError::new(other)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(value: Slot) -> Self {
        value.value()
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
