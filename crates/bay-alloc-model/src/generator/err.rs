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

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid range for {what}: min {min} exceeds max {max}")]
pub struct InvalidRangeError {
    what: &'static str,
    min: u32,
    max: u32,
}

impl InvalidRangeError {
    pub fn new(what: &'static str, min: u32, max: u32) -> Self {
        Self { what, min, max }
    }
    pub fn what(&self) -> &'static str {
        self.what
    }
    pub fn min(&self) -> u32 {
        self.min
    }
    pub fn max(&self) -> u32 {
        self.max
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioGenConfigError {
    #[error("bay letter {0:?} is not an ASCII uppercase letter")]
    InvalidBayLetter(char),
    #[error("a scenario needs at least one bay")]
    NoBays,
    #[error("a bay needs at least one group")]
    NoGroups,
    #[error("a scenario needs at least one truck")]
    NoTrucks,
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    #[error("pallet numbers above 999 do not fit the three digit code ({0} needed)")]
    TooManyPallets(u64),
    #[error("cell dimensions must be positive, got {width}x{height}")]
    InvalidCell { width: f64, height: f64 },
    #[error("duplicate scan rate {0} is outside [0, 1]")]
    InvalidDuplicateRate(f64),
}
