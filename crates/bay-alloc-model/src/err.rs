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

use bay_alloc_core::location::{LocationParseError, SlotOutOfRangeError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("unknown ledger status `{value}`")]
pub struct LedgerStatusParseError {
    value: String,
}

impl LedgerStatusParseError {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Why a ledger row could not be turned into a local assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerRowError {
    #[error("row has no location")]
    MissingLocation,
    #[error(transparent)]
    Location(#[from] LocationParseError),
    #[error(transparent)]
    Slot(#[from] SlotOutOfRangeError),
}
