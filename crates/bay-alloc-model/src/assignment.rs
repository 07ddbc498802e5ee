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

use crate::id::{PalletId, TruckId};
use bay_alloc_core::location::{LocationId, Slot};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A pallet's placement in one slot of a location. The location itself is
/// the key the assignment is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    truck: TruckId,
    pallet: PalletId,
    slot: Slot,
}

impl Assignment {
    #[inline]
    pub fn new(truck: TruckId, pallet: PalletId, slot: Slot) -> Self {
        Self {
            truck,
            pallet,
            slot,
        }
    }

    #[inline]
    pub fn truck(&self) -> &TruckId {
        &self.truck
    }

    #[inline]
    pub fn pallet(&self) -> &PalletId {
        &self.pallet
    }

    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    #[inline]
    pub fn belongs_to(&self, truck: &TruckId) -> bool {
        &self.truck == truck
    }

    #[inline]
    pub fn is_for(&self, truck: &TruckId, pallet: &PalletId) -> bool {
        &self.truck == truck && &self.pallet == pallet
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slot {}: Pallet {} (Truck {})",
            self.slot, self.pallet, self.truck
        )
    }
}

/// Where a pallet ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    location: LocationId,
    slot: Slot,
}

impl Placement {
    #[inline]
    pub fn new(location: LocationId, slot: Slot) -> Self {
        Self { location, slot }
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Slot {})", self.location, self.slot)
    }
}

/// Marks a `(truck, pallet)` pair as scanned. Membership only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScanRecord {
    truck: TruckId,
    pallet: PalletId,
}

impl ScanRecord {
    #[inline]
    pub fn new(truck: TruckId, pallet: PalletId) -> Self {
        Self { truck, pallet }
    }

    #[inline]
    pub fn truck(&self) -> &TruckId {
        &self.truck
    }

    #[inline]
    pub fn pallet(&self) -> &PalletId {
        &self.pallet
    }
}

impl Display for ScanRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scan({}, {})", self.truck, self.pallet)
    }
}
