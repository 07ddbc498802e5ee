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

//! Rows of the remote occupancy ledger.
//!
//! The ledger is an external key-value table; these types mirror its columns
//! as stored, so a row may carry a location or slot the engine rejects.

use crate::{
    err::{LedgerRowError, LedgerStatusParseError},
    id::{PalletId, ProjectId, TruckId},
};
use bay_alloc_core::location::{LocationId, Slot};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LedgerStatus {
    Scanned,
    Delivered,
}

impl LedgerStatus {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Scanned => "scanned",
            LedgerStatus::Delivered => "delivered",
        }
    }
}

impl Display for LedgerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerStatus {
    type Err = LedgerStatusParseError;

    /// Case-insensitive; also accepts the Spanish spellings older rows were
    /// written with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scanned" | "escaneado" => Ok(LedgerStatus::Scanned),
            "delivered" | "entregado" => Ok(LedgerStatus::Delivered),
            _ => Err(LedgerStatusParseError::new(s)),
        }
    }
}

impl TryFrom<String> for LedgerStatus {
    type Error = LedgerStatusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LedgerStatus> for String {
    fn from(value: LedgerStatus) -> Self {
        value.as_str().to_string()
    }
}

/// One stored occupancy row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerRow {
    truck: TruckId,
    pallet: PalletId,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    slot: Option<u8>,
    status: LedgerStatus,
    #[serde(default)]
    project_id: ProjectId,
}

impl LedgerRow {
    #[inline]
    pub fn new(
        truck: TruckId,
        pallet: PalletId,
        location: Option<String>,
        slot: Option<u8>,
        status: LedgerStatus,
    ) -> Self {
        Self {
            truck,
            pallet,
            location,
            slot,
            status,
            project_id: ProjectId::default(),
        }
    }

    #[inline]
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = project_id;
        self
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
    pub fn raw_location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[inline]
    pub fn raw_slot(&self) -> Option<u8> {
        self.slot
    }

    #[inline]
    pub fn status(&self) -> LedgerStatus {
        self.status
    }

    #[inline]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    #[inline]
    pub fn set_status(&mut self, status: LedgerStatus) {
        self.status = status;
    }

    /// Parses the stored location and slot. A missing slot counts as slot 1.
    pub fn placement(&self) -> Result<(LocationId, Slot), LedgerRowError> {
        let raw = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(LedgerRowError::MissingLocation)?;
        let location: LocationId = raw.parse()?;
        let slot = Slot::try_from(self.slot.unwrap_or(1))?;
        Ok((location, slot))
    }
}

/// Payload of a single scan insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanInsert {
    location: LocationId,
    truck: TruckId,
    pallet: PalletId,
    slot: Slot,
    project_id: ProjectId,
    status: LedgerStatus,
}

impl ScanInsert {
    #[inline]
    pub fn new(
        location: LocationId,
        truck: TruckId,
        pallet: PalletId,
        slot: Slot,
        project_id: ProjectId,
    ) -> Self {
        Self {
            location,
            truck,
            pallet,
            slot,
            project_id,
            status: LedgerStatus::Scanned,
        }
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
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
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    #[inline]
    pub fn status(&self) -> LedgerStatus {
        self.status
    }
}

impl From<ScanInsert> for LedgerRow {
    fn from(value: ScanInsert) -> Self {
        LedgerRow::new(
            value.truck,
            value.pallet,
            Some(value.location.to_string()),
            Some(value.slot.value()),
            value.status,
        )
        .with_project(value.project_id)
    }
}

impl Display for ScanInsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScanInsert({} / {} -> {} slot {})",
            self.truck, self.pallet, self.location, self.slot
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: Option<&str>, slot: Option<u8>) -> LedgerRow {
        LedgerRow::new(
            TruckId::new("T1"),
            PalletId::new("001"),
            location.map(str::to_string),
            slot,
            LedgerStatus::Scanned,
        )
    }

    #[test]
    fn test_status_accepts_both_spellings() {
        assert_eq!("scanned".parse::<LedgerStatus>().unwrap(), LedgerStatus::Scanned);
        assert_eq!("Escaneado".parse::<LedgerStatus>().unwrap(), LedgerStatus::Scanned);
        assert_eq!(" ENTREGADO ".parse::<LedgerStatus>().unwrap(), LedgerStatus::Delivered);
        assert_eq!("delivered".parse::<LedgerStatus>().unwrap(), LedgerStatus::Delivered);
        assert_eq!("lost".parse::<LedgerStatus>().unwrap_err().value(), "lost");
    }

    #[test]
    fn test_placement_defaults_slot_to_one() {
        let (loc, slot) = row(Some("C2-4"), None).placement().unwrap();
        assert_eq!(loc.to_string(), "C2-4");
        assert_eq!(slot, Slot::First);
    }

    #[test]
    fn test_placement_rejects_bad_rows() {
        assert_eq!(row(None, Some(1)).placement(), Err(LedgerRowError::MissingLocation));
        assert_eq!(row(Some("  "), Some(1)).placement(), Err(LedgerRowError::MissingLocation));
        assert!(matches!(
            row(Some("Z"), Some(1)).placement(),
            Err(LedgerRowError::Location(_))
        ));
        assert!(matches!(
            row(Some("C1-1"), Some(3)).placement(),
            Err(LedgerRowError::Slot(_))
        ));
    }

    #[test]
    fn test_insert_becomes_scanned_row() {
        let insert = ScanInsert::new(
            "C1-2".parse().unwrap(),
            TruckId::new("T9"),
            PalletId::new("004"),
            Slot::Second,
            ProjectId::new("p1"),
        );
        let row = LedgerRow::from(insert);
        assert_eq!(row.status(), LedgerStatus::Scanned);
        assert_eq!(row.raw_location(), Some("C1-2"));
        assert_eq!(row.raw_slot(), Some(2));
        assert_eq!(row.project_id().as_str(), "p1");
    }

    #[test]
    fn test_row_deserializes_with_missing_columns() {
        let json = r#"{"truck":"T1","pallet":"003","status":"entregado"}"#;
        let row: LedgerRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.status(), LedgerStatus::Delivered);
        assert_eq!(row.raw_location(), None);
        assert_eq!(row.project_id(), &ProjectId::default());
    }
}
