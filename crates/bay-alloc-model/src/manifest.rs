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

//! Shipment manifest and packing list, as produced by the ingestion side.

use crate::id::{PalletId, TruckId};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

/// Status values written back into the shipment manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Ready,
    Delivered,
}

impl ShipmentStatus {
    /// The literal the manifest expects in its status column.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Ready => "Listo",
            ShipmentStatus::Delivered => "Entregado",
        }
    }
}

impl Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    truck_id: TruckId,
    pallet_range_start: String,
    pallet_range_end: String,
    #[serde(default)]
    status: Option<String>,
}

impl ManifestEntry {
    #[inline]
    pub fn new(
        truck_id: TruckId,
        pallet_range_start: impl Into<String>,
        pallet_range_end: impl Into<String>,
        status: Option<String>,
    ) -> Self {
        Self {
            truck_id,
            pallet_range_start: pallet_range_start.into(),
            pallet_range_end: pallet_range_end.into(),
            status,
        }
    }

    #[inline]
    pub fn truck_id(&self) -> &TruckId {
        &self.truck_id
    }

    #[inline]
    pub fn pallet_range_start(&self) -> &str {
        &self.pallet_range_start
    }

    #[inline]
    pub fn pallet_range_end(&self) -> &str {
        &self.pallet_range_end
    }

    #[inline]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Still waiting to be loaded: the status does not say `LISTO`.
    #[inline]
    pub fn is_pending(&self) -> bool {
        !self
            .status
            .as_deref()
            .is_some_and(|s| s.to_uppercase().contains("LISTO"))
    }

    /// Whether `pallet` falls inside this entry's pallet range.
    ///
    /// Compares numerically when bounds and pallet all read as numbers,
    /// lexically otherwise.
    pub fn contains_pallet(&self, pallet: &PalletId) -> bool {
        let start = self.pallet_range_start.trim();
        let end = self.pallet_range_end.trim();
        let value = pallet.as_str().trim();
        match (start.parse::<f64>(), end.parse::<f64>(), value.parse::<f64>()) {
            (Ok(s), Ok(e), Ok(v)) => s <= v && v <= e,
            _ => start <= value && value <= end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ManifestEntry>", into = "Vec<ManifestEntry>")]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Keeps entries with a non-blank truck id, trimmed.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ManifestEntry>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|mut e| {
                let trimmed = e.truck_id.as_str().trim();
                if trimmed.is_empty() {
                    return None;
                }
                e.truck_id = TruckId::new(trimmed);
                Some(e)
            })
            .collect();
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, truck: &TruckId) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.truck_id() == truck)
    }

    #[inline]
    pub fn iter_pending(&self) -> impl Iterator<Item = &ManifestEntry> + '_ {
        self.entries.iter().filter(|e| e.is_pending())
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(value: Vec<ManifestEntry>) -> Self {
        Manifest::new(value)
    }
}

impl From<Manifest> for Vec<ManifestEntry> {
    fn from(value: Manifest) -> Self {
        value.entries
    }
}

/// One raw packing-list line: a carton and the serial it carries. Blank
/// pallet or box numbers continue the previous line's value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartonRow {
    #[serde(default)]
    pallet_number: Option<String>,
    #[serde(default)]
    box_number: Option<String>,
    #[serde(default)]
    serial: Option<String>,
}

impl CartonRow {
    #[inline]
    pub fn new(
        pallet_number: Option<String>,
        box_number: Option<String>,
        serial: Option<String>,
    ) -> Self {
        Self {
            pallet_number,
            box_number,
            serial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PalletSummary {
    pallet: PalletId,
    first_serial: String,
    last_serial: String,
    box_count: usize,
}

impl PalletSummary {
    #[inline]
    pub fn new(
        pallet: PalletId,
        first_serial: impl Into<String>,
        last_serial: impl Into<String>,
        box_count: usize,
    ) -> Self {
        Self {
            pallet,
            first_serial: first_serial.into(),
            last_serial: last_serial.into(),
            box_count,
        }
    }

    #[inline]
    pub fn pallet(&self) -> &PalletId {
        &self.pallet
    }

    #[inline]
    pub fn first_serial(&self) -> &str {
        &self.first_serial
    }

    #[inline]
    pub fn last_serial(&self) -> &str {
        &self.last_serial
    }

    #[inline]
    pub fn box_count(&self) -> usize {
        self.box_count
    }

    #[inline]
    pub fn matches_serials(&self, first: &str, last: &str) -> bool {
        self.first_serial == first && self.last_serial == last
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackingList {
    pallets: Vec<PalletSummary>,
}

#[inline]
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PackingList {
    #[inline]
    pub fn new(pallets: Vec<PalletSummary>) -> Self {
        Self { pallets }
    }

    /// Folds carton rows into one summary per pallet, in order of first
    /// appearance. Rows before the first pallet number are dropped.
    pub fn aggregate<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = CartonRow>,
    {
        struct Acc {
            pallet: PalletId,
            first: Option<String>,
            last: Option<String>,
            boxes: usize,
        }

        let mut order: Vec<Acc> = Vec::new();
        let mut slot_of: HashMap<PalletId, usize> = HashMap::new();
        let mut current_pallet: Option<String> = None;
        let mut current_box: Option<String> = None;
        let mut dropped = 0usize;

        for row in rows {
            if let Some(p) = non_blank(row.pallet_number) {
                current_pallet = Some(p);
            }
            if let Some(b) = non_blank(row.box_number) {
                current_box = Some(b);
            }
            let Some(pallet) = current_pallet.as_deref() else {
                dropped += 1;
                continue;
            };

            let pallet = PalletId::new(pallet);
            let idx = *slot_of.entry(pallet.clone()).or_insert_with(|| {
                order.push(Acc {
                    pallet,
                    first: None,
                    last: None,
                    boxes: 0,
                });
                order.len() - 1
            });
            let acc = &mut order[idx];
            if current_box.is_some() {
                acc.boxes += 1;
            }
            if let Some(serial) = non_blank(row.serial) {
                if acc.first.is_none() {
                    acc.first = Some(serial.clone());
                }
                acc.last = Some(serial);
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "packing rows without a pallet number were dropped");
        }

        Self::new(
            order
                .into_iter()
                .map(|a| {
                    PalletSummary::new(
                        a.pallet,
                        a.first.unwrap_or_default(),
                        a.last.unwrap_or_default(),
                        a.boxes,
                    )
                })
                .collect(),
        )
    }

    #[inline]
    pub fn pallets(&self) -> &[PalletSummary] {
        &self.pallets
    }

    #[inline]
    pub fn get(&self, pallet: &PalletId) -> Option<&PalletSummary> {
        self.pallets.iter().find(|p| p.pallet() == pallet)
    }

    /// Pallets inside the entry's pallet range.
    pub fn pallets_for<'a>(
        &'a self,
        entry: &'a ManifestEntry,
    ) -> impl Iterator<Item = &'a PalletSummary> + 'a {
        self.pallets
            .iter()
            .filter(move |p| entry.contains_pallet(p.pallet()))
    }

    /// Finds the entry's pallet whose first and last serial equal the
    /// scanned pair. Scanner noise (surrounding whitespace, a trailing
    /// carriage return) is ignored.
    pub fn find_by_serials(
        &self,
        entry: &ManifestEntry,
        first: &str,
        last: &str,
    ) -> Option<&PalletSummary> {
        let first = first.trim();
        let last = last.trim();
        if first.is_empty() || last.is_empty() {
            return None;
        }
        self.pallets
            .iter()
            .find(|p| entry.contains_pallet(p.pallet()) && p.matches_serials(first, last))
    }
}
