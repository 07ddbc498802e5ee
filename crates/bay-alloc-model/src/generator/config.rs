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

use super::err::{InvalidRangeError, ScenarioGenConfigError};

/// Configuration for synthetic warehouse scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioGenConfig {
    pub(crate) bay_letter: char,
    pub(crate) bays: u32,
    pub(crate) groups_per_bay: u32,
    pub(crate) trucks: u32,
    pub(crate) min_pallets_per_truck: u32,
    pub(crate) max_pallets_per_truck: u32,
    pub(crate) min_boxes_per_pallet: u32,
    pub(crate) max_boxes_per_pallet: u32,
    pub(crate) cell_width: f64,
    pub(crate) cell_height: f64,
    pub(crate) duplicate_scan_rate: f64,
    pub(crate) seed: u64,
}

impl Default for ScenarioGenConfig {
    fn default() -> Self {
        Self {
            bay_letter: 'C',
            bays: 4,
            groups_per_bay: 30,
            trucks: 6,
            min_pallets_per_truck: 4,
            max_pallets_per_truck: 10,
            min_boxes_per_pallet: 3,
            max_boxes_per_pallet: 6,
            cell_width: 40.0,
            cell_height: 25.0,
            duplicate_scan_rate: 0.05,
            seed: 42,
        }
    }
}

impl ScenarioGenConfig {
    #[inline]
    pub fn builder() -> ScenarioGenConfigBuilder {
        ScenarioGenConfigBuilder::new()
    }

    #[inline]
    pub fn bay_letter(&self) -> char {
        self.bay_letter
    }

    #[inline]
    pub fn bays(&self) -> u32 {
        self.bays
    }

    #[inline]
    pub fn groups_per_bay(&self) -> u32 {
        self.groups_per_bay
    }

    #[inline]
    pub fn trucks(&self) -> u32 {
        self.trucks
    }

    #[inline]
    pub fn pallets_per_truck(&self) -> (u32, u32) {
        (self.min_pallets_per_truck, self.max_pallets_per_truck)
    }

    #[inline]
    pub fn boxes_per_pallet(&self) -> (u32, u32) {
        (self.min_boxes_per_pallet, self.max_boxes_per_pallet)
    }

    #[inline]
    pub fn cell(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    #[inline]
    pub fn duplicate_scan_rate(&self) -> f64 {
        self.duplicate_scan_rate
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn with_trucks(mut self, trucks: u32) -> Self {
        self.trucks = trucks;
        self
    }

    /// Checks the invariants the generator relies on. Configurations
    /// deserialized from files should be validated before use.
    pub fn validate(&self) -> Result<(), ScenarioGenConfigError> {
        if !self.bay_letter.is_ascii_uppercase() {
            return Err(ScenarioGenConfigError::InvalidBayLetter(self.bay_letter));
        }
        if self.bays == 0 {
            return Err(ScenarioGenConfigError::NoBays);
        }
        if self.groups_per_bay == 0 {
            return Err(ScenarioGenConfigError::NoGroups);
        }
        if self.trucks == 0 {
            return Err(ScenarioGenConfigError::NoTrucks);
        }
        if self.min_pallets_per_truck == 0
            || self.min_pallets_per_truck > self.max_pallets_per_truck
        {
            return Err(InvalidRangeError::new(
                "pallets_per_truck",
                self.min_pallets_per_truck,
                self.max_pallets_per_truck,
            )
            .into());
        }
        if self.min_boxes_per_pallet == 0 || self.min_boxes_per_pallet > self.max_boxes_per_pallet
        {
            return Err(InvalidRangeError::new(
                "boxes_per_pallet",
                self.min_boxes_per_pallet,
                self.max_boxes_per_pallet,
            )
            .into());
        }
        let worst = u64::from(self.trucks) * u64::from(self.max_pallets_per_truck);
        if worst > 999 {
            return Err(ScenarioGenConfigError::TooManyPallets(worst));
        }
        if !(self.cell_width > 0.0 && self.cell_height > 0.0) {
            return Err(ScenarioGenConfigError::InvalidCell {
                width: self.cell_width,
                height: self.cell_height,
            });
        }
        if !(0.0..=1.0).contains(&self.duplicate_scan_rate) {
            return Err(ScenarioGenConfigError::InvalidDuplicateRate(
                self.duplicate_scan_rate,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioGenConfigBuilder {
    config: ScenarioGenConfig,
}

impl ScenarioGenConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bay_letter(mut self, letter: char) -> Self {
        self.config.bay_letter = letter;
        self
    }

    pub fn bays(mut self, bays: u32) -> Self {
        self.config.bays = bays;
        self
    }

    pub fn groups_per_bay(mut self, groups: u32) -> Self {
        self.config.groups_per_bay = groups;
        self
    }

    pub fn trucks(mut self, trucks: u32) -> Self {
        self.config.trucks = trucks;
        self
    }

    pub fn pallets_per_truck(mut self, min: u32, max: u32) -> Self {
        self.config.min_pallets_per_truck = min;
        self.config.max_pallets_per_truck = max;
        self
    }

    pub fn boxes_per_pallet(mut self, min: u32, max: u32) -> Self {
        self.config.min_boxes_per_pallet = min;
        self.config.max_boxes_per_pallet = max;
        self
    }

    pub fn cell(mut self, width: f64, height: f64) -> Self {
        self.config.cell_width = width;
        self.config.cell_height = height;
        self
    }

    pub fn duplicate_scan_rate(mut self, rate: f64) -> Self {
        self.config.duplicate_scan_rate = rate;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn build(self) -> Result<ScenarioGenConfig, ScenarioGenConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScenarioGenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_inverted_ranges() {
        let err = ScenarioGenConfig::builder()
            .pallets_per_truck(5, 2)
            .build()
            .unwrap_err();
        match err {
            ScenarioGenConfigError::InvalidRange(e) => {
                assert_eq!(e.what(), "pallets_per_truck");
                assert_eq!((e.min(), e.max()), (5, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_builder_rejects_pallet_overflow() {
        let err = ScenarioGenConfig::builder()
            .trucks(200)
            .pallets_per_truck(1, 10)
            .build()
            .unwrap_err();
        assert_eq!(err, ScenarioGenConfigError::TooManyPallets(2000));
    }

    #[test]
    fn test_builder_rejects_bad_letter_and_rate() {
        assert_eq!(
            ScenarioGenConfig::builder().bay_letter('c').build().unwrap_err(),
            ScenarioGenConfigError::InvalidBayLetter('c')
        );
        assert!(matches!(
            ScenarioGenConfig::builder().duplicate_scan_rate(1.5).build(),
            Err(ScenarioGenConfigError::InvalidDuplicateRate(_))
        ));
    }
}
