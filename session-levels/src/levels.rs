//! Percentile band levels anchored to a session open.
//!
//! For a [`SessionWindow`] with anchor `a` (the first bar's open):
//!
//! ```text
//! high_excursions[i] = window[i].high - a
//! low_excursions[i]  = a - window[i].low
//! "P{p} H" = a + nearest_rank(high_excursions, p)
//! "P{p} L" = a - nearest_rank(low_excursions, p)
//! ```
//!
//! Excursions are signed and never clamped. On volatile windows a low band can end up above a
//! high band of another tier; that output is preserved as-is and callers must tolerate it.

use crate::{bar::Bar, percentile::PercentileTier, window::SessionWindow};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Name of the anchor row emitted by [`LevelMap::iter_with_anchor`].
pub const ANCHOR_LEVEL: &str = "ANCHOR";

/// Which side of the anchor a band sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
pub enum BandSide {
    #[display("H")]
    High,
    #[display("L")]
    Low,
}

/// Level name for a tier and side, eg/ `P50 H`.
pub fn level_name(tier: PercentileTier, side: BandSide) -> SmolStr {
    format_smolstr!("{tier} {side}")
}

/// Signed distances from the anchor to each bar's high and low.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ExcursionSet {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
}

impl ExcursionSet {
    pub fn new(bars: &[Bar], anchor: f64) -> Self {
        let (high, low) = bars
            .iter()
            .map(|bar| (bar.high - anchor, anchor - bar.low))
            .unzip();

        Self { high, low }
    }

    pub fn from_window(window: &SessionWindow<'_>) -> Self {
        Self::new(window.bars(), window.anchor())
    }

    pub fn len(&self) -> usize {
        self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty()
    }
}

/// Level name to price, produced once per instrument window and never mutated afterwards.
///
/// Levels iterate in tier order with the high band before the low band.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelMap {
    anchor: f64,
    levels: IndexMap<SmolStr, f64>,
}

impl LevelMap {
    /// Open price every level is offset from.
    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    pub fn get(&self, tier: PercentileTier, side: BandSide) -> Option<f64> {
        self.get_named(&level_name(tier, side))
    }

    /// Lookup by display name, eg/ `P75 L`. `ANCHOR` resolves to [`LevelMap::anchor`].
    pub fn get_named(&self, name: &str) -> Option<f64> {
        if name == ANCHOR_LEVEL {
            return Some(self.anchor);
        }
        self.levels.get(name).copied()
    }

    /// Percentile levels, without the anchor.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.levels.iter().map(|(name, price)| (name.as_str(), *price))
    }

    /// Percentile levels followed by the `ANCHOR` row.
    pub fn iter_with_anchor(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter()
            .chain(std::iter::once((ANCHOR_LEVEL, self.anchor)))
    }

    /// Number of percentile levels, excluding the anchor.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Compute the high and low band for each of `tiers` over `window`.
pub fn compute_levels(window: &SessionWindow<'_>, tiers: &[PercentileTier]) -> LevelMap {
    let anchor = window.anchor();
    let excursions = ExcursionSet::from_window(window);

    let levels = tiers
        .iter()
        .flat_map(|tier| {
            [
                (
                    level_name(*tier, BandSide::High),
                    anchor + tier.of(&excursions.high),
                ),
                (
                    level_name(*tier, BandSide::Low),
                    anchor - tier.of(&excursions.low),
                ),
            ]
        })
        .collect();

    LevelMap { anchor, levels }
}

/// [`compute_levels`] for the P50, P75 and P90 tiers.
pub fn compute_default_levels(window: &SessionWindow<'_>) -> LevelMap {
    compute_levels(window, &PercentileTier::DEFAULT)
}
