//! Generator configuration: affinity table, season calendar, boost
//! policy and transaction product catalog.
//!
//! Everything here is loaded once per run from a data directory and is
//! read-only afterwards. Loading never fails: any file that is missing
//! or malformed is replaced by its built-in default with a warning.

use crate::{
    affinity::{AffinityTable, AffinityTableFile},
    sampler::Weights,
    season::{SeasonCalendar, SEASONS_FILE},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const AFFINITIES_FILE: &str = "segments/affinities.json";

/// Weight added per active season per boosted category.
pub const DEFAULT_BOOST_INCREMENT: f64 = 10.0;

/// Multiplier for boost keys without an explicit entry.
pub const DEFAULT_BOOST_MULTIPLIER: f64 = 2.0;

/// How an active season adjusts the weight of a boosted category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoostPolicy {
    /// `weight += increment` per season; overlapping seasons stack.
    Additive { increment: f64 },
    /// `weight *= multiplier[category]` per season. Categories absent
    /// from the base mapping stay unselectable.
    Multiplicative {
        multipliers: HashMap<String, f64>,
        default_multiplier: f64,
    },
}

impl BoostPolicy {
    pub fn additive() -> Self {
        Self::Additive {
            increment: DEFAULT_BOOST_INCREMENT,
        }
    }

    pub fn multiplicative() -> Self {
        let multipliers = [
            ("zakat", 6.0),
            ("travel", 2.0),
            ("fund_transfer", 1.5),
            ("airtime_purchase", 1.5),
            ("bill_payment", 1.3),
            ("loan_request", 1.2),
            ("savings_goal", 1.4),
            ("quran_daily", 3.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self::Multiplicative {
            multipliers,
            default_multiplier: DEFAULT_BOOST_MULTIPLIER,
        }
    }

    /// Apply one season's boost for `boost_key` to `target` in `weights`.
    /// `boost_key` selects the multiplier; `target` is the category the
    /// key maps to in the mapping being sampled.
    pub fn apply(&self, weights: &mut Weights, boost_key: &str, target: &str) {
        match self {
            Self::Additive { increment } => weights.add(target, *increment),
            Self::Multiplicative {
                multipliers,
                default_multiplier,
            } => {
                let m = multipliers
                    .get(boost_key)
                    .copied()
                    .unwrap_or(*default_multiplier);
                weights.scale(target, m);
            }
        }
    }
}

impl Default for BoostPolicy {
    fn default() -> Self {
        Self::additive()
    }
}

/// Transaction products and the season boost keys that favour them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog {
    pub base_weights: Weights,
    boost_to_product: HashMap<String, String>,
}

impl ProductCatalog {
    pub fn builtin() -> Self {
        let products = [
            "Mudarabah",
            "Fund Transfer",
            "Travel",
            "Savings",
            "Zakat",
            "Airtime Purchase",
            "Bill Payment",
            "Loan Request",
            "Quran Daily",
        ];
        let boost_to_product = [
            ("fund_transfer", "Fund Transfer"),
            ("travel", "Travel"),
            ("zakat", "Zakat"),
            ("airtime_purchase", "Airtime Purchase"),
            ("bill_payment", "Bill Payment"),
            ("loan_request", "Loan Request"),
            ("savings_goal", "Savings"),
            ("quran_daily", "Quran Daily"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            base_weights: Weights::uniform(&products),
            boost_to_product,
        }
    }

    /// Product label a season boost key maps to, if any.
    pub fn product_for_boost(&self, boost_key: &str) -> Option<&str> {
        self.boost_to_product.get(boost_key).map(String::as_str)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Static inputs shared by every synthesizer in a run.
#[derive(Debug, Clone, Default)]
pub struct SandboxConfig {
    pub affinities: AffinityTable,
    pub seasons: SeasonCalendar,
    pub boost: BoostPolicy,
    pub products: ProductCatalog,
}

impl SandboxConfig {
    /// Load seasons and segment affinities from `data_dir`.
    pub fn load(data_dir: &Path) -> Self {
        let seasons = SeasonCalendar::load_or_empty(&data_dir.join(SEASONS_FILE));
        let affinities = load_affinities(&data_dir.join(AFFINITIES_FILE));
        Self {
            affinities,
            seasons,
            boost: BoostPolicy::default(),
            products: ProductCatalog::builtin(),
        }
    }

    /// Built-in table and an empty calendar.
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_seasons(mut self, seasons: SeasonCalendar) -> Self {
        self.seasons = seasons;
        self
    }

    pub fn with_boost(mut self, boost: BoostPolicy) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_affinities(mut self, affinities: AffinityTable) -> Self {
        self.affinities = affinities;
        self
    }
}

fn load_affinities(path: &Path) -> AffinityTable {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            log::debug!("no affinity file at {}; using built-in table", path.display());
            return AffinityTable::builtin();
        }
    };
    let parsed = serde_json::from_str::<AffinityTableFile>(&content)
        .map_err(anyhow::Error::from)
        .and_then(|file| AffinityTable::from_file(file).map_err(anyhow::Error::from));
    match parsed {
        Ok(table) => {
            log::info!(
                "loaded {} segment affinities from {}",
                table.segments().len(),
                path.display()
            );
            table
        }
        Err(e) => {
            log::warn!("cannot use {} ({e}); using built-in table", path.display());
            AffinityTable::builtin()
        }
    }
}
