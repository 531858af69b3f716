//! Transaction synthesis: amount, status and a seasonally weighted product.

use crate::{
    config::SandboxConfig,
    error::{SandboxError, SandboxResult},
    record::{SyntheticUser, Transaction, TransactionStatus},
    rng::StreamRng,
    sampler::{self, Weights},
    window::TimeWindow,
};
use chrono::{DateTime, Utc};

/// Probability that a generated transaction failed.
pub const FAILURE_PROBABILITY: f64 = 0.02;

pub const DEFAULT_CURRENCY: &str = "NGN";

#[derive(Debug, Clone, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub fn new(min: f64, max: f64) -> SandboxResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(SandboxError::InvalidConfig(format!(
                "amount range [{min}, {max}] is not a valid non-negative range"
            )));
        }
        Ok(Self { min, max })
    }
}

impl Default for AmountRange {
    fn default() -> Self {
        Self { min: 5.0, max: 505.0 }
    }
}

pub struct TransactionSynthesizer<'a> {
    config: &'a SandboxConfig,
    currency: String,
    amounts: AmountRange,
}

impl<'a> TransactionSynthesizer<'a> {
    pub fn new(config: &'a SandboxConfig, currency: &str, amounts: AmountRange) -> Self {
        Self {
            config,
            currency: currency.to_string(),
            amounts,
        }
    }

    /// Product weights at `timestamp`: the catalog's base weights with
    /// each active season's boost keys mapped onto product labels.
    pub fn product_weights(&self, timestamp: DateTime<Utc>) -> Weights {
        let catalog = &self.config.products;
        let mut weights = catalog.base_weights.clone();
        for season in self.config.seasons.active_seasons(timestamp) {
            for key in &season.boosts {
                if let Some(product) = catalog.product_for_boost(key) {
                    if weights.contains(product) {
                        self.config.boost.apply(&mut weights, key, product);
                    }
                }
            }
        }
        weights
    }

    /// The `index`-th transaction of the run, for `user`.
    pub fn synthesize(
        &self,
        index: usize,
        user: &SyntheticUser,
        window: &TimeWindow,
        rng: &mut StreamRng,
    ) -> Transaction {
        let created_at = window.sample(rng);
        let weights = self.product_weights(created_at);
        let product = sampler::pick(&weights, rng)
            .unwrap_or("Fund Transfer")
            .to_string();
        let raw = rng.uniform(self.amounts.min, self.amounts.max);
        let amount = ((raw * 100.0).round() / 100.0).clamp(self.amounts.min, self.amounts.max);
        let status = if rng.chance(FAILURE_PROBABILITY) {
            TransactionStatus::Failed
        } else {
            TransactionStatus::Success
        };
        let seasons = self
            .config
            .seasons
            .active_seasons(created_at)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();

        Transaction {
            id: format!("t{}", index + 1),
            user_id: user.id.clone(),
            amount,
            currency: self.currency.clone(),
            product,
            status,
            created_at,
            seasons,
        }
    }
}
