//! Post-run aggregates printed by the seeder and used in tests.

use crate::{population::SandboxDataset, record::TransactionStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSummary {
    pub users: usize,
    pub active_users: usize,
    pub events: usize,
    pub transactions: usize,
    pub failed_transactions: usize,
    pub sessions: usize,
    pub onboarding: usize,
    /// Events per feature, sorted by feature name.
    pub features: BTreeMap<String, usize>,
    /// Users per segment, sorted by segment name.
    pub segments: BTreeMap<String, usize>,
    /// Events that fell inside at least one season.
    pub seasonal_events: usize,
}

impl DatasetSummary {
    pub fn of(dataset: &SandboxDataset) -> Self {
        let mut features = BTreeMap::new();
        let mut seasonal_events = 0;
        for e in &dataset.events {
            *features.entry(e.feature.clone()).or_insert(0) += 1;
            if !e.metadata.seasons.is_empty() {
                seasonal_events += 1;
            }
        }
        let mut segments = BTreeMap::new();
        for u in &dataset.users {
            *segments.entry(u.segment.clone()).or_insert(0) += 1;
        }
        Self {
            users: dataset.users.len(),
            active_users: dataset.users.iter().filter(|u| u.active).count(),
            events: dataset.events.len(),
            transactions: dataset.transactions.len(),
            failed_transactions: dataset
                .transactions
                .iter()
                .filter(|t| t.status == TransactionStatus::Failed)
                .count(),
            sessions: dataset.sessions.len(),
            onboarding: dataset.onboarding.len(),
            features,
            segments,
            seasonal_events,
        }
    }

    /// Fraction of events that used `feature`; 0 for an empty dataset.
    pub fn feature_share(&self, feature: &str) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        self.features.get(feature).copied().unwrap_or(0) as f64 / self.events as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SandboxConfig,
        population::{EventVolume, GenerationConfig, PopulationGenerator},
    };

    #[test]
    fn counts_add_up_to_the_dataset() {
        let gen = GenerationConfig {
            user_count: 40,
            event_volume: EventVolume::Total(300),
            transaction_count: 50,
            session_count: 20,
            ..GenerationConfig::default()
        };
        let data = PopulationGenerator::new(&SandboxConfig::builtin())
            .generate(&gen)
            .unwrap();
        let summary = DatasetSummary::of(&data);

        assert_eq!(summary.segments.values().sum::<usize>(), 40);
        assert_eq!(summary.features.values().sum::<usize>(), 300);
        assert!(summary.segments.keys().all(|s| data.users.iter().any(|u| &u.segment == s)));
        let shares: f64 = summary.features.keys().map(|f| summary.feature_share(f)).sum();
        assert!((shares - 1.0).abs() < 1e-9);
        assert_eq!(summary.seasonal_events, 0, "builtin config has no seasons");
    }

    #[test]
    fn empty_dataset_has_zero_shares() {
        let summary = DatasetSummary::of(&SandboxDataset::default());
        assert_eq!(summary.feature_share("login"), 0.0);
        assert!(summary.segments.is_empty());
    }
}
