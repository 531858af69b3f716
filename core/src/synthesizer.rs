//! Feature-event synthesis: segment affinity × seasonal boosts.

use crate::{
    affinity::FALLBACK_FEATURE,
    config::SandboxConfig,
    record::{EventMetadata, FeatureEvent, SyntheticUser},
    rng::StreamRng,
    sampler::{self, Weights},
    window::TimeWindow,
};
use chrono::{DateTime, Utc};

/// Emits timestamped feature events for one user at a time.
///
/// The synthesizer only reads shared configuration. Base weights are
/// cloned before boosts are applied, so concurrent synthesizers over
/// the same config never observe each other.
pub struct EventSynthesizer<'a> {
    config: &'a SandboxConfig,
    session_pool: u64,
    session_offset: u64,
}

impl<'a> EventSynthesizer<'a> {
    /// `session_pool` bounds the synthetic session ids (`sess_1..=sess_N`).
    /// Zero is treated as one.
    pub fn new(config: &'a SandboxConfig, session_pool: usize) -> Self {
        Self {
            config,
            session_pool: session_pool.max(1) as u64,
            session_offset: 0,
        }
    }

    /// Shift the session pool past ids an earlier run already used,
    /// giving `sess_{offset+1}..=sess_{offset+N}`.
    pub fn with_session_offset(mut self, offset: usize) -> Self {
        self.session_offset = offset as u64;
        self
    }

    /// Base weights for `segment` with every season active at
    /// `timestamp` applied through the configured boost policy.
    pub fn composed_weights(&self, segment: &str, timestamp: DateTime<Utc>) -> Weights {
        let mut weights = self.config.affinities.base_weights(segment).clone();
        for season in self.config.seasons.active_seasons(timestamp) {
            for key in &season.boosts {
                self.config.boost.apply(&mut weights, key, key);
            }
        }
        weights
    }

    /// Exactly `count` events for `user`, timestamps uniform in `window`.
    pub fn synthesize(
        &self,
        user: &SyntheticUser,
        count: usize,
        window: &TimeWindow,
        rng: &mut StreamRng,
    ) -> Vec<FeatureEvent> {
        let mut events = Vec::with_capacity(count);
        for _ in 0..count {
            let timestamp = window.sample(rng);
            let weights = self.composed_weights(&user.segment, timestamp);
            let feature = sampler::pick(&weights, rng)
                .unwrap_or(FALLBACK_FEATURE)
                .to_string();
            let seasons = self
                .config
                .seasons
                .active_seasons(timestamp)
                .into_iter()
                .map(|s| s.name.clone())
                .collect();
            let session_id = format!(
                "sess_{}",
                self.session_offset + rng.next_u64_below(self.session_pool) + 1
            );

            events.push(FeatureEvent {
                id: rng.next_uuid(),
                user_id: user.id.clone(),
                feature,
                timestamp,
                session_id,
                metadata: EventMetadata { seasons },
            });
        }
        log::debug!("user={} events: {} synthesized", user.id, events.len());
        events
    }
}
