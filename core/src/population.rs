//! Population generation: users and everything generated for them.
//!
//! EXECUTION ORDER (fixed; each phase draws from its own RNG stream):
//!   1. Users
//!   2. Event allocation (how many events each user gets)
//!   3. Feature events, per user, on per-user streams
//!   4. Transactions
//!   5. Sessions
//!   6. Onboarding records
//!
//! The generator performs no I/O and keeps no state between runs.

use crate::{
    config::SandboxConfig,
    error::{SandboxError, SandboxResult},
    name_generator::NameGenerator,
    record::{Device, FeatureEvent, OnboardingRecord, Session, SyntheticUser, Transaction},
    rng::{RngBank, StreamRng, StreamSlot},
    sampler::{self, Weights},
    synthesizer::EventSynthesizer,
    transaction_synthesizer::{AmountRange, TransactionSynthesizer, DEFAULT_CURRENCY},
    window::TimeWindow,
};
use chrono::NaiveDate;

/// Users joined up to this many days before the event window opens.
pub const JOIN_LOOKBACK_DAYS: i64 = 730;

pub const ACTIVE_PROBABILITY: f64 = 0.85;

pub const ONBOARDING_COMPLETION_PROBABILITY: f64 = 0.6;

pub const MAX_SESSION_SECONDS: u64 = 1800;

/// Ids already taken in the destination, per sequentially numbered
/// collection. An appending run numbers its records after these, so
/// `users: 25` makes the first new user `u00026`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdOffsets {
    pub users: usize,
    pub transactions: usize,
    pub sessions: usize,
    pub onboarding: usize,
}

/// How many feature events to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVolume {
    /// Each user gets a count drawn uniformly from `[min, max]`.
    PerUser { min: usize, max: usize },
    /// Exactly `n` events, each assigned to a uniformly chosen user.
    Total(usize),
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub user_count: usize,
    pub event_volume: EventVolume,
    pub transaction_count: usize,
    pub session_count: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Keep previously stored records. Honoured by the sink, not here.
    pub append: bool,
    pub seed: u64,
    pub currency: String,
    pub amounts: AmountRange,
    /// Segment distribution; `None` draws uniformly over the known segments.
    pub segment_weights: Option<Weights>,
    /// Zero for a fresh run; see [`crate::sink::append_offsets`].
    pub id_offsets: IdOffsets,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            user_count: 2000,
            event_volume: EventVolume::Total(50_000),
            transaction_count: 8000,
            session_count: 10_000,
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 10, 31).unwrap_or_default(),
            append: false,
            seed: 42,
            currency: DEFAULT_CURRENCY.to_string(),
            amounts: AmountRange::default(),
            segment_weights: None,
            id_offsets: IdOffsets::default(),
        }
    }
}

impl GenerationConfig {
    /// Check the config and return the event window.
    pub fn validate(&self) -> SandboxResult<TimeWindow> {
        let window = TimeWindow::from_dates(self.start, self.end)?;
        if let EventVolume::PerUser { min, max } = self.event_volume {
            if min > max {
                return Err(SandboxError::InvalidConfig(format!(
                    "events per user: min {min} exceeds max {max}"
                )));
            }
        }
        AmountRange::new(self.amounts.min, self.amounts.max)?;
        let needs_users = self.transaction_count > 0
            || self.session_count > 0
            || self.event_volume != EventVolume::Total(0);
        if self.user_count == 0 && needs_users {
            return Err(SandboxError::InvalidConfig(
                "cannot attach events, transactions or sessions to zero users".into(),
            ));
        }
        if let Some(w) = &self.segment_weights {
            if w.total() <= 0.0 {
                return Err(SandboxError::InvalidConfig(
                    "segment distribution has no positive weight".into(),
                ));
            }
        }
        Ok(window)
    }
}

/// Everything one run produces, handed whole to a sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SandboxDataset {
    pub users: Vec<SyntheticUser>,
    pub events: Vec<FeatureEvent>,
    pub transactions: Vec<Transaction>,
    pub sessions: Vec<Session>,
    pub onboarding: Vec<OnboardingRecord>,
}

pub struct PopulationGenerator<'a> {
    config: &'a SandboxConfig,
}

impl<'a> PopulationGenerator<'a> {
    pub fn new(config: &'a SandboxConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, gen: &GenerationConfig) -> SandboxResult<SandboxDataset> {
        let window = gen.validate()?;
        let bank = RngBank::new(gen.seed);

        let users = self.generate_users(gen, &window, &mut bank.for_stream(StreamSlot::Users));
        log::info!("users: generated {}", users.len());

        let counts = allocate_events(
            gen.event_volume,
            users.len(),
            &mut bank.for_stream(StreamSlot::EventAllocation),
        );
        let offsets = gen.id_offsets;
        let synthesizer = EventSynthesizer::new(self.config, gen.session_count)
            .with_session_offset(offsets.sessions);
        let mut events = Vec::with_capacity(counts.iter().sum());
        for (i, (user, &count)) in users.iter().zip(counts.iter()).enumerate() {
            let mut rng = bank.for_user(StreamSlot::Events, offsets.users + i);
            events.extend(synthesizer.synthesize(user, count, &window, &mut rng));
        }
        log::info!(
            "events: generated {} across {} users ({} seasons loaded)",
            events.len(),
            users.len(),
            self.config.seasons.len()
        );

        let transactions = self.generate_transactions(
            gen,
            &users,
            &window,
            &mut bank.for_stream(StreamSlot::Transactions),
        );
        log::info!("transactions: generated {}", transactions.len());

        let sessions = generate_sessions(
            gen.session_count,
            offsets.sessions,
            &users,
            &window,
            &mut bank.for_stream(StreamSlot::Sessions),
        );
        log::info!("sessions: generated {}", sessions.len());

        let onboarding = generate_onboarding(
            &users,
            offsets.onboarding,
            &mut bank.for_stream(StreamSlot::Onboarding),
        );
        log::info!("onboarding: generated {}", onboarding.len());

        Ok(SandboxDataset {
            users,
            events,
            transactions,
            sessions,
            onboarding,
        })
    }

    fn generate_users(
        &self,
        gen: &GenerationConfig,
        window: &TimeWindow,
        rng: &mut StreamRng,
    ) -> Vec<SyntheticUser> {
        let join_window = window.extend_back(JOIN_LOOKBACK_DAYS);
        let mut users = Vec::with_capacity(gen.user_count);
        for i in 0..gen.user_count {
            let ordinal = gen.id_offsets.users + i + 1;
            let segment = self.pick_segment(gen.segment_weights.as_ref(), rng);
            let name = NameGenerator::generate_full_name(rng);
            let email = NameGenerator::email_for(&name, ordinal);
            users.push(SyntheticUser {
                id: format!("u{ordinal:05}"),
                name,
                email,
                segment,
                joined_at: join_window.sample(rng),
                active: rng.chance(ACTIVE_PROBABILITY),
            });
        }
        users
    }

    fn pick_segment(&self, distribution: Option<&Weights>, rng: &mut StreamRng) -> String {
        let segments = self.config.affinities.segments();
        match distribution {
            Some(weights) => sampler::pick(weights, rng)
                .unwrap_or(self.config.affinities.default_segment())
                .to_string(),
            None if segments.is_empty() => self.config.affinities.default_segment().to_string(),
            None => rng.choose(segments).clone(),
        }
    }

    fn generate_transactions(
        &self,
        gen: &GenerationConfig,
        users: &[SyntheticUser],
        window: &TimeWindow,
        rng: &mut StreamRng,
    ) -> Vec<Transaction> {
        let synthesizer =
            TransactionSynthesizer::new(self.config, &gen.currency, gen.amounts.clone());
        let first = gen.id_offsets.transactions;
        (first..first + gen.transaction_count)
            .map(|i| {
                let user = rng.choose(users);
                synthesizer.synthesize(i, user, window, rng)
            })
            .collect()
    }
}

/// Per-user event counts, in user order.
fn allocate_events(volume: EventVolume, user_count: usize, rng: &mut StreamRng) -> Vec<usize> {
    match volume {
        EventVolume::PerUser { min, max } => {
            (0..user_count).map(|_| rng.next_in_range(min, max)).collect()
        }
        EventVolume::Total(n) => {
            let mut counts = vec![0usize; user_count];
            if user_count > 0 {
                for _ in 0..n {
                    counts[rng.next_u64_below(user_count as u64) as usize] += 1;
                }
            }
            counts
        }
    }
}

fn generate_sessions(
    count: usize,
    first: usize,
    users: &[SyntheticUser],
    window: &TimeWindow,
    rng: &mut StreamRng,
) -> Vec<Session> {
    (first..first + count)
        .map(|i| {
            let user = rng.choose(users);
            let started_at = window.sample(rng);
            let duration_seconds = rng.next_u64_below(MAX_SESSION_SECONDS) as u32;
            let device = if rng.chance(0.4) {
                Device::Android
            } else {
                Device::Ios
            };
            Session {
                id: format!("sess_{}", i + 1),
                user_id: user.id.clone(),
                started_at,
                duration_seconds,
                device,
                app_version: format!("1.{}", rng.next_u64_below(10)),
            }
        })
        .collect()
}

fn generate_onboarding(
    users: &[SyntheticUser],
    first: usize,
    rng: &mut StreamRng,
) -> Vec<OnboardingRecord> {
    users
        .iter()
        .enumerate()
        .map(|(i, user)| OnboardingRecord {
            id: format!("o{}", first + i + 1),
            user_id: user.id.clone(),
            step: rng.next_in_range(1, 5) as u8,
            completed: rng.chance(ONBOARDING_COMPLETION_PROBABILITY),
            updated_at: user.joined_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_allocation_sums_exactly() {
        let mut rng = StreamRng::from_seed(5);
        let counts = allocate_events(EventVolume::Total(1_234), 17, &mut rng);
        assert_eq!(counts.len(), 17);
        assert_eq!(counts.iter().sum::<usize>(), 1_234);
    }

    #[test]
    fn per_user_allocation_respects_range() {
        let mut rng = StreamRng::from_seed(5);
        let counts = allocate_events(EventVolume::PerUser { min: 3, max: 15 }, 200, &mut rng);
        assert!(counts.iter().all(|c| (3..=15).contains(c)));
    }

    #[test]
    fn zero_users_with_work_is_rejected() {
        let gen = GenerationConfig {
            user_count: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(gen.validate(), Err(SandboxError::InvalidConfig(_))));
    }

    #[test]
    fn offsets_continue_every_id_sequence() {
        let config = SandboxConfig::builtin();
        let gen = GenerationConfig {
            user_count: 3,
            event_volume: EventVolume::Total(20),
            transaction_count: 4,
            session_count: 5,
            id_offsets: IdOffsets {
                users: 25,
                transactions: 40,
                sessions: 30,
                onboarding: 25,
            },
            ..GenerationConfig::default()
        };
        let data = PopulationGenerator::new(&config).generate(&gen).unwrap();
        assert_eq!(data.users[0].id, "u00026");
        assert!(data.users[0].email.ends_with("26@example.com"));
        assert_eq!(data.transactions[0].id, "t41");
        assert_eq!(data.sessions[0].id, "sess_31");
        assert_eq!(data.sessions[4].id, "sess_35");
        assert_eq!(data.onboarding[2].id, "o28");
        let session_ids: Vec<&str> = data.sessions.iter().map(|s| s.id.as_str()).collect();
        assert!(data
            .events
            .iter()
            .all(|e| session_ids.contains(&e.session_id.as_str())));
    }

    #[test]
    fn inverted_per_user_range_is_rejected() {
        let gen = GenerationConfig {
            event_volume: EventVolume::PerUser { min: 9, max: 2 },
            ..GenerationConfig::default()
        };
        assert!(gen.validate().is_err());
    }
}
