//! Seasonal sandbox data generator for the Lotus insights dashboard.
//!
//! Synthesizes users, feature-usage events, transactions, sessions and
//! onboarding records. Event features and transaction products are drawn
//! from segment affinities boosted by whichever seasons are active at the
//! record's timestamp. All randomness comes from one master seed.

pub mod affinity;
pub mod config;
pub mod error;
pub mod name_generator;
pub mod population;
pub mod record;
pub mod rng;
pub mod sampler;
pub mod season;
pub mod sink;
pub mod store;
pub mod summary;
pub mod synthesizer;
pub mod transaction_synthesizer;
pub mod types;
pub mod window;
