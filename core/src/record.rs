//! Generated record types. Every record is write-once.

use crate::types::{Category, EntityId, Segment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticUser {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub segment: Segment,
    pub joined_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Names of the seasons active when the event happened.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureEvent {
    pub id: EntityId,
    pub user_id: EntityId,
    pub feature: Category,
    pub timestamp: DateTime<Utc>,
    pub session_id: EntityId,
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub user_id: EntityId,
    pub amount: f64,
    pub currency: String,
    pub product: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    /// Ids of the seasons active at `created_at`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Android,
    Ios,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: EntityId,
    pub user_id: EntityId,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub device: Device,
    pub app_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    pub id: EntityId,
    pub user_id: EntityId,
    pub step: u8,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// A record that can be handed to a sink.
pub trait Record: Serialize {
    fn id(&self) -> &str;

    /// When the record happened; sinks order merged output by it.
    fn occurred_at(&self) -> DateTime<Utc>;
}

impl Record for SyntheticUser {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

impl Record for FeatureEvent {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Record for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Session {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Record for OnboardingRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// The output collections, named as the dashboard backend reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    FeatureLogs,
    Transactions,
    Sessions,
    Onboarding,
    Seasons,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Self::Users,
        Self::FeatureLogs,
        Self::Transactions,
        Self::Sessions,
        Self::Onboarding,
        Self::Seasons,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::FeatureLogs => "feature_logs",
            Self::Transactions => "transactions",
            Self::Sessions => "sessions",
            Self::Onboarding => "onboarding",
            Self::Seasons => "seasons",
        }
    }
}

impl Record for crate::season::Season {
    fn id(&self) -> &str {
        &self.id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.start_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}
