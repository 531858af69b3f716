//! Shared primitive types used across the entire generator.

/// A stable, unique identifier for any generated record.
pub type EntityId = String;

/// A feature / product category key, e.g. `"fund_transfer"` or `"zakat"`.
pub type Category = String;

/// A behavioural cohort label, e.g. `"student"` or `"elderly"`.
pub type Segment = String;
