//! Weighted categorical sampling.
//!
//! `Weights` keeps categories in declaration order. Iteration order is
//! part of the contract: with a fixed seed, the same weights always
//! resolve the same draw to the same category.

use crate::rng::StreamRng;
use serde::{Deserialize, Serialize};

/// An ordered mapping from category to non-negative weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights {
    entries: Vec<(String, f64)>,
}

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs. A repeated category accumulates its weights
    /// into the first occurrence's slot.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut weights = Self::new();
        for (category, w) in pairs {
            weights.add(&category.into(), w);
        }
        weights
    }

    /// Uniform weight 1.0 over the given categories.
    pub fn uniform<S: AsRef<str>>(categories: &[S]) -> Self {
        Self::from_pairs(categories.iter().map(|c| (c.as_ref().to_string(), 1.0)))
    }

    /// Weight of `category`; absent categories weigh 0.
    pub fn get(&self, category: &str) -> f64 {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    /// Add `delta` to a category, appending it if absent.
    pub fn add(&mut self, category: &str, delta: f64) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, w)) => *w += delta,
            None => self.entries.push((category.to_string(), delta)),
        }
    }

    /// Multiply a category's weight. Absent categories stay absent
    /// (0 × anything is still 0).
    pub fn scale(&mut self, category: &str, factor: f64) {
        if let Some((_, w)) = self.entries.iter_mut().find(|(c, _)| c == category) {
            *w *= factor;
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == category)
    }

    /// Sum of the positive weights.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w.max(0.0)).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, w)| (c.as_str(), *w))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// The first declared category, used when no weight is positive.
    pub fn fallback(&self) -> Option<&str> {
        self.entries.first().map(|(c, _)| c.as_str())
    }
}

/// Draw one category with probability proportional to its weight.
///
/// Draws `r` in `[0, total)` and returns the first category whose running
/// sum strictly exceeds `r`. Non-positive weights are skipped. When no
/// weight is positive the first declared category is returned without
/// consuming randomness. Returns `None` only for an empty mapping.
pub fn pick<'w>(weights: &'w Weights, rng: &mut StreamRng) -> Option<&'w str> {
    let total = weights.total();
    if total <= 0.0 || !total.is_finite() {
        return weights.fallback();
    }

    let r = rng.next_f64() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (category, w) in weights.iter() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(category);
        if r < cumulative {
            return Some(category);
        }
    }
    // Floating-point shortfall in the running sum.
    last_positive.or_else(|| weights.fallback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pairs_accumulate() {
        let w = Weights::from_pairs([("zakat", 2.0), ("travel", 1.0), ("zakat", 3.0)]);
        assert_eq!(w.len(), 2);
        assert_eq!(w.get("zakat"), 5.0);
        assert_eq!(w.categories().collect::<Vec<_>>(), vec!["zakat", "travel"]);
    }

    #[test]
    fn absent_category_weighs_zero() {
        let w = Weights::from_pairs([("login", 1.0)]);
        assert_eq!(w.get("quran_daily"), 0.0);
        assert!(!w.contains("quran_daily"));
    }

    #[test]
    fn scale_leaves_absent_categories_absent() {
        let mut w = Weights::from_pairs([("travel", 3.0)]);
        w.scale("travel", 2.0);
        w.scale("zakat", 6.0);
        assert_eq!(w.get("travel"), 6.0);
        assert!(!w.contains("zakat"));
    }

    #[test]
    fn zero_weight_entries_never_picked() {
        let w = Weights::from_pairs([("never", 0.0), ("always", 1.0), ("negative", -4.0)]);
        let mut rng = StreamRng::from_seed(11);
        for _ in 0..500 {
            assert_eq!(pick(&w, &mut rng), Some("always"));
        }
    }

    #[test]
    fn empty_mapping_yields_none() {
        let mut rng = StreamRng::from_seed(1);
        assert_eq!(pick(&Weights::new(), &mut rng), None);
    }
}
