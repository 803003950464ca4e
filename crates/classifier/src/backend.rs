/// Sparse feature vector. Entries are sorted by column and columns are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Builds a vector from unordered `(column, value)` pairs, summing duplicate columns
    /// and dropping zeros.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(column, _)| *column);
        let mut entries: Vec<(usize, f64)> = Vec::with_capacity(pairs.len());
        for (column, value) in pairs {
            match entries.last_mut() {
                Some((last, acc)) if *last == column => *acc += value,
                _ => entries.push((column, value)),
            }
        }
        entries.retain(|(_, value)| *value != 0.0);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(column, value)| weights.get(*column).map(|w| w * value))
            .sum()
    }

    pub(crate) fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for (_, value) in &mut self.entries {
            *value = f(*value);
        }
    }
}

/// `[p_not_scam, p_scam]`; the two entries sum to one.
pub type ClassProbabilities = [f64; 2];

/// A trained text model split into its two stages. Implementations are shared across
/// request handlers, so inference must not require `&mut self`.
pub trait InferenceBackend: Send + Sync {
    fn transform(&self, text: &str) -> FeatureVector;
    fn predict_probability(&self, features: &FeatureVector) -> ClassProbabilities;

    fn name(&self) -> &str {
        "unnamed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_merges_and_sorts() {
        let v = FeatureVector::from_pairs(vec![(3, 1.0), (1, 2.0), (3, 0.5), (2, 0.0)]);
        assert_eq!(v.entries(), &[(1, 2.0), (3, 1.5)]);
    }

    #[test]
    fn dot_ignores_out_of_range_columns() {
        let v = FeatureVector::from_pairs(vec![(0, 2.0), (9, 1.0)]);
        assert_eq!(v.dot(&[0.5, 1.0]), 1.0);
    }
}
