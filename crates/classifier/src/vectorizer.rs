use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::backend::FeatureVector;
use crate::error::{ArtifactError, Result};

const ARTIFACT: &str = "vectorizer";
const MAX_NGRAM: usize = 10;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("invalid token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Bag-of-n-grams vectorizer with optional tf-idf weighting, exported from the training
/// pipeline as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default = "TfidfVectorizer::default_ngram_range")]
    ngram_range: [usize; 2],
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    binary: bool,
    #[serde(default = "TfidfVectorizer::default_norm")]
    norm: Option<Norm>,
    #[serde(default = "TfidfVectorizer::default_lowercase")]
    lowercase: bool,
}

impl TfidfVectorizer {
    const fn default_ngram_range() -> [usize; 2] {
        [1, 1]
    }

    const fn default_norm() -> Option<Norm> {
        Some(Norm::L2)
    }

    const fn default_lowercase() -> bool {
        true
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let vectorizer: Self = serde_json::from_str(raw).map_err(|source| ArtifactError::Parse {
            artifact: ARTIFACT,
            source,
        })?;
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    fn validate(&self) -> Result<()> {
        let [min_n, max_n] = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::invalid(
                ARTIFACT,
                format!("ngram_range [{min_n}, {max_n}] is not a valid range"),
            ));
        }
        if max_n > MAX_NGRAM {
            return Err(ArtifactError::invalid(
                ARTIFACT,
                format!("ngram_range upper bound {max_n} exceeds {MAX_NGRAM}"),
            ));
        }
        if self.vocabulary.is_empty() {
            return Err(ArtifactError::invalid(ARTIFACT, "vocabulary is empty"));
        }
        if let Some(idf) = &self.idf {
            if let Some(bad) = idf.iter().find(|v| !v.is_finite()) {
                return Err(ArtifactError::invalid(
                    ARTIFACT,
                    format!("idf contains non-finite value {bad}"),
                ));
            }
        }
        let n_features = self.n_features();
        if let Some((term, column)) = self
            .vocabulary
            .iter()
            .find(|(_, column)| **column >= n_features)
        {
            return Err(ArtifactError::invalid(
                ARTIFACT,
                format!("term {term:?} maps to column {column} but only {n_features} features exist"),
            ));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        match &self.idf {
            Some(idf) => idf.len(),
            None => self
                .vocabulary
                .values()
                .max()
                .map_or(0, |column| column + 1),
        }
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_owned()
        };
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&text).map(|m| m.as_str()).collect();
        let [min_n, max_n] = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                grams.extend(tokens.iter().map(|t| (*t).to_owned()));
            } else {
                grams.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        grams
    }

    pub fn transform(&self, text: &str) -> FeatureVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.analyze(text) {
            if let Some(column) = self.vocabulary.get(&gram) {
                *counts.entry(*column).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = FeatureVector::from_pairs(counts.into_iter().collect());
        if self.binary {
            vector.map_values(|_| 1.0);
        } else if self.sublinear_tf {
            vector.map_values(|tf| 1.0 + tf.ln());
        }

        if let Some(idf) = &self.idf {
            let weighted = vector
                .entries()
                .iter()
                .map(|(column, value)| (*column, value * idf[*column]))
                .collect();
            vector = FeatureVector::from_pairs(weighted);
        }

        let norm = match self.norm {
            Some(Norm::L2) => vector
                .entries()
                .iter()
                .map(|(_, v)| v * v)
                .sum::<f64>()
                .sqrt(),
            Some(Norm::L1) => vector.entries().iter().map(|(_, v)| v.abs()).sum(),
            None => 0.0,
        };
        if norm > 0.0 {
            vector.map_values(|v| v / norm);
        }
        vector
    }
}
