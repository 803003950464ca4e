use std::path::Path;

use serde::Deserialize;

use crate::backend::{ClassProbabilities, FeatureVector};
use crate::error::{ArtifactError, Result};

const ARTIFACT: &str = "classifier";

/// Binary probabilistic classifier exported from the training pipeline. Class 0 is
/// "not scam", class 1 is "scam".
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearClassifier {
    LogisticRegression {
        coef: Vec<f64>,
        intercept: f64,
    },
    MultinomialNb {
        class_log_prior: [f64; 2],
        feature_log_prob: [Vec<f64>; 2],
    },
}

impl LinearClassifier {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(raw).map_err(|source| ArtifactError::Parse {
            artifact: ARTIFACT,
            source,
        })?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::LogisticRegression { coef, intercept } => {
                if !all_finite(coef) || !intercept.is_finite() {
                    return Err(ArtifactError::invalid(
                        ARTIFACT,
                        "logistic regression parameters must be finite",
                    ));
                }
            }
            Self::MultinomialNb {
                class_log_prior,
                feature_log_prob,
            } => {
                if !all_finite(class_log_prior)
                    || !feature_log_prob.iter().all(|row| all_finite(row))
                {
                    return Err(ArtifactError::invalid(
                        ARTIFACT,
                        "naive bayes log probabilities must be finite",
                    ));
                }
                if feature_log_prob[0].len() != feature_log_prob[1].len() {
                    return Err(ArtifactError::invalid(
                        ARTIFACT,
                        format!(
                            "feature_log_prob rows differ in length ({} vs {})",
                            feature_log_prob[0].len(),
                            feature_log_prob[1].len()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::LogisticRegression { coef, .. } => coef.len(),
            Self::MultinomialNb {
                feature_log_prob, ..
            } => feature_log_prob[0].len(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::MultinomialNb { .. } => "multinomial_nb",
        }
    }

    pub fn predict_probability(&self, features: &FeatureVector) -> ClassProbabilities {
        match self {
            Self::LogisticRegression { coef, intercept } => {
                let p = sigmoid(features.dot(coef) + intercept);
                [1.0 - p, p]
            }
            Self::MultinomialNb {
                class_log_prior,
                feature_log_prob,
            } => {
                let jll = [
                    class_log_prior[0] + features.dot(&feature_log_prob[0]),
                    class_log_prior[1] + features.dot(&feature_log_prob[1]),
                ];
                let max = jll[0].max(jll[1]);
                let log_norm = max + ((jll[0] - max).exp() + (jll[1] - max).exp()).ln();
                [(jll[0] - log_norm).exp(), (jll[1] - log_norm).exp()]
            }
        }
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_zero_vector_uses_intercept() {
        let model = LinearClassifier::from_json_str(
            r#"{"kind": "logistic_regression", "coef": [1.0, 2.0], "intercept": 0.0}"#,
        )
        .unwrap();
        let [p0, p1] = model.predict_probability(&FeatureVector::default());
        assert!((p0 - 0.5).abs() < 1e-12);
        assert!((p1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn logistic_positive_weight_raises_scam_probability() {
        let model = LinearClassifier::from_json_str(
            r#"{"kind": "logistic_regression", "coef": [3.0], "intercept": -1.0}"#,
        )
        .unwrap();
        let [_, p1] = model.predict_probability(&FeatureVector::from_pairs(vec![(0, 1.0)]));
        assert!(p1 > 0.8);
    }

    #[test]
    fn naive_bayes_probabilities_sum_to_one() {
        let model = LinearClassifier::from_json_str(
            r#"{
                "kind": "multinomial_nb",
                "class_log_prior": [-0.2231, -1.6094],
                "feature_log_prob": [[-2.0, -0.2], [-0.1, -3.0]]
            }"#,
        )
        .unwrap();
        let [p0, p1] = model.predict_probability(&FeatureVector::from_pairs(vec![(0, 3.0)]));
        assert!((p0 + p1 - 1.0).abs() < 1e-9);
        assert!(p1 > p0);
    }

    #[test]
    fn sigmoid_is_stable_for_large_inputs() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = LinearClassifier::from_json_str(r#"{"kind": "svm"}"#).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }
}
