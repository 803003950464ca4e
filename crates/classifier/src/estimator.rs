use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::backend::{ClassProbabilities, FeatureVector, InferenceBackend};
use crate::error::{ArtifactError, Result};
use crate::model::LinearClassifier;
use crate::vectorizer::TfidfVectorizer;

/// Vectorizer and linear classifier loaded from JSON artifacts. Both halves are read-only
/// after loading, so one instance serves every concurrent caller.
#[derive(Debug, Clone)]
pub struct LinearTextModel {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
}

impl LinearTextModel {
    pub fn new(vectorizer: TfidfVectorizer, classifier: LinearClassifier) -> Result<Self> {
        let expected = vectorizer.n_features();
        let actual = classifier.n_features();
        if expected != actual {
            return Err(ArtifactError::invalid(
                "classifier",
                format!("expects {actual} features but the vectorizer produces {expected}"),
            ));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn load(
        vectorizer_path: impl AsRef<Path>,
        classifier_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vectorizer = TfidfVectorizer::from_path(vectorizer_path.as_ref())?;
        let classifier = LinearClassifier::from_path(classifier_path.as_ref())?;
        let model = Self::new(vectorizer, classifier)?;
        info!(
            kind = model.classifier.kind(),
            features = model.vectorizer.n_features(),
            vectorizer = %vectorizer_path.as_ref().display(),
            classifier = %classifier_path.as_ref().display(),
            "loaded text model artifacts"
        );
        Ok(model)
    }
}

impl InferenceBackend for LinearTextModel {
    fn transform(&self, text: &str) -> FeatureVector {
        self.vectorizer.transform(text)
    }

    fn predict_probability(&self, features: &FeatureVector) -> ClassProbabilities {
        self.classifier.predict_probability(features)
    }

    fn name(&self) -> &str {
        self.classifier.kind()
    }
}

/// Turns normalized text into a scam likelihood on a 0..=100 scale.
#[derive(Clone)]
pub struct MlEstimator {
    backend: Arc<dyn InferenceBackend>,
}

impl MlEstimator {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn ml_score(&self, normalized_text: &str) -> f64 {
        let features = self.backend.transform(normalized_text);
        let [_, p_scam] = self.backend.predict_probability(&features);
        if p_scam.is_nan() {
            return 0.0;
        }
        (p_scam * 100.0).clamp(0.0, 100.0)
    }
}

impl fmt::Debug for MlEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MlEstimator")
            .field("backend", &self.backend_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl InferenceBackend for Fixed {
        fn transform(&self, _text: &str) -> FeatureVector {
            FeatureVector::default()
        }

        fn predict_probability(&self, _features: &FeatureVector) -> ClassProbabilities {
            [1.0 - self.0, self.0]
        }
    }

    #[test]
    fn scales_probability_to_percent() {
        let estimator = MlEstimator::new(Arc::new(Fixed(0.42)));
        assert!((estimator.ml_score("anything") - 42.0).abs() < 1e-9);
        assert_eq!(estimator.backend_name(), "unnamed");
    }

    #[test]
    fn out_of_range_probability_is_clamped() {
        assert_eq!(MlEstimator::new(Arc::new(Fixed(1.5))).ml_score(""), 100.0);
        assert_eq!(MlEstimator::new(Arc::new(Fixed(f64::NAN))).ml_score(""), 0.0);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let vectorizer =
            TfidfVectorizer::from_json_str(r#"{"vocabulary": {"win": 0, "now": 1}}"#).unwrap();
        let classifier = LinearClassifier::from_json_str(
            r#"{"kind": "logistic_regression", "coef": [1.0], "intercept": 0.0}"#,
        )
        .unwrap();
        assert!(LinearTextModel::new(vectorizer, classifier).is_err());
    }
}
