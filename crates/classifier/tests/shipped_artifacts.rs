use std::path::PathBuf;
use std::sync::Arc;

use classifier::{ArtifactError, InferenceBackend, LinearTextModel, MlEstimator};

fn artifact(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../model")
        .join(name)
}

fn shipped_model() -> LinearTextModel {
    LinearTextModel::load(artifact("vectorizer.json"), artifact("classifier.json"))
        .expect("shipped artifacts load")
}

#[test]
fn shipped_model_separates_obvious_cases() {
    let estimator = MlEstimator::new(Arc::new(shipped_model()));
    let scam = estimator.ml_score("congratulations you win a lottery prize claim now");
    let ham = estimator.ml_score("thanks see you at lunch tomorrow");
    assert!(scam > 50.0, "scam score was {scam}");
    assert!(ham < 50.0, "ham score was {ham}");
    assert_eq!(estimator.backend_name(), "logistic_regression");
}

#[test]
fn empty_text_falls_back_to_intercept() {
    let model = shipped_model();
    let features = model.transform("");
    assert!(features.is_empty());
    let [p0, p1] = model.predict_probability(&features);
    assert!((p0 + p1 - 1.0).abs() < 1e-9);
    assert!(p1 < 0.5);
}

#[test]
fn probabilities_are_deterministic() {
    let estimator = MlEstimator::new(Arc::new(shipped_model()));
    let text = "urgent verify your bank account";
    assert_eq!(estimator.ml_score(text), estimator.ml_score(text));
}

#[test]
fn missing_artifact_is_an_io_error() {
    let err = LinearTextModel::load(artifact("does-not-exist.json"), artifact("classifier.json"))
        .unwrap_err();
    assert!(matches!(err, ArtifactError::Io { .. }));
}
