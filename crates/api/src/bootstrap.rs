use std::sync::Arc;

use analysis::{Scorer, ScorerHandle, ScoringPolicy};
use classifier::{LinearTextModel, MlEstimator};
use common::{AppConfig, AppError};
use tracing::info;

/// Loads the model artifacts and the scoring policy. Either failing aborts startup; there is
/// no mode that scores without the classifier.
pub fn load_scorer(config: &AppConfig) -> common::Result<ScorerHandle> {
    let model = LinearTextModel::load(
        &config.model.vectorizer_path,
        &config.model.classifier_path,
    )
    .map_err(AppError::artifact)?;
    let estimator = MlEstimator::new(Arc::new(model));
    let policy = ScoringPolicy::load(&config.scoring.policy_path).map_err(AppError::policy)?;
    info!(
        policy = policy.version(),
        model = estimator.backend_name(),
        threshold = policy.threshold(),
        keywords = policy.keywords().len(),
        "scoring policy loaded"
    );

    let scorer = Scorer::new(Arc::new(policy), estimator);
    Ok(ScorerHandle::new(scorer, &config.scoring.policy_path))
}
