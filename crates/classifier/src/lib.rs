pub mod backend;
pub mod error;
pub mod estimator;
pub mod model;
pub mod vectorizer;

pub use backend::{ClassProbabilities, FeatureVector, InferenceBackend};
pub use error::ArtifactError;
pub use estimator::{LinearTextModel, MlEstimator};
pub use model::LinearClassifier;
pub use vectorizer::{Norm, TfidfVectorizer};
