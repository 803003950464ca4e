pub mod features;
pub mod policy;
pub mod reload;
pub mod rules;
pub mod scorer;

pub use features::{extract_signals, MessageSignals};
pub use policy::{HeuristicWeights, PolicyError, ScoringPolicy};
pub use reload::ScorerHandle;
pub use rules::{RuleEngine, RuleOutcome};
pub use scorer::{ScoreBreakdown, Scorer};
