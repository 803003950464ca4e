use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use crate::policy::{PolicyError, ScoringPolicy};
use crate::scorer::Scorer;

/// Holds the active [`Scorer`] and swaps in a new one when the policy file is reloaded.
/// Readers take a snapshot without locking, so in-flight requests finish on the policy
/// they started with.
pub struct ScorerHandle {
    current: ArcSwap<Scorer>,
    policy_path: PathBuf,
}

impl ScorerHandle {
    pub fn new(scorer: Scorer, policy_path: impl AsRef<Path>) -> Self {
        Self {
            current: ArcSwap::from_pointee(scorer),
            policy_path: policy_path.as_ref().to_path_buf(),
        }
    }

    pub fn current(&self) -> Arc<Scorer> {
        self.current.load_full()
    }

    /// Re-reads the policy file. On error the active policy stays in place.
    pub fn reload(&self) -> Result<Arc<ScoringPolicy>, PolicyError> {
        match ScoringPolicy::load(&self.policy_path) {
            Ok(policy) => Ok(self.replace_policy(policy)),
            Err(err) => {
                warn!(
                    path = %self.policy_path.display(),
                    error = %err,
                    "policy reload rejected; keeping active policy"
                );
                Err(err)
            }
        }
    }

    pub fn replace_policy(&self, policy: ScoringPolicy) -> Arc<ScoringPolicy> {
        let policy = Arc::new(policy);
        let previous = self.current.load();
        info!(
            from = previous.policy().version(),
            to = policy.version(),
            keywords = policy.keywords().len(),
            threshold = policy.threshold(),
            "scoring policy replaced"
        );
        self.current
            .store(Arc::new(previous.with_policy(Arc::clone(&policy))));
        policy
    }
}
