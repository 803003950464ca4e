use tracing::debug;

use crate::policy::ScoringPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleOutcome {
    pub points: u64,
    pub reasons: Vec<String>,
}

impl RuleOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, delta: u64, reason: impl Into<String>) {
        self.points = self.points.saturating_add(delta);
        self.reasons.push(reason.into());
    }
}

/// Link and vocabulary heuristics driven entirely by a [`ScoringPolicy`].
pub struct RuleEngine<'a> {
    policy: &'a ScoringPolicy,
}

impl<'a> RuleEngine<'a> {
    pub fn new(policy: &'a ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn version(&self) -> &str {
        self.policy.version()
    }

    pub fn is_short_url(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.policy
            .short_domains()
            .iter()
            .any(|domain| url.contains(domain.as_str()))
    }

    /// A brand name outside the exempt suffix, or any suspicious TLD fragment.
    pub fn is_suspicious_domain(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        let impersonates_brand = !url.ends_with(self.policy.brand_exempt_suffix())
            && self
                .policy
                .brands()
                .iter()
                .any(|brand| url.contains(brand.as_str()));
        impersonates_brand
            || self
                .policy
                .suspicious_tlds()
                .iter()
                .any(|tld| url.contains(tld.as_str()))
    }

    pub fn url_risk(&self, urls: &[String]) -> RuleOutcome {
        let weights = self.policy.weights();
        let mut outcome = RuleOutcome::new();

        for url in urls {
            if self.is_short_url(url) {
                outcome.push(weights.short_domain, "url:short_domain");
            }
            if self.is_suspicious_domain(url) {
                outcome.push(weights.suspicious_domain, "url:suspicious_domain");
            }
        }

        if urls.len() > 1 {
            let extra = (urls.len() - 1) as u64;
            outcome.push(weights.multi_link.saturating_mul(extra), "url:multi_link");
        }

        debug!(urls = urls.len(), points = outcome.points, "url heuristics applied");
        outcome
    }

    /// Each keyword counts once no matter how often it appears. Matching is by substring,
    /// so `bank` also fires on `banking`.
    pub fn keyword_risk(&self, text: &str) -> RuleOutcome {
        let lower = text.to_lowercase();
        let mut outcome = RuleOutcome::new();
        for (keyword, weight) in self.policy.keywords() {
            if lower.contains(keyword.as_str()) {
                outcome.push(*weight, format!("keyword:{keyword}"));
            }
        }
        debug!(
            matched = outcome.reasons.len(),
            points = outcome.points,
            "keyword heuristics applied"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ScoringPolicy {
        ScoringPolicy::from_toml_str(
            r#"
            threshold = 55
            brand_exempt_suffix = ".com"
            [weights]
            short_domain = 20
            suspicious_domain = 30
            multi_link = 10
            [keywords]
            bank = 10
            otp = 25
            [lists]
            short_domains = ["bit.ly"]
            brands = ["paytm"]
            suspicious_tlds = [".xyz"]
            "#,
        )
        .expect("test policy")
    }

    #[test]
    fn short_url_is_case_insensitive() {
        let policy = policy();
        let engine = RuleEngine::new(&policy);
        assert!(engine.is_short_url("http://BIT.LY/abc"));
        assert!(!engine.is_short_url("http://example.org"));
    }

    #[test]
    fn brand_on_dot_com_is_exempt() {
        let policy = policy();
        let engine = RuleEngine::new(&policy);
        assert!(!engine.is_suspicious_domain("https://paytm.com"));
        assert!(engine.is_suspicious_domain("https://paytm.com/login"));
        assert!(engine.is_suspicious_domain("https://paytm-rewards.in"));
    }

    #[test]
    fn suspicious_tld_triggers_even_on_dot_com() {
        let policy = policy();
        let engine = RuleEngine::new(&policy);
        assert!(engine.is_suspicious_domain("http://win.xyz.com"));
    }

    #[test]
    fn short_and_suspicious_both_apply() {
        let policy = policy();
        let engine = RuleEngine::new(&policy);
        let outcome = engine.url_risk(&["http://bit.ly/paytm".to_string()]);
        assert_eq!(outcome.points, 50);
        assert_eq!(
            outcome.reasons,
            vec!["url:short_domain", "url:suspicious_domain"]
        );
    }

    #[test]
    fn keyword_counts_once() {
        let policy = policy();
        let engine = RuleEngine::new(&policy);
        assert_eq!(engine.keyword_risk("OTP otp otp").points, 25);
        assert_eq!(engine.keyword_risk("online banking").points, 10);
        assert_eq!(engine.keyword_risk("").points, 0);
    }
}
