use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to load policy {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("failed to parse policy: {0}")]
    Parse(#[from] ConfigError),
    #[error("weight for {name} must be non-negative, got {weight}")]
    NegativeWeight { name: String, weight: i64 },
    #[error("keyword {0:?} must be a non-empty lowercase token")]
    InvalidKeyword(String),
    #[error("{list} entry {entry:?} must be a non-empty lowercase string")]
    InvalidEntry { list: &'static str, entry: String },
    #[error("threshold {0} is outside 0..=100")]
    ThresholdOutOfRange(f64),
}

/// On-disk shape of the policy. Weights are signed here so that a negative value is reported
/// as such instead of as a type error.
///
/// Keys read through `config` are folded to lowercase, so a file keyword `OTP` loads as `otp`.
/// The lowercase check on keywords only rejects values built in code.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    #[serde(default = "PolicyFile::default_version")]
    pub version: String,
    pub threshold: f64,
    pub brand_exempt_suffix: String,
    pub weights: WeightsFile,
    pub keywords: BTreeMap<String, i64>,
    pub lists: ListsFile,
}

impl PolicyFile {
    fn default_version() -> String {
        "unversioned".to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsFile {
    pub short_domain: i64,
    pub suspicious_domain: i64,
    pub multi_link: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListsFile {
    #[serde(default)]
    pub short_domains: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub suspicious_tlds: Vec<String>,
}

/// Points added by the link heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeuristicWeights {
    pub short_domain: u64,
    pub suspicious_domain: u64,
    pub multi_link: u64,
}

/// Validated, immutable scoring policy. Built once and shared behind an `Arc`; a reload
/// produces a new value rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringPolicy {
    version: String,
    threshold: f64,
    brand_exempt_suffix: String,
    weights: HeuristicWeights,
    keywords: BTreeMap<String, u64>,
    short_domains: Vec<String>,
    brands: Vec<String>,
    suspicious_tlds: Vec<String>,
}

impl ScoringPolicy {
    /// Reads the policy file, then applies `POLICY__*` environment overrides
    /// (for example `POLICY__THRESHOLD=60`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let file: PolicyFile = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(Environment::with_prefix("POLICY").separator("__"))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|source| PolicyError::Load {
                path: path.to_path_buf(),
                source,
            })?;
        Self::try_from(file)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Self::try_from(file)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn brand_exempt_suffix(&self) -> &str {
        &self.brand_exempt_suffix
    }

    pub fn weights(&self) -> HeuristicWeights {
        self.weights
    }

    pub fn keywords(&self) -> &BTreeMap<String, u64> {
        &self.keywords
    }

    pub fn short_domains(&self) -> &[String] {
        &self.short_domains
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn suspicious_tlds(&self) -> &[String] {
        &self.suspicious_tlds
    }

    /// Same policy with a different decision threshold.
    pub fn with_threshold(&self, threshold: f64) -> Result<Self, PolicyError> {
        check_threshold(threshold)?;
        Ok(Self {
            threshold,
            ..self.clone()
        })
    }

    /// Same policy with one keyword added or re-weighted.
    pub fn with_keyword(&self, keyword: &str, weight: u64) -> Result<Self, PolicyError> {
        check_keyword(keyword)?;
        let mut keywords = self.keywords.clone();
        keywords.insert(keyword.to_owned(), weight);
        Ok(Self {
            keywords,
            ..self.clone()
        })
    }
}

impl TryFrom<PolicyFile> for ScoringPolicy {
    type Error = PolicyError;

    fn try_from(file: PolicyFile) -> Result<Self, Self::Error> {
        check_threshold(file.threshold)?;
        check_entry("brand_exempt_suffix", &file.brand_exempt_suffix)?;

        let weights = HeuristicWeights {
            short_domain: non_negative("short_domain", file.weights.short_domain)?,
            suspicious_domain: non_negative("suspicious_domain", file.weights.suspicious_domain)?,
            multi_link: non_negative("multi_link", file.weights.multi_link)?,
        };

        let mut keywords = BTreeMap::new();
        for (keyword, weight) in file.keywords {
            check_keyword(&keyword)?;
            let weight = non_negative(&format!("keyword {keyword:?}"), weight)?;
            keywords.insert(keyword, weight);
        }

        for (list, entries) in [
            ("short_domains", &file.lists.short_domains),
            ("brands", &file.lists.brands),
            ("suspicious_tlds", &file.lists.suspicious_tlds),
        ] {
            for entry in entries {
                check_entry(list, entry)?;
            }
        }

        Ok(Self {
            version: file.version,
            threshold: file.threshold,
            brand_exempt_suffix: file.brand_exempt_suffix,
            weights,
            keywords,
            short_domains: file.lists.short_domains,
            brands: file.lists.brands,
            suspicious_tlds: file.lists.suspicious_tlds,
        })
    }
}

fn check_threshold(threshold: f64) -> Result<(), PolicyError> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(())
    } else {
        Err(PolicyError::ThresholdOutOfRange(threshold))
    }
}

fn non_negative(name: &str, weight: i64) -> Result<u64, PolicyError> {
    u64::try_from(weight).map_err(|_| PolicyError::NegativeWeight {
        name: name.to_owned(),
        weight,
    })
}

fn check_keyword(keyword: &str) -> Result<(), PolicyError> {
    if is_lowercase_entry(keyword) {
        Ok(())
    } else {
        Err(PolicyError::InvalidKeyword(keyword.to_owned()))
    }
}

fn check_entry(list: &'static str, entry: &str) -> Result<(), PolicyError> {
    if is_lowercase_entry(entry) {
        Ok(())
    } else {
        Err(PolicyError::InvalidEntry {
            list,
            entry: entry.to_owned(),
        })
    }
}

fn is_lowercase_entry(value: &str) -> bool {
    !value.trim().is_empty() && value.to_lowercase() == value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> PolicyFile {
        PolicyFile {
            version: "test".into(),
            threshold: 55.0,
            brand_exempt_suffix: ".com".into(),
            weights: WeightsFile {
                short_domain: 20,
                suspicious_domain: 30,
                multi_link: 10,
            },
            keywords: BTreeMap::from([("otp".to_string(), 25)]),
            lists: ListsFile {
                short_domains: vec!["bit.ly".into()],
                brands: vec!["paytm".into()],
                suspicious_tlds: vec![".xyz".into()],
            },
        }
    }

    #[test]
    fn valid_file_converts() {
        let policy = ScoringPolicy::try_from(file()).unwrap();
        assert_eq!(policy.keywords().get("otp"), Some(&25));
        assert_eq!(policy.weights().multi_link, 10);
    }

    #[test]
    fn negative_keyword_weight_is_rejected() {
        let mut f = file();
        f.keywords.insert("prize".into(), -1);
        let err = ScoringPolicy::try_from(f).unwrap_err();
        assert!(matches!(err, PolicyError::NegativeWeight { weight: -1, .. }));
    }

    #[test]
    fn negative_heuristic_weight_is_rejected() {
        let mut f = file();
        f.weights.multi_link = -10;
        assert!(matches!(
            ScoringPolicy::try_from(f),
            Err(PolicyError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn uppercase_keyword_is_rejected() {
        let mut f = file();
        f.keywords.insert("OTP".into(), 5);
        assert!(matches!(
            ScoringPolicy::try_from(f),
            Err(PolicyError::InvalidKeyword(_))
        ));
    }

    #[test]
    fn file_keywords_are_folded_to_lowercase() {
        let policy = ScoringPolicy::from_toml_str(
            r#"
            threshold = 55
            brand_exempt_suffix = ".com"
            [weights]
            short_domain = 20
            suspicious_domain = 30
            multi_link = 10
            [keywords]
            OTP = 25
            [lists]
            brands = ["paytm"]
            "#,
        )
        .unwrap();
        assert_eq!(policy.keywords().get("otp"), Some(&25));
        assert!(!policy.keywords().contains_key("OTP"));
    }

    #[test]
    fn with_keyword_rejects_uppercase() {
        let policy = ScoringPolicy::try_from(file()).unwrap();
        assert!(matches!(
            policy.with_keyword("Prize", 5),
            Err(PolicyError::InvalidKeyword(_))
        ));
        let wider = policy.with_keyword("prize", 5).unwrap();
        assert_eq!(wider.keywords().get("prize"), Some(&5));
    }

    #[test]
    fn empty_list_entry_is_rejected() {
        let mut f = file();
        f.lists.brands.push(" ".into());
        assert!(matches!(
            ScoringPolicy::try_from(f),
            Err(PolicyError::InvalidEntry { list: "brands", .. })
        ));
    }

    #[test]
    fn threshold_must_be_a_percentage() {
        let mut f = file();
        f.threshold = 120.0;
        assert!(matches!(
            ScoringPolicy::try_from(f),
            Err(PolicyError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn parses_toml_source() {
        let policy = ScoringPolicy::from_toml_str(
            r#"
            threshold = 40
            brand_exempt_suffix = ".com"
            [weights]
            short_domain = 1
            suspicious_domain = 2
            multi_link = 3
            [keywords]
            win = 7
            [lists]
            brands = ["acme"]
            "#,
        )
        .unwrap();
        assert_eq!(policy.threshold(), 40.0);
        assert_eq!(policy.version(), "unversioned");
        assert!(policy.short_domains().is_empty());
        assert_eq!(policy.keywords().get("win"), Some(&7));
    }
}
