use common::text::{extract_urls, normalize_message};

/// Everything the scorer derives from the raw text before any weighting happens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSignals {
    /// Input to the classifier.
    pub cleaned: String,
    pub urls: Vec<String>,
}

pub fn extract_signals(text: &str) -> MessageSignals {
    MessageSignals {
        cleaned: normalize_message(text),
        urls: extract_urls(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_survive_while_cleaned_text_drops_them() {
        let signals = extract_signals("Verify at http://bit.ly/xyz now");
        assert_eq!(signals.urls, vec!["http://bit.ly/xyz"]);
        assert_eq!(signals.cleaned, "verify at  now");
    }

    #[test]
    fn empty_text_has_no_signals() {
        assert_eq!(extract_signals(""), MessageSignals::default());
    }
}
