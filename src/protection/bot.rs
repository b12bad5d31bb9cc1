//! Bot classification from request metadata.

use regex::Regex;
use serde::{Deserialize, Serialize};

// == Request Metadata ==
/// Ambient request metadata available to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    /// Browser reports it is driven by automation (`navigator.webdriver`)
    #[serde(default)]
    pub webdriver: bool,
}

impl RequestMeta {
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            webdriver: false,
        }
    }
}

// == Bot Signal ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotSignal {
    pub is_bot: bool,
    /// Kind of bot, e.g. `search_engine` or `automation`
    pub category: Option<String>,
}

impl BotSignal {
    pub fn human() -> Self {
        Self {
            is_bot: false,
            category: None,
        }
    }

    pub fn bot(category: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            category: Some(category.into()),
        }
    }
}

/// Decides whether a request comes from a bot.
pub trait BotClassifier: Send + Sync + std::fmt::Debug {
    fn classify(&self, meta: &RequestMeta) -> BotSignal;
}

// == User Agent Classifier ==
/// Classifies requests by matching the user agent against ordered rules.
/// The first matching rule names the category.
#[derive(Debug)]
pub struct UserAgentClassifier {
    rules: Vec<(&'static str, Regex)>,
}

const DEFAULT_RULES: [(&str, &str); 5] = [
    (
        "search_engine",
        r"(?i)googlebot|bingbot|duckduckbot|baiduspider|yandex(bot)?|slurp|applebot",
    ),
    (
        "social_preview",
        r"(?i)facebookexternalhit|twitterbot|linkedinbot|slackbot|discordbot|whatsapp|telegrambot",
    ),
    (
        "automation",
        r"(?i)headlesschrome|phantomjs|selenium|puppeteer|playwright|webdriver",
    ),
    (
        "http_client",
        r"(?i)^(curl|wget|python-requests|python-urllib|go-http-client|okhttp|axios|node-fetch|postmanruntime|java)[/ ]",
    ),
    ("crawler", r"(?i)bot\b|crawl|spider|scrap"),
];

impl UserAgentClassifier {
    /// Builds the classifier with the built-in rule set.
    pub fn new() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(category, pattern)| {
                (
                    *category,
                    Regex::new(pattern).expect("built-in user-agent rule must compile"),
                )
            })
            .collect();
        Self { rules }
    }
}

impl Default for UserAgentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BotClassifier for UserAgentClassifier {
    fn classify(&self, meta: &RequestMeta) -> BotSignal {
        if meta.webdriver {
            return BotSignal::bot("automation");
        }

        let user_agent = match meta.user_agent.as_deref().map(str::trim) {
            Some(ua) if !ua.is_empty() => ua,
            _ => return BotSignal::bot("missing_user_agent"),
        };

        self.rules
            .iter()
            .find(|(_, pattern)| pattern.is_match(user_agent))
            .map(|(category, _)| BotSignal::bot(*category))
            .unwrap_or_else(BotSignal::human)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    fn classify(ua: &str) -> BotSignal {
        UserAgentClassifier::new().classify(&RequestMeta::with_user_agent(ua))
    }

    #[test]
    fn test_regular_browser_is_human() {
        assert_eq!(classify(CHROME), BotSignal::human());
    }

    #[test]
    fn test_categories() {
        let cases = [
            ("Mozilla/5.0 (compatible; Googlebot/2.1)", "search_engine"),
            ("facebookexternalhit/1.1", "social_preview"),
            ("Mozilla/5.0 HeadlessChrome/124.0", "automation"),
            ("curl/8.4.0", "http_client"),
            ("python-requests/2.31", "http_client"),
            ("SomeRandomCrawler/0.1", "crawler"),
        ];
        for (ua, category) in cases {
            let signal = classify(ua);
            assert!(signal.is_bot, "{} should be a bot", ua);
            assert_eq!(signal.category.as_deref(), Some(category), "{}", ua);
        }
    }

    #[test]
    fn test_missing_user_agent() {
        let classifier = UserAgentClassifier::new();
        let signal = classifier.classify(&RequestMeta::default());
        assert_eq!(signal, BotSignal::bot("missing_user_agent"));

        let signal = classifier.classify(&RequestMeta::with_user_agent("   "));
        assert!(signal.is_bot);
    }

    #[test]
    fn test_webdriver_flag() {
        let meta = RequestMeta {
            user_agent: Some(CHROME.to_string()),
            webdriver: true,
        };
        assert_eq!(
            UserAgentClassifier::new().classify(&meta),
            BotSignal::bot("automation")
        );
    }
}
