use echolink_core::{EchoLinkError, EchoLinkResult};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Slack shortcodes the agent's own emoji come back as, plus a few that
/// professionals commonly use.
const DEFAULT_SHORTCODES: &[(&str, &str)] = &[
    ("blush", "😊"),
    ("wave", "👋"),
    ("+1", "👍"),
    ("thumbsup", "👍"),
    ("star2", "🌟"),
    ("bulb", "💡"),
    ("tada", "🎉"),
    ("smile", "😄"),
    ("point_right", "👉"),
    ("raised_hands", "🙌"),
    ("hugging_face", "🤗"),
    ("smiley", "😃"),
    ("sweat_smile", "😅"),
    ("mag_right", "🔎"),
    ("mortar_board", "🎓"),
    ("grinning", "😀"),
    ("one", "1️⃣"),
    ("two", "2️⃣"),
    ("female-technologist", "👩‍💻"),
    ("male-technologist", "👨‍💻"),
    ("female-student", "👩‍🎓"),
];

const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    // Last, so "&amp;lt;" becomes "&lt;" rather than "<".
    ("&amp;", "&"),
];

/// Turns chat-platform text back into what the agent actually said.
///
/// Angle brackets from link/mention markup are dropped, HTML entities are
/// unescaped and `:shortcode:` tokens are replaced from a lookup table.
/// Unknown shortcodes are left as they are.
pub struct TextNormalizer {
    shortcodes: HashMap<String, String>,
    token: Regex,
}

impl TextNormalizer {
    /// Normalizer with the built-in shortcode table.
    pub fn new() -> EchoLinkResult<Self> {
        Self::with_shortcodes(HashMap::new())
    }

    /// Built-in table extended (and overridden) by `extra`.
    pub fn with_shortcodes(extra: HashMap<String, String>) -> EchoLinkResult<Self> {
        let mut shortcodes: HashMap<String, String> = DEFAULT_SHORTCODES
            .iter()
            .map(|(code, emoji)| ((*code).to_string(), (*emoji).to_string()))
            .collect();
        shortcodes.extend(extra);

        let token = Regex::new(r":([a-z0-9_+\-]+):")
            .map_err(|e| EchoLinkError::Config(format!("invalid shortcode pattern: {e}")))?;

        Ok(Self { shortcodes, token })
    }

    pub fn normalize(&self, text: &str) -> String {
        let stripped: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();

        let unescaped = ENTITIES
            .iter()
            .fold(stripped, |acc, (entity, plain)| acc.replace(entity, plain));

        self.token
            .replace_all(&unescaped, |caps: &Captures<'_>| {
                self.shortcodes
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .trim()
            .to_string()
    }
}
