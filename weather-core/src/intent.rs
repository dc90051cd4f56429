//! Free-text chat messages → place name.
//!
//! A message must mention the weather (one of [`WEATHER_KEYWORDS`]) and match
//! one of a few fixed phrasings. Everything else is a validation failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{error::WeatherError, outcome::Outcome};

pub const WEATHER_KEYWORDS: &[&str] = &["天気", "気温", "天候", "weather", "forecast", "temperature"];

/// Words that can sit where a place name goes but are not places.
const NOT_PLACES: &[&str] = &["今日", "明日", "今", "today", "tomorrow", "the", "current"];

/// Tokens that mark a captured phrase as part of a question, not a place.
const QUESTION_WORDS: &[&str] = &["what", "what's", "whats", "how", "how's", "is", "will", "does"];

const TRAILING_NOISE: &[char] = &['?', '？', '!', '！', '.', '。', ' ', '　'];

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 東京の天気 / 大阪は天気どう？ / 札幌の今日の気温 / 明日の東京の天気
        r"^(?:今日の|明日の|今の)?(?P<place>.+?)(?:の|は|で)(?:今日の|明日の|今の)?(?:天気|気温|天候)",
        // 天気 東京 / 天気：東京
        r"^(?:天気|気温|天候)[\s:：　]+(?P<place>.+)$",
        // what's the weather like in New York? / forecast for Paris
        r"(?i)\b(?:weather|forecast|temperature)\b.*?\s(?:in|for|at|of)\s+(?P<place>.+?)[\s?？!！.。]*$",
        // Tokyo weather / London forecast?
        r"(?i)^(?P<place>\S.{0,40}?)\s+(?:weather|forecast)[\s?？!！.。]*$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract the place name a chat message asks about.
pub fn parse_place(message: &str) -> Outcome<String> {
    let text = message.trim();
    let lower = text.to_lowercase();

    if !WEATHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Err(WeatherError::validation(
            "message does not ask about the weather",
            "message",
        ));
    }

    PATTERNS
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.name("place").map(|m| clean(m.as_str())))
        .find(|place| is_place(place))
        .ok_or_else(|| WeatherError::validation("no place name found in message", "message"))
}

fn is_place(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    !lower.is_empty()
        && !NOT_PLACES.contains(&lower.as_str())
        && !lower
            .split_whitespace()
            .any(|word| QUESTION_WORDS.contains(&word))
}

fn clean(raw: &str) -> String {
    raw.trim().trim_end_matches(TRAILING_NOISE).trim().to_string()
}
