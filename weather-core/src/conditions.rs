//! WMO weather interpretation codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_CONDITION: &str = "Unknown";

const WMO_LABELS: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// A single label override, as stored in the config file:
///
/// ```toml
/// [[conditions]]
/// code = 45
/// label = "Fog"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionLabel {
    pub code: i32,
    pub label: String,
}

/// Code-to-text lookup. Codes without an entry decode to [`UNKNOWN_CONDITION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionTable {
    labels: BTreeMap<i32, String>,
}

impl Default for ConditionTable {
    fn default() -> Self {
        Self {
            labels: WMO_LABELS
                .iter()
                .map(|(code, label)| (*code, (*label).to_string()))
                .collect(),
        }
    }
}

impl ConditionTable {
    /// Canonical table with `overrides` applied on top.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = &'a ConditionLabel>) -> Self {
        let mut table = Self::default();
        for o in overrides {
            table.labels.insert(o.code, o.label.clone());
        }
        table
    }

    pub fn describe(&self, code: i32) -> &str {
        self.labels
            .get(&code)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CONDITION)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
