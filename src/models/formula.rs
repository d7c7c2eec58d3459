use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A user-selectable scent profile, identified on the wire by its color code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    Red,
    Blue,
    Yellow,
    Green,
}

/// Fixed wire/scoring order; quiz tie-breaking depends on it.
pub const ALL_FORMULAS: [Formula; 4] = [
    Formula::Red,
    Formula::Blue,
    Formula::Yellow,
    Formula::Green,
];

impl Formula {
    pub fn color_code(&self) -> &'static str {
        match self {
            Formula::Red => "red",
            Formula::Blue => "blue",
            Formula::Yellow => "yellow",
            Formula::Green => "green",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Formula::Red => "Crimson",
            Formula::Blue => "Azure",
            Formula::Yellow => "Amber",
            Formula::Green => "Sage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Formula::Red => {
                "Bold crimson energizes the space with deep, passionate intensity."
            }
            Formula::Blue => "Cool azure refreshes the mind with crisp, oceanic tranquility.",
            Formula::Yellow => {
                "Warm and inviting amber creates a cozy atmosphere with rich, honeyed notes."
            }
            Formula::Green => {
                "Fresh sage brings clarity and purification with herbal, earthy essence."
            }
        }
    }

    pub fn mood(&self) -> &'static str {
        match self {
            Formula::Red => "Energetic and passionate",
            Formula::Blue => "Calm and peaceful",
            Formula::Yellow => "Warm and welcoming",
            Formula::Green => "Fresh and focused",
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.color_code())
    }
}

impl FromStr for Formula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Formula::Red),
            "blue" => Ok(Formula::Blue),
            "yellow" => Ok(Formula::Yellow),
            "green" => Ok(Formula::Green),
            other => Err(format!("unknown formula color: {other}")),
        }
    }
}

/// The status endpoint reports inactivity either as `null` or as the literal
/// string `"off"`; both map to `None`.
pub fn deserialize_formula_or_off<'de, D>(deserializer: D) -> Result<Option<Formula>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("off") | Some("") => Ok(None),
        Some(color) => Formula::from_str(color)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
