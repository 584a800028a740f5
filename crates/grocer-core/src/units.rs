use serde::{Deserialize, Serialize};

/// Measurement unit attached to a shopping-list quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Countable pieces (the default when no unit is written).
    #[default]
    Unit,
    Kg,
    G,
    L,
    Ml,
}

impl Unit {
    /// Expands a short unit token typed after a quantity (`"kg"`, `"u"`, ...).
    ///
    /// Matching is case-insensitive. Returns `None` for anything that is not a
    /// recognized unit so the caller can fold the token back into the name.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "g" => Some(Unit::G),
            "kg" => Some(Unit::Kg),
            "l" => Some(Unit::L),
            "ml" => Some(Unit::Ml),
            "u" => Some(Unit::Unit),
            _ => None,
        }
    }

    /// Canonical identifier, as stored in `list_items.unit`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Unit => "unit",
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit" => Ok(Unit::Unit),
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            other => Err(format!("unknown unit: {other}")),
        }
    }
}
