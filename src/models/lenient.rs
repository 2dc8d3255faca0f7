//! Field decoders for reference and timetable JSON, where numbers and codes
//! arrive either as JSON numbers or as strings.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
    Null,
}

impl Scalar {
    fn into_code(self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            // Integral values print without a fraction
            Self::Number(n) => Some(format!("{n}")),
            Self::Null => None,
        }
    }

    fn into_float<E: Error>(self) -> Result<Option<f64>, E> {
        match self {
            Self::Number(n) => Ok(Some(n)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| E::custom(format!("invalid number {s:?}: {e}"))),
            Self::Null => Ok(None),
        }
    }
}

/// Required number, given as a number or numeric string
pub mod float {
    use super::{Deserialize, Deserializer, Error, Scalar};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Scalar::deserialize(deserializer)?
            .into_float()?
            .ok_or_else(|| D::Error::custom("missing number"))
    }
}

/// Optional number; empty strings and nulls decode to `None`
pub mod optional_float {
    use super::{Deserialize, Deserializer, Scalar};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Scalar::deserialize(deserializer)?.into_float()
    }
}

/// Required non-empty code, given as a string or number
pub mod code {
    use super::{Deserialize, Deserializer, Error, Scalar};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Scalar::deserialize(deserializer)?
            .into_code()
            .ok_or_else(|| D::Error::custom("missing code"))
    }
}

/// Optional code; empty strings and nulls decode to `None`
pub mod optional_code {
    use super::{Deserialize, Deserializer, Scalar};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Scalar::deserialize(deserializer)?.into_code())
    }
}

/// Required non-negative integer, given as a number or numeric string
pub mod index {
    use super::{Deserialize, Deserializer, Error, Scalar};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Scalar::deserialize(deserializer)?
            .into_float()?
            .ok_or_else(|| D::Error::custom("missing index"))?;
        if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
            return Err(D::Error::custom(format!("invalid index {value}")));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value as u32)
    }
}
