// Length values: a number with an optional unit suffix, normalized to pixels
// at the CSS reference resolution of 96 DPI.

use regex::Regex;
use std::sync::OnceLock;

/// Number grammar shared by lengths, path data and point lists.
pub(crate) const NUMBER_PATTERN: &str = r"[-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?";

const DPI: f64 = 96.0;
const MM_PER_INCH: f64 = 25.4;
const MM_PER_CM: f64 = 10.0;
const PT_PER_INCH: f64 = 72.0;
const PT_PER_PC: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LengthError {
    #[error("unknown unit {unit:?} in length {value:?}")]
    UnknownUnit { value: String, unit: String },

    #[error("unparsable length: {0:?}")]
    InvalidLength(String),
}

pub type LengthResult<T> = Result<T, LengthError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Px,
    In,
    Mm,
    Cm,
    Pt,
    Pc,
}

impl Unit {
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        match suffix {
            "" | "px" => Some(Unit::Px),
            "in" => Some(Unit::In),
            "mm" => Some(Unit::Mm),
            "cm" => Some(Unit::Cm),
            "pt" => Some(Unit::Pt),
            "pc" => Some(Unit::Pc),
            _ => None,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::In => "in",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
        }
    }

    pub fn pixels_per_unit(self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::In => DPI,
            Unit::Mm => DPI / MM_PER_INCH,
            Unit::Cm => MM_PER_CM * DPI / MM_PER_INCH,
            Unit::Pt => DPI / PT_PER_INCH,
            Unit::Pc => PT_PER_PC * DPI / PT_PER_INCH,
        }
    }
}

fn length_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^({NUMBER_PATTERN})(.*)$")).expect("valid length regex")
    })
}

/// Parse a length such as `"10"`, `"2.5mm"` or `"1in"` into pixels.
pub fn parse_length(text: &str) -> LengthResult<f64> {
    let trimmed = text.trim();
    let caps = length_regex()
        .captures(trimmed)
        .ok_or_else(|| LengthError::InvalidLength(text.to_string()))?;

    let number = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(2).map_or("", |m| m.as_str());

    let value = number
        .parse::<f64>()
        .map_err(|_| LengthError::InvalidLength(text.to_string()))?;
    let unit = Unit::from_suffix(suffix).ok_or_else(|| LengthError::UnknownUnit {
        value: text.to_string(),
        unit: suffix.to_string(),
    })?;

    let pixels = value * unit.pixels_per_unit();
    if !pixels.is_finite() {
        return Err(LengthError::InvalidLength(text.to_string()));
    }
    Ok(pixels)
}
