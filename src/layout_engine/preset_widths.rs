//! Parser for the preset width list, e.g. `"50%, 100%"` or `"800px, 0.33"`.
//!
//! Tokens are comma separated. `<n>px` is an absolute width, `<n>%` a
//! percentage and a bare number a fraction of the available width.
//! Relative widths account for the gap that follows the column, so two
//! `50%` columns plus one gap fill the area exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9.]+)\s*(px|%)?\s*$").expect("preset width token regex is valid")
});

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PresetWidthsError {
    #[error("empty preset width at position {0}")]
    EmptyToken(usize),
    #[error("malformed preset width {0:?}")]
    Malformed(String),
    #[error("preset width {0:?} must be greater than zero")]
    NotPositive(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PresetWidth {
    Pixels(f64),
    Ratio(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetWidths {
    widths: Vec<PresetWidth>,
    spacing: i32,
}

impl PresetWidths {
    /// Parses the whole list; a single bad token rejects all of it.
    pub fn parse(spec: &str, spacing: i32) -> Result<Self, PresetWidthsError> {
        let widths = spec
            .split(',')
            .enumerate()
            .map(|(index, token)| parse_token(index, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { widths, spacing })
    }

    /// Resolves the presets for a column that may be between `min` and `max`
    /// pixels wide. The result is sorted widest first without duplicates.
    pub fn get(&self, min: i32, max: i32) -> Vec<i32> {
        let mut widths: Vec<i32> = self
            .widths
            .iter()
            .map(|width| {
                let px = match *width {
                    PresetWidth::Pixels(px) => px.round(),
                    PresetWidth::Ratio(ratio) => {
                        ((max + self.spacing) as f64 * ratio - self.spacing as f64).floor()
                    }
                };
                (px as i32).clamp(min, max.max(min))
            })
            .collect();
        widths.sort_unstable_by(|a, b| b.cmp(a));
        widths.dedup();
        widths
    }

    /// Smallest preset wider than `current`, wrapping around to the smallest.
    pub fn next(&self, current: i32, min: i32, max: i32) -> Option<i32> {
        let widths = self.get(min, max);
        widths.iter().rev().copied().find(|&w| w > current).or_else(|| widths.last().copied())
    }

    /// Widest preset narrower than `current`, wrapping around to the widest.
    pub fn prev(&self, current: i32, min: i32, max: i32) -> Option<i32> {
        let widths = self.get(min, max);
        widths.iter().copied().find(|&w| w < current).or_else(|| widths.first().copied())
    }
}

fn parse_token(index: usize, token: &str) -> Result<PresetWidth, PresetWidthsError> {
    if token.trim().is_empty() {
        return Err(PresetWidthsError::EmptyToken(index));
    }
    let malformed = || PresetWidthsError::Malformed(token.trim().to_string());
    let captures = TOKEN.captures(token).ok_or_else(malformed)?;
    let value: f64 = captures[1].parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    if value <= 0.0 {
        return Err(PresetWidthsError::NotPositive(token.trim().to_string()));
    }
    Ok(match captures.get(2).map(|m| m.as_str()) {
        Some("px") => PresetWidth::Pixels(value),
        Some(_) => PresetWidth::Ratio(value / 100.0),
        None => PresetWidth::Ratio(value),
    })
}
