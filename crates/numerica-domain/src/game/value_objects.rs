use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    Idle,
    Started,
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Idle => "IDLE",
            GameStatus::Started => "STARTED",
            GameStatus::GameOver => "GAME_OVER",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message that parsed as a finite, strictly positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedNumber(u64);

impl SubmittedNumber {
    /// Parse free chat text the way a browser coerces a string to a number,
    /// then keep only finite positive integers.
    ///
    /// Accepts decimal and exponent notation (`"3"`, `"3.0"`, `"+3"`, `"3e0"`)
    /// and `0x`/`0o`/`0b` integer literals. Values past `u64::MAX` saturate.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(value) = parse_prefixed_integer(text) {
            return value.map(Self);
        }

        let value: f64 = text.parse().ok()?;
        if !value.is_finite() || value.fract() != 0.0 || value <= 0.0 {
            return None;
        }

        // Float to int casts saturate.
        Some(Self(value as u64))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// `Some(..)` when `text` carries a radix prefix; the inner option is the
/// parse outcome for that literal.
fn parse_prefixed_integer(text: &str) -> Option<Option<u64>> {
    let lower = text.get(..2)?.to_ascii_lowercase();
    let radix = match lower.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };

    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(None);
    }

    let value = digits
        .trim_start_matches('0')
        .chars()
        .try_fold(0u64, |acc, c| {
            let digit = c.to_digit(radix)? as u64;
            acc.checked_mul(radix as u64)?.checked_add(digit)
        })
        .unwrap_or(u64::MAX);

    Some((value > 0).then_some(value))
}
