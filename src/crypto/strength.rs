//! Password strength scoring.
//!
//! The score is shared by registration, the generator and rotation, so
//! the weights and label thresholds below are fixed:
//!
//! | component | points |
//! |---|---|
//! | length | 2 per character, capped at 40 |
//! | lowercase present | 10 |
//! | uppercase present | 15 |
//! | digit present | 15 |
//! | symbol present | 20 |

use serde::{Deserialize, Serialize};

const MAX_LENGTH_POINTS: u32 = 40;

/// Coarse label for a strength score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLabel {
    /// `<40` weak, `<70` medium, anything else strong.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => Self::Weak,
            40..=69 => Self::Medium,
            _ => Self::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

/// Score a password in `0..=100`.
pub fn strength(password: &str) -> u8 {
    let length = u32::try_from(password.chars().count()).unwrap_or(u32::MAX);
    let mut score = length.saturating_mul(2).min(MAX_LENGTH_POINTS);

    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 20;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Score and label in one call.
pub fn strength_label(password: &str) -> StrengthLabel {
    StrengthLabel::from_score(strength(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_scores_zero() {
        assert_eq!(strength(""), 0);
    }

    #[test]
    fn length_points_are_capped() {
        assert_eq!(strength(&"a".repeat(20)), 50);
        assert_eq!(strength(&"a".repeat(200)), 50);
    }

    #[test]
    fn class_weights() {
        assert_eq!(strength("a"), 2 + 10);
        assert_eq!(strength("A"), 2 + 15);
        assert_eq!(strength("1"), 2 + 15);
        assert_eq!(strength("!"), 2 + 20);
    }

    #[test]
    fn full_marks() {
        assert_eq!(strength("Abcdefghijklmnopq1!x"), 100);
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(StrengthLabel::from_score(0), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(39), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(40), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(69), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(70), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(100), StrengthLabel::Strong);
    }

    #[test]
    fn non_decreasing_in_length() {
        let mut previous = 0;
        for n in 0..40 {
            let s = strength(&"aB3$".chars().cycle().take(n).collect::<String>());
            assert!(s >= previous, "score dropped at length {n}");
            previous = s;
        }
    }

    #[test]
    fn adding_a_class_strictly_increases() {
        assert!(strength("abcdefgh") < strength("abcdefgH"));
        assert!(strength("abcdefgH") < strength("abcdefH1"));
        assert!(strength("abcdefH1") < strength("abcdeH1!"));
    }
}
