//! Secure random password and passphrase generation.
//!
//! All randomness comes from `rand::rng()`, a CSPRNG seeded from the OS.
//! Indices are drawn with `random_range`, which is uniform (no modulo
//! bias).

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::errors::{LockboxError, Result};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Fixed word list for passphrases.
const WORDS: &[&str] = &[
    "anchor", "apple", "arrow", "autumn", "badge", "bamboo", "banner", "basket", "beacon",
    "birch", "blanket", "bridge", "bronze", "bucket", "cabin", "cactus", "candle", "canyon",
    "carbon", "castle", "cedar", "chalk", "cherry", "cipher", "clover", "cobalt", "comet",
    "copper", "coral", "cotton", "crane", "crystal", "dagger", "delta", "desert", "dragon",
    "eagle", "ember", "engine", "falcon", "fern", "fiddle", "flint", "forest", "fossil",
    "garden", "garnet", "glacier", "granite", "harbor", "hazel", "helmet", "hollow", "horizon",
    "island", "ivory", "jasper", "jungle", "kettle", "lantern", "lemon", "lizard", "magnet",
    "maple", "marble", "meadow", "meteor", "mirror", "mosaic", "nectar", "nickel", "oasis",
    "orbit", "otter", "paddle", "pepper", "pilot", "pine", "planet", "prism", "quartz",
    "quiver", "raven", "ribbon", "river", "rocket", "saddle", "salmon", "shadow", "silver",
    "spruce", "summit", "tender", "thistle", "timber", "tulip", "velvet", "walnut", "willow",
    "zephyr",
];

/// Which character classes a generated password may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl CharClasses {
    /// All four classes enabled.
    pub const ALL: Self = Self {
        lowercase: true,
        uppercase: true,
        digits: true,
        symbols: true,
    };

    fn selected(&self) -> Vec<&'static [u8]> {
        let mut sets = Vec::with_capacity(4);
        if self.lowercase {
            sets.push(LOWERCASE);
        }
        if self.uppercase {
            sets.push(UPPERCASE);
        }
        if self.digits {
            sets.push(DIGITS);
        }
        if self.symbols {
            sets.push(SYMBOLS);
        }
        sets
    }
}

impl Default for CharClasses {
    fn default() -> Self {
        Self::ALL
    }
}

/// Generate a random password of `length` characters.
///
/// Every selected class contributes at least one character when the
/// length allows it.  A shorter password guarantees a random subset of
/// the classes.  The remaining positions are sampled uniformly from the
/// union of the selected classes, then the whole password is shuffled.
pub fn generate_password(length: usize, classes: CharClasses) -> Result<String> {
    let mut sets = classes.selected();
    if sets.is_empty() {
        return Err(LockboxError::Config(
            "at least one character class must be selected".into(),
        ));
    }
    if length == 0 {
        return Err(LockboxError::Config(
            "password length must be at least 1".into(),
        ));
    }

    let pool: Vec<u8> = sets.iter().flat_map(|s| s.iter().copied()).collect();
    let mut rng = rand::rng();
    let mut password = Vec::with_capacity(length);

    sets.shuffle(&mut rng);
    for set in sets.iter().take(length) {
        password.push(set[rng.random_range(0..set.len())]);
    }
    while password.len() < length {
        password.push(pool[rng.random_range(0..pool.len())]);
    }

    // So the guaranteed characters don't sit at the front.
    password.shuffle(&mut rng);

    Ok(password.into_iter().map(char::from).collect())
}

/// Random 128-bit identifier, hex encoded.
pub fn random_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a passphrase of `word_count` words plus a numeric suffix.
///
/// Example: `"maple-orbit-thistle-quartz-47"`.
pub fn generate_passphrase(word_count: usize) -> Result<String> {
    if word_count == 0 {
        return Err(LockboxError::Config(
            "passphrase needs at least one word".into(),
        ));
    }

    let mut rng = rand::rng();
    let mut parts: Vec<String> = (0..word_count)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())].to_string())
        .collect();
    parts.push(rng.random_range(0..100u32).to_string());

    Ok(parts.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        let pw = generate_password(24, CharClasses::ALL).unwrap();
        assert_eq!(pw.chars().count(), 24);
    }

    #[test]
    fn no_class_selected_is_config_error() {
        let none = CharClasses {
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
        };
        assert!(matches!(
            generate_password(16, none),
            Err(LockboxError::Config(_))
        ));
    }

    #[test]
    fn digits_only_contains_only_digits() {
        let digits = CharClasses {
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
        };
        let pw = generate_password(32, digits).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn every_selected_class_is_present() {
        for _ in 0..20 {
            let pw = generate_password(16, CharClasses::ALL).unwrap();
            assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
            assert!(pw.chars().any(|c| !c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn short_passwords_can_draw_any_class() {
        let (mut digit, mut symbol) = (false, false);
        for _ in 0..200 {
            let pw = generate_password(2, CharClasses::ALL).unwrap();
            digit |= pw.chars().any(|c| c.is_ascii_digit());
            symbol |= pw.chars().any(|c| !c.is_ascii_alphanumeric());
        }
        assert!(digit && symbol);
    }

    #[test]
    fn passwords_differ() {
        let a = generate_password(20, CharClasses::ALL).unwrap();
        let b = generate_password(20, CharClasses::ALL).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn passphrase_has_words_and_number() {
        let phrase = generate_passphrase(4).unwrap();
        let parts: Vec<&str> = phrase.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert!(parts[..4].iter().all(|w| WORDS.contains(w)));
        assert!(parts[4].parse::<u32>().is_ok());
    }

    #[test]
    fn random_ids_are_hex_and_unique() {
        let a = random_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, random_id());
    }

    #[test]
    fn zero_words_is_config_error() {
        assert!(generate_passphrase(0).is_err());
    }
}
