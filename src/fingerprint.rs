//! Line fingerprints: a 32-bit content checksum with a compact text form.
//!
//! A fingerprint is captured for every matched line at scan time and carried
//! through the edited output. At patch time it is compared against the live
//! line to detect files modified since the scan. It is a change probe, not a
//! security primitive.
//!
//! The text form is five base-85 digits over the Ascii85 alphabet
//! (`'!'..='u'`), most significant digit first. The all-zero `z` shortcut is
//! never used, so every tag is exactly [`TAG_LEN`] characters and never
//! contains a TAB or newline.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use xxhash_rust::xxh32::xxh32;

/// Width of an encoded fingerprint tag.
pub const TAG_LEN: usize = 5;

const RADIX: u64 = 85;
const FIRST_DIGIT: u8 = b'!';
const LAST_DIGIT: u8 = b'u';

/// Checksum of one line's content, newline excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u32);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("fingerprint must be {TAG_LEN} characters, got {len}")]
    Length { len: usize },

    #[error("invalid fingerprint character {found:?} at position {position}")]
    Character { found: char, position: usize },

    #[error("fingerprint {tag:?} does not fit in 32 bits")]
    Overflow { tag: String },
}

impl Fingerprint {
    /// Fingerprint the given line content.
    ///
    /// The caller strips the trailing `\n`; a `\r` before it is part of the
    /// content.
    pub fn of(content: &[u8]) -> Self {
        Self(xxh32(content, 0))
    }

    /// Wrap a raw checksum value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The raw checksum value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check a line's live content against this fingerprint.
    pub fn matches(self, content: &[u8]) -> bool {
        Self::of(content) == self
    }

    /// Encode into the fixed-width tag.
    pub fn encode(self) -> [u8; TAG_LEN] {
        let mut tag = [FIRST_DIGIT; TAG_LEN];
        let mut rest = u64::from(self.0);
        for slot in tag.iter_mut().rev() {
            *slot = FIRST_DIGIT + (rest % RADIX) as u8;
            rest /= RADIX;
        }
        tag
    }

    /// Decode a tag produced by [`Fingerprint::encode`].
    pub fn decode(tag: &[u8]) -> Result<Self, FingerprintError> {
        if tag.len() != TAG_LEN {
            return Err(FingerprintError::Length { len: tag.len() });
        }

        let mut value: u64 = 0;
        for (position, &byte) in tag.iter().enumerate() {
            if !(FIRST_DIGIT..=LAST_DIGIT).contains(&byte) {
                return Err(FingerprintError::Character {
                    found: char::from(byte),
                    position,
                });
            }
            value = value * RADIX + u64::from(byte - FIRST_DIGIT);
        }

        u32::try_from(value).map(Self).map_err(|_| FingerprintError::Overflow {
            tag: String::from_utf8_lossy(tag).into_owned(),
        })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.encode();
        // Alphabet is ASCII.
        f.write_str(std::str::from_utf8(&tag).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != TAG_LEN {
            return Err(FingerprintError::Length {
                len: s.chars().count(),
            });
        }
        Self::decode(s.as_bytes())
    }
}
