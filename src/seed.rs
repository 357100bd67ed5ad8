//! Shareable game seeds
//!
//! A seed is 5 bytes of a SHA-256 digest of the wall clock, written as an
//! 8-character base32 token. The token is all a player needs to share to
//! reproduce a board's initial layout.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use data_encoding::BASE32;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Number of digest bytes kept in a seed
pub const SEED_BYTES: usize = 5;

/// A printable game seed (canonical form is upper case)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameSeed(String);

impl GameSeed {
    /// Generate a fresh seed from the current time
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::from_time(nanos)
    }

    /// Derive a seed from a timestamp in nanoseconds
    pub fn from_time(nanos: u128) -> Self {
        let digest = Sha256::digest(nanos.to_string().as_bytes());
        Self(BASE32.encode(&digest[..SEED_BYTES]))
    }

    /// Parse a seed token; case-insensitive, surrounding whitespace ignored
    pub fn parse(text: &str) -> Result<Self> {
        let canonical = text.trim().to_ascii_uppercase();
        let bytes = BASE32
            .decode(canonical.as_bytes())
            .map_err(|_| Error::InvalidSeed(text.to_string()))?;
        if bytes.len() != SEED_BYTES {
            return Err(Error::InvalidSeed(text.to_string()));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded seed bytes
    pub fn bytes(&self) -> [u8; SEED_BYTES] {
        let mut out = [0u8; SEED_BYTES];
        // Construction guarantees a valid 5-byte token
        if let Ok(decoded) = BASE32.decode(self.0.as_bytes()) {
            out.copy_from_slice(&decoded[..SEED_BYTES]);
        }
        out
    }

    /// The RNG state this seed determines
    pub fn rng_state(&self) -> RngState {
        let seed = self
            .bytes()
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        RngState::new(seed)
    }
}

impl fmt::Display for GameSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameSeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GameSeed {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<GameSeed> for String {
    fn from(seed: GameSeed) -> Self {
        seed.0
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Parse `text` if given, otherwise (or if it is malformed) generate a fresh seed
pub fn seed_or_generate(text: Option<&str>) -> GameSeed {
    match text.map(GameSeed::parse) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("{e}; generating a fresh seed");
            GameSeed::generate()
        }
        None => GameSeed::generate(),
    }
}
