use std::fs::File;
use std::io::BufReader;

use serde::{
    Deserialize,
    Serialize
};

use crate::chebfunerror::{
    ChebfunError,
    Result
};

/// Numeric tolerances consulted by the core algorithms.
///
/// The defaults are the process-wide values; algorithms only ever read a
/// `Preferences`, they never modify one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Machine epsilon, also the default `standard_chop` tolerance.
    pub eps: f64,
    /// Adaptive construction starts on a grid of `2^min_pow2 + 1` points.
    pub min_pow2: u32,
    /// ... and gives up after the grid of `2^max_pow2 + 1` points.
    pub max_pow2: u32,
    pub newton_max_iterations: usize,
    /// Series longer than this are subdivided before the colleague
    /// eigenvalue problem is solved.
    pub root_split_length: usize,
}

impl Preferences {
    pub const DEFAULT: Preferences = Preferences {
        eps: f64::EPSILON,
        min_pow2: 4,
        max_pow2: 16,
        newton_max_iterations: 100,
        root_split_length: 50,
    };

    pub fn from_reader(file_path: &str) -> Result<Preferences> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let preferences: Preferences = serde_json::from_reader(reader)?;
        preferences.validate()
    }

    pub fn from_json(json_value: serde_json::Value) -> Result<Preferences> {
        let preferences: Preferences = serde_json::from_value(json_value)?;
        preferences.validate()
    }

    fn validate(self) -> Result<Preferences> {
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(ChebfunError::InvalidPreferences("eps must lie in (0, 1)"));
        }
        if self.min_pow2 > self.max_pow2 {
            return Err(ChebfunError::InvalidPreferences("min_pow2 exceeds max_pow2"));
        }
        // 2^max_pow2 + 1 samples must stay addressable
        if self.max_pow2 >= usize::BITS - 1 {
            return Err(ChebfunError::InvalidPreferences("max_pow2 is too large"));
        }
        Ok(self)
    }

    /// Largest grid adaptive construction will sample on.
    pub fn max_length(&self) -> usize {
        (1usize << self.max_pow2) + 1
    }
}

impl Default for Preferences {
    fn default() -> Preferences {
        Preferences::DEFAULT
    }
}
