use serde::Serialize;
use std::fmt;

use crate::engine::FeedError;

/// Symbols the feed simulates, fixed for the lifetime of the process
pub static SUPPORTED_INSTRUMENTS: [&str; 5] = ["GOOG", "TSLA", "AMZN", "META", "NVDA"];

/// A tradable symbol from the static catalog
///
/// Can only be built through [`Instrument::parse`] (or by iterating the
/// catalog), so any `Instrument` in a subscription set is a catalog member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Instrument(&'static str);

impl Instrument {
    /// Resolve a client-supplied symbol against the catalog
    pub fn parse(symbol: &str) -> Result<Self, FeedError> {
        SUPPORTED_INSTRUMENTS
            .iter()
            .find(|s| **s == symbol)
            .map(|s| Instrument(*s))
            .ok_or_else(|| FeedError::InvalidInstrument(symbol.to_string()))
    }

    /// Every instrument in catalog order
    pub fn all() -> impl Iterator<Item = Instrument> {
        SUPPORTED_INSTRUMENTS.iter().map(|s| Instrument(*s))
    }

    pub fn symbol(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The catalog as sent to clients on login
pub fn supported_symbols() -> Vec<String> {
    SUPPORTED_INSTRUMENTS.iter().map(|s| s.to_string()).collect()
}
