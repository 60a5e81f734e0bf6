//! Tracked instruments

/// A named tradeable asset mapped to its market symbol
/// (e.g. "SP500" -> "^GSPC"). Static configuration, immutable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}
