use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Ticker-like identifier of an instrument or benchmark index (e.g. `AAPL`, `^GSPC`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for InstrumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Deterministic dataset hash (BLAKE3 over the loaded price data)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn instrument_id_serializes_as_plain_string() {
        let id = InstrumentId::new("AAPL");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AAPL\"");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut m = BTreeMap::new();
        m.insert(InstrumentId::from("MSFT"), 1.2);
        assert_eq!(m.get("MSFT"), Some(&1.2));
    }
}
