use crate::error::{RelayError, Result};
use num_bigint::BigUint;
use std::fmt;

/// Five-character peer identity, derived from the client's process id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    pub const LEN: usize = rsa::codec::BLOCK_CHARS;

    /// Last five digits of `pid`, or the digits right-padded with `'0'`.
    pub fn from_pid(pid: u32) -> Self {
        let digits = pid.to_string();
        let id = if digits.len() >= Self::LEN {
            digits[digits.len() - Self::LEN..].to_string()
        } else {
            format!("{:0<width$}", digits, width = Self::LEN)
        };
        PeerId(id)
    }

    pub fn for_current_process() -> Self {
        Self::from_pid(std::process::id())
    }

    /// Accepts exactly five ASCII digits or lowercase letters.
    pub fn parse(s: &str) -> Result<Self> {
        let valid = s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase());
        if !valid {
            return Err(RelayError::InvalidIdentity(s.to_string()));
        }
        Ok(PeerId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity as a single codec block.
    pub fn block(&self) -> BigUint {
        rsa::encode(&self.0).into_iter().next().unwrap_or_default()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pid() {
        assert_eq!(PeerId::from_pid(1_234_567).as_str(), "34567");
        assert_eq!(PeerId::from_pid(12_345).as_str(), "12345");
        assert_eq!(PeerId::from_pid(42).as_str(), "42000");
        assert_eq!(PeerId::from_pid(0).as_str(), "00000");
    }

    #[test]
    fn test_parse() {
        assert!(PeerId::parse("a1b2c").is_ok());
        assert!(PeerId::parse("1234").is_err());
        assert!(PeerId::parse("12 45").is_err());
        assert!(PeerId::parse("ABCDE").is_err());
    }

    #[test]
    fn test_block_decodes_back() {
        let id = PeerId::from_pid(98_765);
        assert_eq!(rsa::decode(&[id.block()]).unwrap(), "98765");
    }
}
