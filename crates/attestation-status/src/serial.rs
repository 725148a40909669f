//! Certificate serial numbers as lookup keys
//!
//! Serial numbers are arbitrary-precision non-negative integers. They are kept
//! as big-endian magnitude bytes and rendered as the lowercase hexadecimal key
//! used by the status list.

use super::error::StatusError;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use x509_parser::prelude::*;

/// Certificate serial number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber {
    /// Big-endian magnitude without leading zero bytes (empty for zero)
    magnitude: Vec<u8>,
}

impl SerialNumber {
    /// Build a serial number from big-endian magnitude bytes
    ///
    /// Leading zero bytes are ignored, so a DER INTEGER's sign-padding byte
    /// does not change the key.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self {
            magnitude: bytes[start..].to_vec(),
        }
    }

    /// Build a serial number from the content octets of a DER INTEGER
    ///
    /// The content is two's complement, so a set high bit on the first octet
    /// is a negative value. Negative and empty integers have no status-list
    /// key and are rejected with [`StatusError::CertificateError`].
    pub fn from_der_integer(content: &[u8]) -> Result<Self, StatusError> {
        match content.first() {
            None => Err(StatusError::CertificateError("empty serial number".to_string())),
            Some(&first) if first & 0x80 != 0 => Err(StatusError::CertificateError(format!(
                "negative serial number: {}",
                hex_octets(content)
            ))),
            Some(_) => Ok(Self::from_be_bytes(content)),
        }
    }

    /// Read the serial number of a DER-encoded X.509 certificate
    ///
    /// Fails on unparseable certificates and on negative serials.
    pub fn from_certificate_der(cert_der: &[u8]) -> Result<Self, StatusError> {
        let (_, cert) = parse_x509_certificate(cert_der).map_err(|e| {
            StatusError::CertificateError(format!("failed to parse certificate: {}", e))
        })?;

        Self::from_der_integer(cert.raw_serial())
    }

    /// Big-endian magnitude bytes (empty for zero)
    pub fn as_bytes(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Normalized status-list key: lowercase hex, no prefix, no padding
    pub fn to_hex_key(&self) -> String {
        let Some((first, rest)) = self.magnitude.split_first() else {
            return "0".to_string();
        };

        let mut key = String::with_capacity(self.magnitude.len() * 2);
        // Infallible for String
        let _ = write!(key, "{:x}", first);
        for byte in rest {
            let _ = write!(key, "{:02x}", byte);
        }
        key
    }
}

fn hex_octets(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self::from_be_bytes(&value.to_be_bytes())
    }
}

impl From<u128> for SerialNumber {
    fn from(value: u128) -> Self {
        Self::from_be_bytes(&value.to_be_bytes())
    }
}

impl FromStr for SerialNumber {
    type Err = StatusError;

    /// Parse hexadecimal text, with or without a `0x` prefix, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(StatusError::InvalidSerial(s.to_string()));
        }

        let mut nibbles = Vec::with_capacity(digits.len() + 1);
        if digits.len() % 2 == 1 {
            nibbles.push(0);
        }
        for c in digits.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| StatusError::InvalidSerial(s.to_string()))?;
            nibbles.push(nibble as u8);
        }

        let bytes: Vec<u8> = nibbles
            .chunks_exact(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect();

        Ok(Self::from_be_bytes(&bytes))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_key_small_values() {
        assert_eq!(SerialNumber::from(255u64).to_hex_key(), "ff");
        assert_eq!(SerialNumber::from(0u64).to_hex_key(), "0");
        assert_eq!(SerialNumber::from(1u64).to_hex_key(), "1");
        assert_eq!(SerialNumber::from(0x1a2bu64).to_hex_key(), "1a2b");
        assert_eq!(SerialNumber::from(0x100u64).to_hex_key(), "100");
    }

    #[test]
    fn test_zero_has_no_magnitude() {
        let zero = SerialNumber::from(0u64);
        assert!(zero.is_zero());
        assert!(zero.as_bytes().is_empty());
        assert_eq!(SerialNumber::from_be_bytes(&[0, 0, 0]), zero);
    }

    #[test]
    fn test_leading_zero_bytes_ignored() {
        let padded = SerialNumber::from_be_bytes(&[0x00, 0x00, 0x8f, 0x01]);
        assert_eq!(padded.to_hex_key(), "8f01");
        assert_eq!(padded, SerialNumber::from_be_bytes(&[0x8f, 0x01]));
    }

    #[test]
    fn test_large_serial() {
        let serial = SerialNumber::from(u128::MAX);
        assert_eq!(serial.to_hex_key(), "ffffffffffffffffffffffffffffffff");

        let bytes = [0x0a; 20];
        let serial = SerialNumber::from_be_bytes(&bytes);
        assert_eq!(serial.to_hex_key(), format!("a{}", "0a".repeat(19)));
    }

    #[test]
    fn test_parse_hex_text() {
        let serial: SerialNumber = "0x1A2B".parse().unwrap();
        assert_eq!(serial.to_hex_key(), "1a2b");

        let serial: SerialNumber = "00ff".parse().unwrap();
        assert_eq!(serial.to_hex_key(), "ff");

        let serial: SerialNumber = "abc".parse().unwrap();
        assert_eq!(serial.as_bytes(), &[0x0a, 0xbc]);

        let serial: SerialNumber = "0".parse().unwrap();
        assert!(serial.is_zero());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            "xyz".parse::<SerialNumber>(),
            Err(StatusError::InvalidSerial(_))
        ));
        assert!("".parse::<SerialNumber>().is_err());
        assert!("0x".parse::<SerialNumber>().is_err());
        assert!("-ff".parse::<SerialNumber>().is_err());
    }

    #[test]
    fn test_display_matches_key() {
        let serial = SerialNumber::from(0xdead_beefu64);
        assert_eq!(serial.to_string(), "deadbeef");
    }

    #[test]
    fn test_der_integer_positive() {
        let serial = SerialNumber::from_der_integer(&[0x00, 0xff]).unwrap();
        assert_eq!(serial.to_hex_key(), "ff");

        let serial = SerialNumber::from_der_integer(&[0x7f, 0x01]).unwrap();
        assert_eq!(serial.to_hex_key(), "7f01");

        let serial = SerialNumber::from_der_integer(&[0x00]).unwrap();
        assert!(serial.is_zero());
    }

    #[test]
    fn test_der_integer_negative_is_rejected() {
        // 0xff is -1 in two's complement, not 255
        assert!(matches!(
            SerialNumber::from_der_integer(&[0xff]),
            Err(StatusError::CertificateError(ref msg)) if msg.contains("negative")
        ));
        assert!(matches!(
            SerialNumber::from_der_integer(&[0x80, 0x00, 0x01]),
            Err(StatusError::CertificateError(_))
        ));
    }

    #[test]
    fn test_der_integer_empty_is_rejected() {
        assert!(matches!(
            SerialNumber::from_der_integer(&[]),
            Err(StatusError::CertificateError(_))
        ));
    }

    #[test]
    fn test_certificate_parse_error() {
        let result = SerialNumber::from_certificate_der(&[0x30, 0x03, 0x02, 0x01]);
        assert!(matches!(result, Err(StatusError::CertificateError(_))));
    }
}
