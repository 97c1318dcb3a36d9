//! Field-level parsing of rule and trace lines.
//!
//! Positions passed to these functions are 1-based field indices within
//! the line; they only feed error messages.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

use crate::{Error, Result};

/// Marker character that prefixes the first field of a ClassBench rule.
pub const RULE_MARKER: char = '@';

/// Split a line into its whitespace-separated fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parse an `address/prefixLength` token.
///
/// The returned network keeps the host bits of the address as written.
pub fn parse_subnet(token: &str, position: usize) -> Result<Ipv4Net> {
    let (addr, len) = token
        .split_once('/')
        .ok_or_else(|| Error::malformed(token, position, "address/prefix-length subnet"))?;
    let addr = parse_address(addr, position)?;
    let len = parse_prefix_len(len, position)?;
    Ipv4Net::new(addr, len).map_err(|_| Error::malformed(token, position, "prefix length in [0,32]"))
}

/// Parse a dotted-quad IPv4 address.
pub fn parse_address(text: &str, position: usize) -> Result<Ipv4Addr> {
    text.parse::<Ipv4Addr>()
        .map_err(|_| Error::malformed(text, position, "dotted-quad IPv4 address"))
}

/// Parse a prefix length in `[0, 32]`.
pub fn parse_prefix_len(text: &str, position: usize) -> Result<u8> {
    match text.parse::<u8>() {
        Ok(len) if len <= 32 => Ok(len),
        _ => Err(Error::malformed(text, position, "prefix length in [0,32]")),
    }
}

/// Parse a decimal port number in `[0, 65535]`.
pub fn parse_port(text: &str, position: usize) -> Result<u16> {
    text.parse::<u16>()
        .map_err(|_| Error::malformed(text, position, "port number in [0,65535]"))
}

/// Locate the textual bounds of a `min : max` port range at `fields[start]`.
///
/// Only the layout is checked here; the bounds are parsed by the classifier.
pub fn port_range_bounds<'a>(fields: &[&'a str], start: usize) -> Result<(&'a str, &'a str)> {
    let needed = start + 3;
    if fields.len() < needed {
        return Err(Error::FieldCountMismatch {
            expected: needed,
            actual: fields.len(),
            shape: "'min : max' port range",
        });
    }
    if fields[start + 1] != ":" {
        return Err(Error::malformed(fields[start + 1], start + 2, "':' between port bounds"));
    }
    Ok((fields[start], fields[start + 2]))
}

/// Parse a `hexvalue/hexmask` protocol token into `(value, mask)`.
pub fn parse_protocol(token: &str, position: usize) -> Result<(u8, u8)> {
    let (value, mask) = token
        .split_once('/')
        .ok_or_else(|| Error::malformed(token, position, "hexvalue/hexmask protocol"))?;
    let value = parse_hex_u8(value).ok_or_else(|| Error::malformed(token, position, "hex protocol value"))?;
    let mask = parse_hex_u8(mask).ok_or_else(|| Error::malformed(token, position, "hex protocol mask"))?;
    Ok((value, mask))
}

/// Parse an unsigned decimal number.
pub fn parse_number(text: &str, position: usize) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|_| Error::malformed(text, position, "unsigned decimal number"))
}

fn parse_hex_u8(text: &str) -> Option<u8> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_mixed_whitespace() {
        assert_eq!(
            split_fields("  @1.2.3.4/8\t5.6.7.8/0   0 : 65535 "),
            vec!["@1.2.3.4/8", "5.6.7.8/0", "0", ":", "65535"]
        );
        assert!(split_fields("   ").is_empty());
    }

    #[test]
    fn test_parse_subnet_keeps_host_bits() {
        let net = parse_subnet("10.1.2.3/8", 1).unwrap();
        assert_eq!(net.addr(), Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(net.prefix_len(), 8);
    }

    #[test]
    fn test_parse_subnet_missing_octet_names_address() {
        let err = parse_subnet("10.0.0/24", 2).unwrap_err();
        match err {
            Error::MalformedField {
                token,
                position,
                expected,
            } => {
                assert_eq!(token, "10.0.0");
                assert_eq!(position, 2);
                assert!(expected.contains("IPv4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_subnet_rejects_bad_prefix() {
        assert!(parse_subnet("10.0.0.0/33", 1).is_err());
        assert!(parse_subnet("10.0.0.0/x", 1).is_err());
        assert!(parse_subnet("10.0.0.0", 1).is_err());
    }

    #[test]
    fn test_port_range_bounds() {
        let fields = ["1024", ":", "2048"];
        assert_eq!(port_range_bounds(&fields, 0).unwrap(), ("1024", "2048"));

        let fields = ["80", "-", "80"];
        assert!(port_range_bounds(&fields, 0).is_err());

        let fields = ["90", ":"];
        assert!(matches!(
            port_range_bounds(&fields, 0),
            Err(Error::FieldCountMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_port_out_of_range() {
        assert!(parse_port("65536", 3).is_err());
        assert!(parse_port("-1", 3).is_err());
        assert_eq!(parse_port("65535", 3).unwrap(), 65535);
    }

    #[test]
    fn test_parse_protocol() {
        assert_eq!(parse_protocol("0x06/0xFF", 9).unwrap(), (6, 0xFF));
        assert_eq!(parse_protocol("6/0xFF", 9).unwrap(), (6, 0xFF));
        assert_eq!(parse_protocol("0x00/0x00", 9).unwrap(), (0, 0));
        assert!(parse_protocol("0x06", 9).is_err());
        assert!(parse_protocol("0x100/0xFF", 9).is_err());
        assert!(parse_protocol("0x/0xFF", 9).is_err());
    }
}
