//! Matching atoms and the classifier that produces them.

use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;

use crate::parser::{parse_address, parse_port, parse_prefix_len, parse_protocol};
use crate::{Error, Result};

/// The smallest matchable unit of one rule dimension.
///
/// Construct prefixes and ranges through [`RuleAtom::prefix`] and
/// [`RuleAtom::range`], which fold degenerate forms into `Exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAtom {
    /// Matches iff the field equals the value
    Exact(u32),
    /// Matches iff the top `mask_bits` bits equal those of `value`
    Prefix { value: u32, mask_bits: u8 },
    /// Matches iff `low <= field <= high`
    Range { low: u32, high: u32 },
}

impl RuleAtom {
    /// A prefix atom; a full 32-bit mask becomes `Exact`.
    pub fn prefix(value: u32, mask_bits: u8) -> Self {
        if mask_bits >= 32 {
            RuleAtom::Exact(value)
        } else {
            RuleAtom::Prefix { value, mask_bits }
        }
    }

    /// A range atom; a single-value range becomes `Exact`.
    ///
    /// Callers must pass `low <= high`.
    pub fn range(low: u32, high: u32) -> Self {
        if low == high {
            RuleAtom::Exact(low)
        } else {
            RuleAtom::Range { low, high }
        }
    }

    /// Check whether a field value is matched by this atom.
    pub fn matches(&self, field: u32) -> bool {
        match *self {
            RuleAtom::Exact(value) => field == value,
            RuleAtom::Prefix { value, mask_bits } => {
                let mask = prefix_mask(mask_bits);
                field & mask == value & mask
            }
            RuleAtom::Range { low, high } => low <= field && field <= high,
        }
    }

    /// Get the variant name.
    pub fn kind_str(&self) -> &'static str {
        match self {
            RuleAtom::Exact(_) => "exact",
            RuleAtom::Prefix { .. } => "prefix",
            RuleAtom::Range { .. } => "range",
        }
    }

    /// Render this atom in descriptor syntax for a field of the given kind.
    pub fn render(&self, kind: FieldKind) -> Rendered {
        Rendered { atom: *self, kind }
    }
}

fn prefix_mask(bits: u8) -> u32 {
    match bits {
        0 => 0,
        b if b >= 32 => u32::MAX,
        b => u32::MAX << (32 - b),
    }
}

/// Semantic kind of a rule dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// IPv4 address, rendered through `ipv4Toi`
    Address,
    /// Transport port
    Port,
    /// IP protocol number
    Protocol,
}

impl FieldKind {
    /// Bit width of this dimension in the structure descriptor.
    pub fn bits(&self) -> u8 {
        match self {
            FieldKind::Address => 32,
            FieldKind::Port => 16,
            FieldKind::Protocol => 8,
        }
    }
}

/// Display adapter returned by [`RuleAtom::render`].
#[derive(Debug, Clone, Copy)]
pub struct Rendered {
    atom: RuleAtom,
    kind: FieldKind,
}

impl Rendered {
    fn value(&self, f: &mut fmt::Formatter<'_>, value: u32) -> fmt::Result {
        match self.kind {
            FieldKind::Address => write!(f, "ipv4Toi(\"{}\")", Ipv4Addr::from(value)),
            FieldKind::Port | FieldKind::Protocol => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.atom {
            RuleAtom::Exact(value) => {
                f.write_str("ruleAtomExact(")?;
                self.value(f, value)?;
                f.write_str(")")
            }
            RuleAtom::Prefix { value, mask_bits } => {
                f.write_str("ruleAtomPrefix(")?;
                self.value(f, value)?;
                write!(f, ", maskToi({}))", mask_bits)
            }
            RuleAtom::Range { low, high } => write!(f, "ruleAtomRange({}, {})", low, high),
        }
    }
}

/// Classify an address field given its textual address and prefix length.
pub fn classify_address(address: &str, prefix_len: &str, position: usize) -> Result<RuleAtom> {
    let addr = parse_address(address, position)?;
    let len = parse_prefix_len(prefix_len, position)?;
    Ok(RuleAtom::prefix(u32::from(addr), len))
}

/// Classify an already parsed subnet.
pub fn classify_subnet(net: &Ipv4Net) -> RuleAtom {
    RuleAtom::prefix(u32::from(net.addr()), net.prefix_len())
}

/// Classify a port field given its textual bounds.
pub fn classify_port(min: &str, max: &str, position: usize) -> Result<RuleAtom> {
    let low = parse_port(min, position)?;
    let high = parse_port(max, position)?;
    if low > high {
        return Err(Error::malformed(max, position, "upper port bound >= lower bound"));
    }
    Ok(RuleAtom::range(low.into(), high.into()))
}

/// Classify a `hexvalue/hexmask` protocol token.
///
/// Only the value is kept; the mask is validated and dropped.
pub fn classify_protocol(token: &str, position: usize) -> Result<RuleAtom> {
    let (value, _mask) = parse_protocol(token, position)?;
    Ok(RuleAtom::Exact(value.into()))
}
