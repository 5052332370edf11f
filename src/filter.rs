/// Address-prefix deny-list for frame sources.
///
/// Classifies a source address as excluded (access points, embedded radios)
/// or included. The list is fixed at construction; `is_excluded` is pure and
/// needs no lock.
use crate::defaults::{DEFAULT_PREFIX_LEN, EXCLUDED_PREFIXES};
use crate::error::ConfigError;
use crate::station::MacAddr;

/// One deny-list entry: the leading `prefix_len` bytes are significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenyPrefix {
    bytes: [u8; 6],
    vendor: &'static str,
}

impl DenyPrefix {
    pub fn vendor(&self) -> &'static str {
        self.vendor
    }
}

#[derive(Debug, Clone)]
pub struct IdentityFilter {
    prefix_len: usize,
    prefixes: Vec<DenyPrefix>,
}

impl IdentityFilter {
    /// Build a filter comparing the first `prefix_len` bytes (1..=6) of each
    /// address against `prefixes`. Prefix bytes beyond `prefix_len` are ignored.
    pub fn new<'a, I>(prefix_len: usize, prefixes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a [u8], &'static str)>,
    {
        if !(1..=6).contains(&prefix_len) {
            return Err(ConfigError::PrefixLength(prefix_len));
        }

        let mut list = Vec::new();
        for (raw, vendor) in prefixes {
            if raw.len() < prefix_len {
                return Err(ConfigError::ShortPrefix {
                    len: raw.len(),
                    required: prefix_len,
                });
            }
            let mut bytes = [0u8; 6];
            bytes[..prefix_len].copy_from_slice(&raw[..prefix_len]);
            list.push(DenyPrefix { bytes, vendor });
        }

        Ok(Self {
            prefix_len,
            prefixes: list,
        })
    }

    /// OUI filter over the compiled-in [`EXCLUDED_PREFIXES`] table.
    pub fn with_defaults() -> Self {
        Self::from_ouis(EXCLUDED_PREFIXES)
    }

    /// OUI (3-byte) filter over a static table.
    pub fn from_ouis(table: &'static [([u8; 3], &'static str)]) -> Self {
        let prefixes = table
            .iter()
            .map(|(oui, vendor)| {
                let mut bytes = [0u8; 6];
                bytes[..3].copy_from_slice(oui);
                DenyPrefix { bytes, vendor }
            })
            .collect();
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            prefixes,
        }
    }

    /// Filter that excludes nothing.
    pub fn allow_all() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
            prefixes: Vec::new(),
        }
    }

    pub fn is_excluded(&self, identity: &MacAddr) -> bool {
        self.matching(identity).is_some()
    }

    /// The deny-list entry matching `identity`, if any.
    pub fn matching(&self, identity: &MacAddr) -> Option<&DenyPrefix> {
        let head = &identity.octets()[..self.prefix_len];
        self.prefixes
            .iter()
            .find(|p| &p.bytes[..self.prefix_len] == head)
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl Default for IdentityFilter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
