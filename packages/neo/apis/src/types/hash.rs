//! Fixed-size hashes as used by the source chain.
//!
//! Hashes are stored in the chain's internal (little-endian) byte order and
//! rendered the way the RPC API renders them: `0x` followed by the bytes in
//! reverse (big-endian) order.

use std::{fmt, str::FromStr};

/// The version byte prefixed to a script hash when deriving an address.
pub const ADDRESS_VERSION: u8 = 0x35;

/// Errors produced when parsing hashes and addresses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum HashParseError {
    /// The string is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded value has the wrong length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The expected number of bytes.
        expected: usize,
        /// The number of bytes decoded.
        actual: usize,
    },

    /// The address is not valid base58check.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The address carries an unexpected version byte.
    #[error("unexpected address version {0:#04x}")]
    AddressVersion(u8),
}

macro_rules! neo_uint {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            /// The number of bytes in the hash.
            pub const LEN: usize = $len;

            /// The all-zero hash.
            pub const ZERO: Self = Self([0; $len]);

            /// Builds the hash from its internal little-endian bytes.
            #[must_use]
            pub const fn from_le_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Builds the hash from big-endian (display order) bytes.
            #[must_use]
            pub fn from_be_bytes(mut bytes: [u8; $len]) -> Self {
                bytes.reverse();
                Self(bytes)
            }

            /// Returns the internal little-endian bytes.
            #[must_use]
            pub const fn to_le_bytes(self) -> [u8; $len] {
                self.0
            }

            /// Returns the bytes in big-endian (display) order.
            #[must_use]
            pub fn to_be_bytes(self) -> [u8; $len] {
                let mut bytes = self.0;
                bytes.reverse();
                bytes
            }

            /// Borrows the internal little-endian bytes.
            #[must_use]
            pub const fn as_le_slice(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = HashParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)?;
                let bytes: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|b: Vec<u8>| HashParseError::InvalidLength {
                            expected: $len,
                            actual: b.len(),
                        })?;
                Ok(Self::from_be_bytes(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.to_be_bytes()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

neo_uint!(
    /// A 160-bit script hash identifying a contract or account.
    Uint160,
    20
);

neo_uint!(
    /// A 256-bit hash identifying a block, transaction or state root.
    Uint256,
    32
);

impl Uint160 {
    /// Decodes a base58check address into its script hash.
    ///
    /// # Errors
    /// Returns an error if the address is malformed or carries another version byte.
    pub fn from_address(address: &str) -> Result<Self, HashParseError> {
        let payload = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| HashParseError::InvalidAddress(e.to_string()))?;
        let (&version, script_hash) = payload
            .split_first()
            .ok_or_else(|| HashParseError::InvalidAddress(address.to_string()))?;
        if version != ADDRESS_VERSION {
            return Err(HashParseError::AddressVersion(version));
        }
        let bytes: [u8; 20] =
            script_hash
                .try_into()
                .map_err(|_| HashParseError::InvalidLength {
                    expected: Self::LEN,
                    actual: script_hash.len(),
                })?;
        Ok(Self::from_le_bytes(bytes))
    }

    /// Encodes the script hash as a base58check address.
    #[must_use]
    pub fn to_address(&self) -> String {
        let mut payload = Vec::with_capacity(Self::LEN + 1);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.0);
        bs58::encode(payload).with_check().into_string()
    }
}
