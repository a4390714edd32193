//! Custom serde implementations for the RPC wire representation.

/// (De)serialize bytes as a standard base64 string.
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for bytes.
    /// # Errors
    /// Returns an error if the serializer fails.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Implements the serde `deserialize` function for bytes.
    /// # Errors
    /// Returns an error if the string is not valid base64.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// (De)serialize a `u64` as a bare hex string, e.g. the block nonce.
pub mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a hex number.
    /// # Errors
    /// Returns an error if the serializer fails.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:016X}"))
    }

    /// Implements the serde `deserialize` function for a hex number.
    /// # Errors
    /// Returns an error if the string is not valid hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
    }
}

/// (De)serialize a script hash as a base58check address.
pub mod address {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Uint160;

    /// Implements the serde `serialize` function for an address.
    /// # Errors
    /// Returns an error if the serializer fails.
    pub fn serialize<S: Serializer>(value: &Uint160, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_address())
    }

    /// Implements the serde `deserialize` function for an address.
    /// # Errors
    /// Returns an error if the address is not valid.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uint160, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uint160::from_address(&s).map_err(serde::de::Error::custom)
    }
}
