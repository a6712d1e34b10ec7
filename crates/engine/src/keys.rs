//! Random identifier and key generators for the device and gateway forms.
//!
//! Every generator returns upper-case hexadecimal of a fixed width.

use rand::Rng;

pub const DEV_EUI_LEN: usize = 16;
pub const SESSION_KEY_LEN: usize = 32;
pub const DEV_ADDR_LEN: usize = 8;
pub const GATEWAY_MAC_LEN: usize = 16;

/// `len` random upper-case hex digits.
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    rand::rng().fill(&mut bytes[..]);
    let mut encoded = hex::encode_upper(bytes);
    encoded.truncate(len);
    encoded
}

pub fn dev_eui() -> String {
    random_hex(DEV_EUI_LEN)
}

/// AppKey, NwkSKey and AppSKey all share the 128-bit width.
pub fn session_key() -> String {
    random_hex(SESSION_KEY_LEN)
}

pub fn dev_addr() -> String {
    random_hex(DEV_ADDR_LEN)
}

pub fn gateway_mac() -> String {
    random_hex(GATEWAY_MAC_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::is_hex_of_len;

    #[test]
    fn generators_have_fixed_width_upper_hex() {
        for (value, len) in [(dev_eui(), 16), (session_key(), 32), (dev_addr(), 8), (gateway_mac(), 16)] {
            assert!(is_hex_of_len(&value, len), "{value}");
            assert_eq!(value, value.to_ascii_uppercase());
        }
        assert_eq!(random_hex(5).len(), 5);
    }
}
