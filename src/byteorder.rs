//! Host/network byte-order conversion.
//!
//! Pure functions, no side effects, no error paths. `host_to_network_*` and
//! `network_to_host_*` are involutions: on a little-endian host they reverse
//! bytes, on a big-endian host they are the identity.

////////////////////////////////////////////////////////////////////////////////
//// Functions

pub const fn host_to_network_16(v: u16) -> u16 {
    v.to_be()
}

pub const fn network_to_host_16(v: u16) -> u16 {
    u16::from_be(v)
}

pub const fn host_to_network_32(v: u32) -> u32 {
    v.to_be()
}

pub const fn network_to_host_32(v: u32) -> u32 {
    u32::from_be(v)
}

pub const fn host_to_network_64(v: u64) -> u64 {
    v.to_be()
}

pub const fn network_to_host_64(v: u64) -> u64 {
    u64::from_be(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_value_16() {
        // S6: 0x1234 on a little-endian host becomes 0x3412.
        let networked = host_to_network_16(0x1234);
        if cfg!(target_endian = "little") {
            assert_eq!(networked, 0x3412);
        } else {
            assert_eq!(networked, 0x1234);
        }
        assert_eq!(network_to_host_16(networked), 0x1234);
    }

    proptest! {
        #[test]
        fn involution_16(v: u16) {
            prop_assert_eq!(network_to_host_16(host_to_network_16(v)), v);
            prop_assert_eq!(host_to_network_16(network_to_host_16(v)), v);
        }

        #[test]
        fn involution_32(v: u32) {
            prop_assert_eq!(network_to_host_32(host_to_network_32(v)), v);
            prop_assert_eq!(host_to_network_32(network_to_host_32(v)), v);
        }

        #[test]
        fn involution_64(v: u64) {
            prop_assert_eq!(network_to_host_64(host_to_network_64(v)), v);
            prop_assert_eq!(host_to_network_64(network_to_host_64(v)), v);
        }
    }
}
