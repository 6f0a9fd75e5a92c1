//! CRC-8 routines used on the wire.
//!
//! Both checksums are 8-bit, MSB-first, zero-initialized bit loops; they
//! differ only in polynomial. `crc8_dvb_s2` (poly 0xD5) covers current-
//! protocol frames and has the property that folding it over a frame
//! including its trailing checksum yields zero. `crc8_poly31` (poly 0x31)
//! covers the first-generation five-byte reply record.

/// Update a CRC-8/DVB-S2 value with one byte.
pub fn crc8_dvb_s2(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    for _ in 0..8 {
        if crc & 0x80 != 0 {
            crc = (crc << 1) ^ 0xD5;
        } else {
            crc <<= 1;
        }
    }
    crc
}

/// Fold CRC-8/DVB-S2 over a byte slice, continuing from `crc`.
pub fn crc8_dvb_s2_update(crc: u8, bytes: &[u8]) -> u8 {
    bytes.iter().fold(crc, |crc, &byte| crc8_dvb_s2(crc, byte))
}

/// CRC-8 with polynomial 0x31 over a byte slice (zero-initialized).
pub fn crc8_poly31(bytes: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in bytes {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
