//! Reader frame checksum
//!
//! From the reader protocol manual (V2.16):
//! 1. Sum every byte from the marker through the last payload byte
//! 2. Keep the low 8 bits
//! 3. Take the bitwise complement and add one (two's-complement negation)

use tracing::trace;

/// Calculate the checksum over a frame without its trailing checksum byte
///
/// # Algorithm
///
/// ```text
/// ck = (~(sum(bytes) & 0xFF) + 1) & 0xFF
/// ```
///
/// # Examples
///
/// ```
/// use uhfkit_core::checksum;
///
/// // Stop-inventory acknowledgment without its checksum byte
/// let ck = checksum::calculate(&[0xD9, 0x06, 0x01, 0x00, 0x2F, 0x00, 0x00]);
/// assert_eq!(ck, 0xF1);
/// ```
pub fn calculate(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let checksum = (!sum).wrapping_add(1);

    trace!(
        len = bytes.len(),
        checksum = format!("0x{:02X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify a complete frame, checksum byte included
///
/// A well-formed frame sums to zero modulo 256.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&received, body)) => calculate(body) == received,
        None => false,
    }
}
