//!
//! # GDSII Eight-Byte Real Numbers
//!

/// Largest value held in the seven mantissa bytes, plus one
const MANTISSA_LIMIT: f64 = 72_057_594_037_927_936.0; // 2^56
/// Mask of the seven mantissa bytes
const MANTISSA_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// # Gds Floating Point
/// ## GDSII's Home-Grown Floating-Point Format
///
/// GDSII predates IEEE754, and carries its own eight-byte real format:
///
/// * The most-significant bit is the sign.
/// * The remaining seven bits of the first byte are a base-16 exponent, stored in excess-64.
/// * The final seven bytes are an unsigned mantissa, interpreted as a fraction in `[1/16, 1)`.
///
/// The value is `sign * (mantissa / 2^56) * 16^(exponent - 64)`.
///
/// The [GdsFloat64] struct is not used as a data-store, but largely a namespace
/// for the `encode` and `decode` operations to and from IEEE754 double-precision format.
///
pub struct GdsFloat64;
impl GdsFloat64 {
    /// Decode GDSII's eight-byte representation, stored as a `u64`, to IEEE (and Rust)-compatible `f64`
    pub fn decode(val: u64) -> f64 {
        // Extract the MSB Sign bit
        let neg = (val & 0x8000_0000_0000_0000) != 0;
        // Extract the 7b exponent
        let exp: i32 = ((val & 0x7F00_0000_0000_0000) >> (8 * 7)) as i32 - 64;
        // Create the initially integer-valued mantissa from the 7 least-significant bytes,
        // and apply its normalization to the range (1/16, 1)
        let mantissa = (val & MANTISSA_MASK) as f64 / MANTISSA_LIMIT;
        // Combine everything into our overall value
        let magnitude = mantissa * 16f64.powi(exp);
        if neg {
            -magnitude
        } else {
            magnitude
        }
    }
    /// Encode `f64` to GDSII's eight bytes, stored as `u64`.
    ///
    /// The exponent is chosen as `ceil(log2(|val|) / 4)`, and the mantissa is *truncated*, not rounded.
    /// Never fails: zero and NaN encode as all-zero bytes,
    /// values too small for the format underflow to zero,
    /// and values too large saturate to the largest representable magnitude.
    pub fn encode(val: f64) -> u64 {
        if val == 0.0 || val.is_nan() {
            return 0;
        }
        let sign: u64 = if val < 0.0 { 0x8000_0000_0000_0000 } else { 0 };
        let val = val.abs();
        if val.is_infinite() {
            return sign | 0x7FFF_FFFF_FFFF_FFFF;
        }

        let mut exponent = (val.log2() / 4.0).ceil() as i32;
        // Settle out-of-range magnitudes first, as `powi` could leave the `f64` range.
        // One step of slack on either side leaves room for the renormalization below.
        if exponent < -65 {
            return 0;
        }
        if exponent > 64 {
            return sign | 0x7FFF_FFFF_FFFF_FFFF;
        }
        let mut mantissa = val / 16f64.powi(exponent) * MANTISSA_LIMIT;
        // `log2` is inexact near powers of 16. Renormalize into [2^52, 2^56).
        while mantissa >= MANTISSA_LIMIT {
            exponent += 1;
            mantissa /= 16.0;
        }
        while mantissa < MANTISSA_LIMIT / 16.0 {
            exponent -= 1;
            mantissa *= 16.0;
        }
        if exponent < -64 {
            // Below the format's range
            return 0;
        }
        if exponent > 63 {
            return sign | 0x7FFF_FFFF_FFFF_FFFF;
        }
        let top = ((exponent + 64) as u64) << (8 * 7);
        sign | top | (mantissa.trunc() as u64 & MANTISSA_MASK)
    }
}

/// Decode the eight big-endian bytes of a GDSII real
pub fn decode_real(bytes: [u8; 8]) -> f64 {
    GdsFloat64::decode(u64::from_be_bytes(bytes))
}

/// Encode `val` into the eight big-endian bytes of a GDSII real
pub fn encode_real(val: f64) -> [u8; 8] {
    GdsFloat64::encode(val).to_be_bytes()
}
