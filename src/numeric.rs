//! Numeric coercions with native fixed-width integer semantics.
//!
//! Float conversions truncate toward zero. Values outside the target range
//! produce an unspecified result: currently saturation, with NaN mapped to 0.
//! Division and remainder truncate toward zero, so the remainder takes the
//! sign of the dividend.

use crate::error::{Error, Result};

#[inline]
pub fn float_to_int32(f: f32) -> i32 {
    f as i32
}

#[inline]
pub fn double_to_int32(d: f64) -> i32 {
    d as i32
}

#[inline]
pub fn double_to_int64(d: f64) -> i64 {
    d as i64
}

/// `n / d`, rounding toward zero. `i32::MIN / -1` wraps to `i32::MIN`.
#[inline]
pub fn divide_int32(n: i32, d: i32) -> Result<i32> {
    if d == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(n.wrapping_div(d))
}

/// `n % d`, with the sign of `n`. `i32::MIN % -1` is 0.
#[inline]
pub fn remainder_int32(n: i32, d: i32) -> Result<i32> {
    if d == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(n.wrapping_rem(d))
}

#[unsafe(export_name = "gdshim_int32_for_float")]
pub extern "C" fn int32_for_float(f: f32) -> i32 {
    float_to_int32(f)
}

#[unsafe(export_name = "gdshim_int32_for_double")]
pub extern "C" fn int32_for_double(d: f64) -> i32 {
    double_to_int32(d)
}

#[unsafe(export_name = "gdshim_int64_for_double")]
pub extern "C" fn int64_for_double(d: f64) -> i64 {
    double_to_int64(d)
}

/// C entry for [`divide_int32`]. `d` must not be zero; a zero divisor aborts
/// the process.
#[unsafe(export_name = "gdshim_int32_divide")]
pub extern "C" fn int32_divide(n: i32, d: i32) -> i32 {
    divide_int32(n, d).unwrap_or_else(|e| fatal("int32_divide", n, e))
}

/// C entry for [`remainder_int32`]. `d` must not be zero; a zero divisor
/// aborts the process.
#[unsafe(export_name = "gdshim_int32_remainder")]
pub extern "C" fn int32_remainder(n: i32, d: i32) -> i32 {
    remainder_int32(n, d).unwrap_or_else(|e| fatal("int32_remainder", n, e))
}

#[cold]
fn fatal(op: &str, n: i32, e: Error) -> ! {
    log::error!("{}({}, 0): {}", op, n, e);
    log::logger().flush();
    std::process::abort()
}
