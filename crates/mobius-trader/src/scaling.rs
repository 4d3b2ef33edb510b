//! Fixed-point conversion between server integers and floating values.
//!
//! The server stores prices, volumes and money as integers scaled by a
//! per-symbol or per-currency power of ten. Scaling goes through decimal
//! exponent notation so that `1.1` with 2 digits gives exactly `110`.

/// Scale `number` up by `10^digits`, truncating toward zero.
pub fn to_int(number: f64, digits: u32) -> i64 {
    let scaled = format!("{number}e{digits}")
        .parse::<f64>()
        .unwrap_or_else(|_| number * 10f64.powi(digits as i32));
    scaled.trunc() as i64
}

/// Scale `number` down by `10^digits`.
pub fn to_float(number: i64, digits: u32) -> f64 {
    format!("{number}e-{digits}")
        .parse::<f64>()
        .unwrap_or_else(|_| number as f64 / 10f64.powi(digits as i32))
}
