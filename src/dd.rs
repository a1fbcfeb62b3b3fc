//! Double-double arithmetic.
//!
//! A [`DD`] represents a real number as the unevaluated sum of two `f64`
//! values `hi + lo` with `|lo| <= ulp(hi) / 2`, which gives about 106 bits
//! of mantissa (roughly 32 decimal digits). It is used by the robust
//! predicates to decide orientation and intersection questions that plain
//! double precision gets wrong through catastrophic cancellation.
//!
//! The algorithms are the classic ones of Dekker and Knuth (splitting
//! products at 2^27 + 1).
use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};

use crate::error::DdParseError;

/// Splitting constant for Dekker's product: `2^27 + 1`.
const SPLIT: f64 = 134_217_729.0;

/// Number of significant decimal digits produced when formatting.
const MAX_PRINT_DIGITS: usize = 32;

/// An extended precision floating point number.
#[derive(Debug, Clone, Copy, Default)]
pub struct DD {
    hi: f64,
    lo: f64,
}

impl DD {
    pub const ZERO: DD = DD { hi: 0.0, lo: 0.0 };
    pub const ONE: DD = DD { hi: 1.0, lo: 0.0 };
    pub const TEN: DD = DD { hi: 10.0, lo: 0.0 };
    pub const NAN: DD = DD {
        hi: f64::NAN,
        lo: f64::NAN,
    };

    /// Create from a high and low component. The caller is responsible
    /// for `lo` being small relative to `hi`.
    pub const fn from_parts(hi: f64, lo: f64) -> Self {
        DD { hi, lo }
    }

    /// The high order component.
    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// The low order component.
    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Nearest `f64` to this value.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.hi + self.lo
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.hi == 0.0 && self.lo == 0.0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.hi.is_nan()
    }

    /// Sign of the value: `1`, `-1` or `0`.
    pub fn signum(&self) -> i32 {
        if self.hi > 0.0 {
            1
        } else if self.hi < 0.0 {
            -1
        } else if self.lo > 0.0 {
            1
        } else if self.lo < 0.0 {
            -1
        } else {
            0
        }
    }

    pub fn abs(self) -> DD {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    pub fn sqr(self) -> DD {
        self * self
    }

    /// `1 / self`.
    pub fn reciprocal(self) -> DD {
        let c_big = 1.0 / self.hi;
        let c = SPLIT * c_big;
        let mut hc = c - c_big;
        let mut u = SPLIT * self.hi;
        hc = c - hc;
        let tc = c_big - hc;
        let mut hy = u - self.hi;
        let u_big = c_big * self.hi;
        hy = u - hy;
        let ty = self.hi - hy;
        u = (((hc * hy - u_big) + hc * ty) + tc * hy) + tc * ty;
        let c = ((1.0 - u_big) - u - c_big * self.lo) / self.hi;

        let zhi = c_big + c;
        let zlo = (c_big - zhi) + c;
        DD { hi: zhi, lo: zlo }
    }

    /// Square root. Negative values give [`DD::NAN`].
    pub fn sqrt(self) -> DD {
        if self.is_zero() {
            return DD::ZERO;
        }
        if self.is_negative() {
            return DD::NAN;
        }
        // One Newton step from the double precision estimate doubles the
        // number of correct bits.
        let x = 1.0 / self.hi.sqrt();
        let ax = self.hi * x;
        let axdd = DD::from(ax);
        let d2 = self - axdd.sqr();
        let d = d2.hi * (x * 0.5);
        axdd + d
    }

    /// Integer power by repeated squaring.
    pub fn powi(self, exp: i32) -> DD {
        if exp == 0 {
            return DD::ONE;
        }
        let mut r = self;
        let mut s = DD::ONE;
        let mut n = exp.unsigned_abs();
        if n > 1 {
            while n > 0 {
                if n % 2 == 1 {
                    s = s * r;
                }
                n /= 2;
                if n > 0 {
                    r = r.sqr();
                }
            }
        } else {
            s = r;
        }
        if exp < 0 {
            s.reciprocal()
        } else {
            s
        }
    }

    fn add_parts(self, yhi: f64, ylo: f64) -> DD {
        let s_big = self.hi + yhi;
        let t_big = self.lo + ylo;
        let e = s_big - self.hi;
        let f = t_big - self.lo;
        let s = s_big - e;
        let t = t_big - f;
        let s = (yhi - e) + (self.hi - s);
        let t = (ylo - f) + (self.lo - t);
        let e = s + t_big;
        let h_big = s_big + e;
        let h = e + (s_big - h_big);
        let e = t + h;

        let zhi = h_big + e;
        let zlo = e + (h_big - zhi);
        DD { hi: zhi, lo: zlo }
    }

    fn mul_parts(self, yhi: f64, ylo: f64) -> DD {
        let mut c_big = SPLIT * self.hi;
        let mut hx = c_big - self.hi;
        let mut c = SPLIT * yhi;
        hx = c_big - hx;
        let tx = self.hi - hx;
        let mut hy = c - yhi;
        c_big = self.hi * yhi;
        hy = c - hy;
        let ty = yhi - hy;
        c = ((((hx * hy - c_big) + hx * ty) + tx * hy) + tx * ty)
            + (self.hi * ylo + self.lo * yhi);

        let zhi = c_big + c;
        hx = c_big - zhi;
        let zlo = c + hx;
        DD { hi: zhi, lo: zlo }
    }

    fn div_parts(self, yhi: f64, ylo: f64) -> DD {
        let c_big = self.hi / yhi;
        let c = SPLIT * c_big;
        let mut hc = c - c_big;
        let mut u = SPLIT * yhi;
        hc = c - hc;
        let tc = c_big - hc;
        let mut hy = u - yhi;
        let u_big = c_big * yhi;
        hy = u - hy;
        let ty = yhi - hy;
        u = (((hc * hy - u_big) + hc * ty) + tc * hy) + tc * ty;
        let c = ((((self.hi - u_big) - u) + self.lo) - c_big * ylo) / yhi;
        let u = c_big + c;

        DD {
            hi: u,
            lo: (c_big - u) + c,
        }
    }

    /// Extract decimal digits and the decimal exponent of the leading
    /// digit. The value must be finite and non-zero.
    fn significant_digits(&self) -> (Vec<u8>, i32) {
        let mut y = self.abs();
        let mut mag = magnitude(y.hi);
        y = y / DD::TEN.powi(mag);
        if y >= DD::TEN {
            y = y / DD::TEN;
            mag += 1;
        } else if y < DD::ONE {
            y = y * DD::TEN;
            mag -= 1;
        }

        // One guard digit beyond what is printed, used for rounding.
        let mut digits = Vec::with_capacity(MAX_PRINT_DIGITS + 1);
        while digits.len() <= MAX_PRINT_DIGITS {
            let digit = y.hi as i32;
            if digit < 0 {
                break;
            }
            // A digit of 10 from rounding is printed as 9 and the excess
            // carried into the remainder.
            let rebias = digit > 9;
            digits.push(digit.min(9) as u8);
            y = (y - DD::from(digit as f64)) * DD::TEN;
            if rebias {
                y = y + DD::TEN;
            }
            if y.is_zero() {
                break;
            }
        }

        if digits.len() > MAX_PRINT_DIGITS {
            let round_up = digits[MAX_PRINT_DIGITS] >= 5;
            digits.truncate(MAX_PRINT_DIGITS);
            if round_up && increment_digits(&mut digits) {
                mag += 1;
            }
        }
        while digits.len() > 1 && digits.last() == Some(&0) {
            digits.pop();
        }
        (digits, mag)
    }
}

/// Add one unit in the last place of a decimal digit string. Returns
/// `true` if the carry ran off the front (the string is then `1000...`).
fn increment_digits(digits: &mut Vec<u8>) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return false;
        }
    }
    digits.insert(0, 1);
    digits.pop();
    true
}

/// Decimal exponent of the leading digit of `x`.
fn magnitude(x: f64) -> i32 {
    let x_abs = x.abs();
    let mut x_mag = x_abs.log10().floor() as i32;
    // log10 may be off by one close to powers of ten.
    if 10f64.powi(x_mag) * 10.0 <= x_abs {
        x_mag += 1;
    }
    x_mag
}

impl From<f64> for DD {
    #[inline]
    fn from(x: f64) -> Self {
        DD { hi: x, lo: 0.0 }
    }
}

impl From<DD> for f64 {
    #[inline]
    fn from(x: DD) -> Self {
        x.to_f64()
    }
}

impl Add for DD {
    type Output = DD;
    #[inline]
    fn add(self, rhs: DD) -> DD {
        self.add_parts(rhs.hi, rhs.lo)
    }
}

impl Add<f64> for DD {
    type Output = DD;
    #[inline]
    fn add(self, rhs: f64) -> DD {
        self.add_parts(rhs, 0.0)
    }
}

impl Sub for DD {
    type Output = DD;
    #[inline]
    fn sub(self, rhs: DD) -> DD {
        self.add_parts(-rhs.hi, -rhs.lo)
    }
}

impl Sub<f64> for DD {
    type Output = DD;
    #[inline]
    fn sub(self, rhs: f64) -> DD {
        self.add_parts(-rhs, 0.0)
    }
}

impl Mul for DD {
    type Output = DD;
    #[inline]
    fn mul(self, rhs: DD) -> DD {
        self.mul_parts(rhs.hi, rhs.lo)
    }
}

impl Mul<f64> for DD {
    type Output = DD;
    #[inline]
    fn mul(self, rhs: f64) -> DD {
        self.mul_parts(rhs, 0.0)
    }
}

impl Div for DD {
    type Output = DD;
    #[inline]
    fn div(self, rhs: DD) -> DD {
        self.div_parts(rhs.hi, rhs.lo)
    }
}

impl Div<f64> for DD {
    type Output = DD;
    #[inline]
    fn div(self, rhs: f64) -> DD {
        self.div_parts(rhs, 0.0)
    }
}

impl Neg for DD {
    type Output = DD;
    #[inline]
    fn neg(self) -> DD {
        DD {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl PartialEq for DD {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

/// Compares by the high component and then the low one.
impl PartialOrd for DD {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            o => o,
        }
    }
}

/// Formats with up to 32 significant digits. Magnitudes between `1e-3`
/// and `1e20` use standard notation, others scientific notation
/// (`1.25E-7`).
impl fmt::Display for DD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }
        if self.is_zero() {
            return f.write_str("0.0");
        }
        if !self.hi.is_finite() {
            return f.write_str(if self.hi > 0.0 { "inf" } else { "-inf" });
        }

        let (digits, mag) = self.significant_digits();
        let digits: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        let sign = if self.is_negative() { "-" } else { "" };

        if (-3..=20).contains(&mag) {
            if mag >= 0 {
                let int_len = mag as usize + 1;
                let (int_part, frac_part) = if digits.len() > int_len {
                    (digits[..int_len].to_string(), digits[int_len..].to_string())
                } else {
                    let padding = "0".repeat(int_len - digits.len());
                    (format!("{digits}{padding}"), "0".to_string())
                };
                write!(f, "{sign}{int_part}.{frac_part}")
            } else {
                let zeros = "0".repeat((-mag - 1) as usize);
                write!(f, "{sign}0.{zeros}{digits}")
            }
        } else {
            let (lead, rest) = digits.split_at(1);
            let rest = if rest.is_empty() { "0" } else { rest };
            write!(f, "{sign}{lead}.{rest}E{mag}")
        }
    }
}

/// Parses decimal notation with optional sign, fraction and exponent
/// (`-12.5e-3`). The digits are accumulated in extended precision so a
/// formatted value parses back to within the last printed digit.
impl FromStr for DD {
    type Err = DdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let offset = s.len() - s.trim_start().len();

        let (negative, body, body_offset) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..], 1),
            Some(b'+') => (false, &input[1..], 1),
            Some(_) => (false, input, 0),
            None => return Err(DdParseError::Empty),
        };

        let mut val = DD::ZERO;
        let mut num_digits: i32 = 0;
        let mut num_before_dec: i32 = 0;
        let mut has_decimal = false;
        let mut exp: i32 = 0;
        let mut exp_text = "";

        for (idx, ch) in body.char_indices() {
            if let Some(d) = ch.to_digit(10) {
                val = val * DD::TEN + d as f64;
                num_digits += 1;
                continue;
            }
            match ch {
                '.' if !has_decimal => {
                    num_before_dec = num_digits;
                    has_decimal = true;
                }
                'e' | 'E' => {
                    let rest = &body[idx + 1..];
                    exp_text = rest;
                    exp = rest
                        .parse::<i32>()
                        .map_err(|_| DdParseError::Exponent(rest.to_string()))?;
                    break;
                }
                _ => {
                    return Err(DdParseError::Unexpected {
                        position: offset + body_offset + idx,
                        found: ch,
                    })
                }
            }
        }
        if num_digits == 0 {
            return Err(DdParseError::Empty);
        }
        if !has_decimal {
            num_before_dec = num_digits;
        }

        let exponent_error = || DdParseError::Exponent(exp_text.to_string());
        let num_dec_places = (num_digits - num_before_dec)
            .checked_sub(exp)
            .ok_or_else(exponent_error)?;
        let val = match num_dec_places.cmp(&0) {
            Ordering::Equal => val,
            Ordering::Greater => val / DD::TEN.powi(num_dec_places),
            Ordering::Less => {
                let places = num_dec_places.checked_neg().ok_or_else(exponent_error)?;
                val * DD::TEN.powi(places)
            }
        };
        Ok(if negative { -val } else { val })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DD, b: DD, rel: f64) {
        let err = (a - b).abs().to_f64();
        let scale = b.abs().to_f64().max(f64::MIN_POSITIVE);
        assert!(err / scale <= rel, "{a} != {b} (rel. err {})", err / scale);
    }

    #[test]
    fn test_cancellation_is_exact() {
        let big = 1.0e16;
        assert_eq!((big + 1.0) - big, 0.0);
        let dd = (DD::from(big) + 1.0) - big;
        assert_eq!(dd.to_f64(), 1.0);
    }

    #[test]
    fn test_field_operations() {
        let third = DD::ONE / 3.0;
        assert_close(third * 3.0, DD::ONE, 1e-30);
        assert_close(third.reciprocal(), DD::from(3.0), 1e-30);

        let x = DD::from(1.0e10) + DD::from(1.0e-10);
        assert_close((x - 1.0e10) * 1.0e10, DD::ONE, 1e-15);

        let a: DD = "1.23456789012345678901234567890".parse().unwrap();
        let b: DD = "9.87654321098765432109876543210".parse().unwrap();
        assert_close((a * b) / b, a, 1e-30);
        assert_close((a + b) - b, a, 1e-30);
    }

    #[test]
    fn test_sqrt() {
        let two = DD::from(2.0);
        let root = two.sqrt();
        assert_close(root.sqr(), two, 1e-30);
        assert!(DD::from(-1.0).sqrt().is_nan());
        assert!(DD::ZERO.sqrt().is_zero());
    }

    #[test]
    fn test_pow() {
        assert_eq!(DD::TEN.powi(3).to_f64(), 1000.0);
        assert_close(DD::TEN.powi(-2), DD::ONE / 100.0, 1e-31);
        assert_eq!(DD::from(7.0).powi(0), DD::ONE);
    }

    #[test]
    fn test_comparison() {
        let a = DD::from(1.0);
        let b = a + 1.0e-20;
        assert!(b > a);
        assert!(a < b);
        assert_eq!(a.hi(), b.hi());
        assert_eq!(b.signum(), 1);
        assert_eq!((-b).signum(), -1);
        assert_eq!(DD::ZERO.signum(), 0);
    }

    #[test]
    fn test_parse() {
        let x: DD = "1.5e3".parse().unwrap();
        assert_eq!(x.to_f64(), 1500.0);
        let x: DD = "-0.25".parse().unwrap();
        assert_eq!(x.to_f64(), -0.25);
        let x: DD = " 42 ".parse().unwrap();
        assert_eq!(x.to_f64(), 42.0);

        assert_eq!(
            "1.2x".parse::<DD>(),
            Err(DdParseError::Unexpected {
                position: 3,
                found: 'x'
            })
        );
        assert_eq!("".parse::<DD>(), Err(DdParseError::Empty));
        assert!(matches!(
            "1e".parse::<DD>(),
            Err(DdParseError::Exponent(_))
        ));
    }

    #[test]
    fn test_parse_extreme_exponents() {
        assert_eq!(
            "1e-2147483648".parse::<DD>(),
            Err(DdParseError::Exponent("-2147483648".to_string()))
        );
        assert_eq!(
            "1.5e-2147483647".parse::<DD>(),
            Err(DdParseError::Exponent("-2147483647".to_string()))
        );
        let x: DD = "2.5e10".parse().unwrap();
        assert_eq!(x.to_f64(), 2.5e10);
    }

    #[test]
    fn test_format() {
        assert_eq!(DD::from(1.0).to_string(), "1.0");
        assert_eq!(DD::from(-42.0).to_string(), "-42.0");
        assert_eq!(DD::from(1234.5).to_string(), "1234.5");
        assert_eq!(DD::from(0.25).to_string(), "0.25");
        assert_eq!(DD::ZERO.to_string(), "0.0");
        let tiny: DD = "1e-10".parse().unwrap();
        assert_eq!(tiny.to_string(), "1.0E-10");
        let tenth: DD = "0.1".parse().unwrap();
        assert_eq!(tenth.to_string(), "0.1");
    }

    #[test]
    fn test_format_parse_roundtrip() {
        let values = [
            "3.14159265358979323846264338327950",
            "-2.71828182845904523536028747135266",
            "1.41421356237309504880168872420969E-30",
            "6.02214076E23",
        ];
        for s in values {
            let x: DD = s.parse().unwrap();
            let y: DD = x.to_string().parse().unwrap();
            assert_close(y, x, 1e-29);
        }

        let pi_ish = DD::ONE / 7.0;
        let y: DD = pi_ish.to_string().parse().unwrap();
        assert_close(y, pi_ish, 1e-30);
    }
}
