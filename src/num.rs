use crate::text::is_numeric_like;
use crate::value::Value;

/// Recognize a bare token as a number, per the decode rule: signed 64-bit
/// integer first, then double. Tokens that are not numeric-shaped return
/// `None` so that barewords like `+5` or `0x10` stay strings; the shape
/// guard also keeps `f64::from_str` from accepting `inf` and `NaN`.
pub(crate) fn parse_number_token(token: &str) -> Option<Value> {
    if !is_numeric_like(token) {
        return None;
    }
    let has_float_syntax = token
        .as_bytes()
        .iter()
        .any(|b| matches!(b, b'.' | b'e' | b'E'));
    if !has_float_syntax {
        if let Ok(value) = token.parse::<i64>() {
            return Some(Value::Int(value));
        }
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(Value::Float(value)),
        _ => None,
    }
}

/// Append an integer in decimal.
pub(crate) fn append_int(out: &mut String, value: i64) {
    let mut buf = itoa::Buffer::new();
    out.push_str(buf.format(value));
}

/// Append a float as its shortest round-trip decimal, with scientific
/// notation expanded to plain digits. Non-finite floats emit `null`.
pub(crate) fn append_float(out: &mut String, value: f64) {
    if !value.is_finite() {
        out.push_str("null");
        return;
    }
    let mut buf = ryu::Buffer::new();
    let shortest = buf.format(value);
    if shortest.as_bytes().iter().any(|b| matches!(b, b'e' | b'E')) {
        expand_exponent_into(out, shortest);
    } else {
        out.push_str(shortest);
    }
}

/// Rewrite `d.dddde±N` as plain decimal by shifting the digit string.
/// Works on digits only, so the expansion is exact.
fn expand_exponent_into(out: &mut String, shortest: &str) {
    let bytes = shortest.as_bytes();
    let mut i = 0;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        i = 1;
    }

    let mut digits: Vec<u8> = Vec::with_capacity(24);
    let mut dot_pos = None;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => digits.push(bytes[i]),
            b'.' => dot_pos = Some(digits.len()),
            b'e' | b'E' => {
                i += 1;
                break;
            }
            _ => {}
        }
        i += 1;
    }

    let mut exp_sign = 1i32;
    match bytes.get(i) {
        Some(b'-') => {
            exp_sign = -1;
            i += 1;
        }
        Some(b'+') => i += 1,
        _ => {}
    }
    let mut exp: i32 = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            exp = exp.saturating_mul(10).saturating_add((bytes[i] - b'0') as i32);
        }
        i += 1;
    }
    exp *= exp_sign;

    let dot_pos = dot_pos.unwrap_or(digits.len());
    let new_pos = dot_pos as i32 + exp;
    if negative {
        out.push('-');
    }

    if new_pos <= 0 {
        out.push_str("0.");
        for _ in 0..(-new_pos) {
            out.push('0');
        }
        for &digit in &digits {
            out.push(digit as char);
        }
        return;
    }

    let new_pos = new_pos as usize;
    if new_pos >= digits.len() {
        for &digit in &digits {
            out.push(digit as char);
        }
        for _ in 0..(new_pos - digits.len()) {
            out.push('0');
        }
        // keep the float classification: without a fraction the token
        // would reparse as an integer when it fits in 64 bits
        out.push_str(".0");
        return;
    }

    for &digit in &digits[..new_pos] {
        out.push(digit as char);
    }
    out.push('.');
    for &digit in &digits[new_pos..] {
        out.push(digit as char);
    }
}
