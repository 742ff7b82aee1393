//! Amount and address display helpers
//!
//! Amounts stay decimal strings end to end; conversion between base
//! (micro) and display units is done with string arithmetic so a value
//! never rounds through a float.

/// Format a base-unit amount for display: `"1500000"` with 6 decimals
/// becomes `"1.50"`, `"1234560000"` becomes `"1,234.56"`. At least two
/// fraction digits are kept, trailing zeros beyond that are trimmed.
/// Non-numeric input formats as `"0.00"`.
pub fn format_amount(amount: &str, decimals: u32) -> String {
    let digits = amount.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return "0.00".to_string();
    }
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() <= decimals {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    } else {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    };

    let min_frac = decimals.min(2);
    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac {
        frac.push('0');
    }

    let grouped = group_thousands(&int_part);
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}

/// Convert a display-unit amount to base units, truncating anything below
/// one base unit: `"1.5"` with 6 decimals becomes `"1500000"`. Returns
/// `None` for non-numeric input.
pub fn to_micro_units(amount: &str, decimals: u32) -> Option<String> {
    let amount = amount.trim();
    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let decimals = decimals as usize;
    let mut frac = frac_part.to_string();
    frac.truncate(decimals);
    while frac.len() < decimals {
        frac.push('0');
    }

    let combined = format!("{int_part}{frac}");
    let trimmed = combined.trim_start_matches('0');
    Some(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

/// Shorten a bech32 address for display, keeping the prefix readable:
/// `shorten_address("skill1qqq...", 8)` keeps the first `8 + 5` and last
/// `8` characters. Addresses too short to shorten pass through unchanged.
pub fn shorten_address(address: &str, chars: usize) -> String {
    let total: Vec<char> = address.chars().collect();
    let head = chars + 5;
    if total.len() <= head + chars {
        return address.to_string();
    }
    let front: String = total[..head].iter().collect();
    let back: String = total[total.len() - chars..].iter().collect();
    format!("{front}...{back}")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
