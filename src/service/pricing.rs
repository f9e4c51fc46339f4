//! Package price arithmetic. All amounts are euro cents; no floats.

/// Commitment lengths offered at checkout, in months.
pub const DURATIONS_MONTHS: [u32; 3] = [1, 3, 6];

/// Percentage taken off the undiscounted total for a commitment length.
pub fn discount_percent(months: u32) -> Option<i64> {
    match months {
        1 => Some(0),
        3 => Some(10),
        6 => Some(20),
        _ => None,
    }
}

/// Total charged up front for `months` of a package, after the commitment
/// discount. `None` for unsupported durations.
pub fn duration_total_cents(monthly_cents: i64, months: u32) -> Option<i64> {
    let discount = discount_percent(months)?;
    Some(monthly_cents * months as i64 * (100 - discount) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_month_is_base_price() {
        assert_eq!(duration_total_cents(16_000, 1), Some(16_000));
    }

    #[test]
    fn three_months_takes_ten_percent_off() {
        // 160.00 base -> 432.00 for the quarter
        assert_eq!(duration_total_cents(16_000, 3), Some(43_200));
    }

    #[test]
    fn six_months_takes_twenty_percent_off() {
        // 160.00 base -> 768.00 for the half year
        assert_eq!(duration_total_cents(16_000, 6), Some(76_800));
    }

    #[test]
    fn unsupported_durations_are_rejected() {
        assert_eq!(duration_total_cents(16_000, 2), None);
        assert_eq!(duration_total_cents(16_000, 12), None);
    }
}
