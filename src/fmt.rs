/// Plain two-decimal amount with no grouping, so echoed text re-parses: 1234.50
pub fn amount(val: f64) -> String {
    format!("{val:.2}")
}

/// Amount followed by the configured currency symbol: 1234.50 ₽
pub fn money(val: f64, currency: &str) -> String {
    if currency.is_empty() {
        amount(val)
    } else {
        format!("{} {currency}", amount(val))
    }
}

pub fn percent(pct: f64) -> String {
    format!("{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "₽"), "1234.56 ₽");
        assert_eq!(money(-500.0, "₽"), "-500.00 ₽");
        assert_eq!(money(0.0, "$"), "0.00 $");
        assert_eq!(money(42.1, ""), "42.10");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(71.4285), "71.4%");
        assert_eq!(percent(100.0), "100.0%");
    }
}
