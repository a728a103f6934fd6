use markets_sdk::Quote;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";

const RULE_WIDTH: usize = 30;

pub fn fetching(symbol: &str) -> String {
    format!("{CYAN}Fetching data for {symbol}...{RESET}")
}

pub fn failure(error: &anyhow::Error) -> String {
    format!("{RED}Error: {error:#}{RESET}")
}

/// Render a quote as a small colored card.
pub fn render_quote(quote: &Quote) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let change_color = if quote.change_24h.is_sign_negative() {
        RED
    } else {
        GREEN
    };
    let sign = if quote.change_24h.is_sign_negative() {
        "-"
    } else {
        ""
    };

    [
        rule.clone(),
        format!(
            "{BOLD}{} ({}){RESET}",
            quote.symbol.to_uppercase(),
            quote.source.to_uppercase()
        ),
        rule.clone(),
        format!("Price:      {BLUE}${:.2}{RESET}", quote.price),
        format!(
            "Change 24h: {change_color}{sign}${:.2}{RESET}",
            quote.change_24h.abs()
        ),
        format!(
            "Updated:    {}",
            quote.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        rule,
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn quote(change: rust_decimal::Decimal) -> Quote {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0).unwrap();
        Quote::new("aapl", dec!(190.5), at, "yahoo").with_change_24h(change)
    }

    #[test]
    fn test_renders_card() {
        let card = render_quote(&quote(dec!(2.5)));

        assert!(card.contains("AAPL (YAHOO)"));
        assert!(card.contains("$190.50"));
        assert!(card.contains(&format!("{GREEN}$2.50{RESET}")));
        assert!(card.contains("2024-01-02 15:30:00 UTC"));
    }

    #[test]
    fn test_negative_change_is_red() {
        let card = render_quote(&quote(dec!(-1.25)));

        assert!(card.contains(&format!("{RED}-$1.25{RESET}")));
    }
}
