//! Console report for a completed run

use crate::detect::{ChangeKind, ChangeRecord};
use crate::model::{Availability, ScrapeResult};

/// Formats a price as "2 120,00 PLN", or "n/a" when there is none
pub fn format_price(price: Option<f64>) -> String {
    let Some(p) = price else {
        return "n/a".to_string();
    };
    let total_cents = (p * 100.0).round() as i64;
    let whole = (total_cents / 100).abs();
    let cents = (total_cents % 100).abs();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if total_cents < 0 { "-" } else { "" };
    format!("{}{},{:02} PLN", sign, grouped, cents)
}

pub fn format_availability(availability: Availability) -> &'static str {
    match availability {
        Availability::InStock => "in stock",
        Availability::OutOfStock => "out of stock",
        Availability::Unknown => "availability unknown",
    }
}

/// Prints the per-site readings followed by the change list
///
/// `*` marks a variant-confirmed reading, `~` an SKU-only confirmation,
/// `?` an unconfirmed one.
pub fn print_report(changes: &[ChangeRecord], results: &[ScrapeResult], target_variant: &str) {
    println!();
    println!("Readings for variant {}:", target_variant);
    for result in results {
        let marker = if result.variant_confirmed {
            '*'
        } else if result.sku_confirmed {
            '~'
        } else {
            '?'
        };
        match &result.error {
            Some(e) => println!("  {} {}: error: {}", marker, result.name, e),
            None => println!(
                "  {} {}: {} ({})",
                marker,
                result.name,
                format_price(result.price),
                format_availability(result.availability)
            ),
        }
    }

    println!();
    if changes.is_empty() {
        println!("No changes since the last run.");
        return;
    }

    println!("Changes:");
    for change in changes {
        match change.kind {
            ChangeKind::New => println!(
                "  NEW {}: {} ({})",
                change.result.name,
                format_price(change.result.price),
                format_availability(change.result.availability)
            ),
            ChangeKind::Change => {
                if change.price_changed {
                    println!(
                        "  {}: {} -> {}",
                        change.result.name,
                        format_price(change.prior_price),
                        format_price(change.result.price)
                    );
                }
                if change.availability_changed {
                    let before = change
                        .prior_availability
                        .map(format_availability)
                        .unwrap_or("availability unknown");
                    println!(
                        "  {}: {} -> {}",
                        change.result.name,
                        before,
                        format_availability(change.result.availability)
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(Some(2120.0)), "2 120,00 PLN");
        assert_eq!(format_price(Some(999.99)), "999,99 PLN");
        assert_eq!(format_price(Some(1234567.5)), "1 234 567,50 PLN");
    }

    #[test]
    fn test_format_price_rounds_to_cents() {
        assert_eq!(format_price(Some(2499.005)), "2 499,01 PLN");
        assert_eq!(format_price(Some(100.0)), "100,00 PLN");
    }

    #[test]
    fn test_format_price_none() {
        assert_eq!(format_price(None), "n/a");
    }

    #[test]
    fn test_format_availability() {
        assert_eq!(format_availability(Availability::InStock), "in stock");
        assert_eq!(format_availability(Availability::OutOfStock), "out of stock");
        assert_eq!(
            format_availability(Availability::Unknown),
            "availability unknown"
        );
    }
}
