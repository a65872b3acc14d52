use rust_decimal::Decimal;

/// Decides whether a price drop is worth an email.
///
/// Fires only when a price was actually observed, it is strictly below the
/// target (a tie does not count), and the product was not notified before.
pub fn should_notify(price: Option<Decimal>, target_price: Decimal, already_notified: bool) -> bool {
    match price {
        Some(p) => p < target_price && !already_notified,
        None => false,
    }
}
