use chrono::{DateTime, Utc};

/// Price of a stay: elapsed hours times the hourly rate, rounded to cents.
///
/// An end before the start yields a negative amount.
pub fn booking_cost(start: DateTime<Utc>, end: DateTime<Utc>, price_per_hour: f64) -> f64 {
    let hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;
    round_cents(hours * price_per_hour)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
