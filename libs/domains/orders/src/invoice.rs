//! Invoice number generation: `INV-{YYYYMMDD}-{NNNNN}` with a random 5-digit
//! suffix. Collisions are rare but possible, so callers retry a few times
//! before giving up.

use chrono::NaiveDate;
use rand::Rng;

/// Attempts before a collision becomes a hard conflict
pub const MAX_INVOICE_ATTEMPTS: u32 = 3;

pub fn generate_invoice(date: NaiveDate) -> String {
    let suffix: u32 = rand::rng().random_range(0..100_000);
    format!("INV-{}-{:05}", date.format("%Y%m%d"), suffix)
}
