//! Text rendering for the read-only views
//!
//! Pure formatting, no I/O: every view builds a `String` so tests can
//! assert on the exact output. The badge arithmetic (experience clamp and
//! level derivation) lives here because nothing but the display uses it.

use courier_backend::{DeliveryRecord, Earnings, Nft};
use courier_core::{HealthSample, Order};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ----------------------------------------------------------------------------
// Pending Orders
// ----------------------------------------------------------------------------

pub fn render_pending(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "no pending orders right now\n".to_string();
    }
    let mut out = format!("{} pending order(s):\n", orders.len());
    for order in orders {
        out.push_str(&format!(
            "  #{:<6} {}  ({:.5}, {:.5})\n",
            order.id.value(),
            order.delivery_address,
            order.destination_lat,
            order.destination_lng,
        ));
    }
    out
}

// ----------------------------------------------------------------------------
// Health
// ----------------------------------------------------------------------------

pub fn render_health(sample: &HealthSample) -> String {
    let filled = usize::from(sample.level.clamp(1, 5));
    let gauge: String = "#".repeat(filled) + &".".repeat(5 - filled);
    format!("health [{}] {}/5 {}", gauge, sample.level, sample.label)
}

// ----------------------------------------------------------------------------
// Delivery History
// ----------------------------------------------------------------------------

pub fn render_deliveries(records: &[DeliveryRecord]) -> String {
    if records.is_empty() {
        return "no completed deliveries yet\n".to_string();
    }
    let mut out = format!("{} completed delivery(ies):\n", records.len());
    for record in records {
        out.push_str(&format!(
            "  #{:<6} {:<12} {:<10} {}\n",
            record.id, record.delivery_date, record.result, record.delivery_address,
        ));
    }
    out
}

// ----------------------------------------------------------------------------
// Earnings
// ----------------------------------------------------------------------------

pub fn render_earnings(earnings: &Earnings, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("total earnings:  {:.2}\n", earnings.total));
    out.push_str(&format!("this week:       {:.2}\n", earnings.weekly));
    if earnings.weekly_data.is_empty() {
        return out;
    }

    let max = earnings
        .weekly_data
        .iter()
        .cloned()
        .fold(0.0_f64, f64::max);
    out.push('\n');
    for (i, value) in earnings.weekly_data.iter().enumerate().take(7) {
        let width = if max > 0.0 {
            ((value / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {} {:<width$} {:.2}\n",
            WEEKDAYS[i],
            "#".repeat(width),
            value,
            width = bar_width,
        ));
    }
    out
}

// ----------------------------------------------------------------------------
// Badge
// ----------------------------------------------------------------------------

/// Badge level from raw experience: one level per 100 xp, capped at 5.
pub fn badge_level(experience: f64) -> u8 {
    let level = (experience / 100.0).floor() as i64 + 1;
    level.clamp(1, 5) as u8
}

/// Experience as displayed, clamped to the 100-point gauge.
pub fn badge_progress(experience: f64) -> f64 {
    experience.clamp(0.0, 100.0)
}

pub fn render_badge(experience: f64, nfts: &[Nft]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "experience: {:.0}/100 (level {})\n",
        badge_progress(experience),
        badge_level(experience),
    ));
    if nfts.is_empty() {
        out.push_str("no badges collected yet\n");
    } else {
        out.push_str(&format!("{} badge(s):\n", nfts.len()));
        for nft in nfts {
            out.push_str(&format!("  #{:<6} {}\n", nft.id, nft.image_uri));
        }
    }
    out
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
