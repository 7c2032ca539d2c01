//! Alert message and run report text.

use crate::tracker::{Outcome, PriceDrop, ProductOutcome, RunReport};
use serde::Serialize;

/// Characters Telegram MarkdownV2 requires to be escaped outside entities.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes text for Telegram MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Formats a price with two decimals, dropping a zero fraction.
pub fn format_price(price: f64) -> String {
    let text = format!("{:.2}", price);
    match text.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// Builds the Telegram alert for one price drop (MarkdownV2).
pub fn alert_message(drop: &PriceDrop) -> String {
    let sym = escape_markdown(&drop.currency_symbol);
    let old = escape_markdown(&format_price(drop.old_price));
    let new = escape_markdown(&format_price(drop.new_price));

    let off = escape_markdown(&format!("({:.0}% off)", drop.percent()));

    format!(
        "🔥 *PRICE DROP ALERT\\!*\n\n📦 *{}*\n~{}{}~ → *{}{}* {}\n\n🛒 Buy now:\n{}",
        escape_markdown(&drop.name),
        sym,
        old,
        sym,
        new,
        off,
        escape_markdown(&drop.url)
    )
}

/// Plain-text status lines for a finished run, ending with the completion marker.
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::new();

    for p in &report.products {
        let line = match &p.outcome {
            Outcome::Seeded { price } => {
                format!("📦 {}: first price saved ({})", p.name, format_price(*price))
            }
            Outcome::Dropped { old, new, delivered: true } => {
                format!("🔥 {}: {} → {} (alert sent)", p.name, format_price(*old), format_price(*new))
            }
            Outcome::Dropped { old, new, delivered: false } => format!(
                "❌ {}: {} → {} (alert failed, will retry next run)",
                p.name,
                format_price(*old),
                format_price(*new)
            ),
            Outcome::Unchanged { baseline, observed } => format!(
                "ℹ️ {}: no drop ({}, baseline {})",
                p.name,
                format_price(*observed),
                format_price(*baseline)
            ),
            Outcome::Skipped { reason } => format!("⚠️ {}: price not found ({})", p.name, reason),
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "✅ Run completed: {} products, {} alerts sent, {} failed, {} skipped",
        report.products.len(),
        report.alerts_sent(),
        report.alerts_failed(),
        report.skipped()
    ));

    lines.join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: &'static str,
    checked: usize,
    alerts_sent: usize,
    alerts_failed: usize,
    skipped: usize,
    products: &'a [ProductOutcome],
}

/// JSON rendering of a finished run; `"status": "completed"` marks a full pass.
pub fn format_report_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        status: "completed",
        checked: report.products.len(),
        alerts_sent: report.alerts_sent(),
        alerts_failed: report.alerts_failed(),
        skipped: report.skipped(),
        products: &report.products,
    })
}
