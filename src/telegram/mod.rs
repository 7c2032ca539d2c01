//! Telegram delivery of price-drop alerts.

mod client;

pub use client::{Notifier, TelegramNotifier};
