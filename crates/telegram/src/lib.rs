//! Telegram infrastructure adapter.
//!
//! Implements [`report::MessageSink`] for the Telegram Bot API:
//! `getMe` serves as the connection check, `sendMessage` delivers the
//! rendered notification with `parse_mode = "Markdown"`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, the Bot API response envelope, and
//! flood-control (`retry_after`) interpretation live here. The bot token is
//! part of every request path; it is stripped from transport errors and never
//! logged.

mod client;
mod error;

pub use client::{TelegramClient, TelegramConfig, DEFAULT_API_URL};
pub use error::TelegramError;
