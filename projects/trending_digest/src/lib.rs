//! GitHub trending digest
//!
//! - Page fetch and HTML extraction in `trending/`
//! - JSON history and first-seen diff in `history/`
//! - Message batching and Telegram delivery in `notify/`
//! - Requires TELEGRAM_BOT_TOKEN and TELEGRAM_CHANNEL_ID unless running dry

pub mod config;
pub mod history;
pub mod model;
pub mod notify;
pub mod run;
pub mod trending;
