//! Raw access to the Telegram Bot API `sendMessage` method.

pub mod index;
