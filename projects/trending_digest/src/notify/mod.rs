pub mod deliver;
pub mod format;

pub use deliver::{deliver_all, DeliveryReport, LogSender, MessageSender, TelegramSender};
pub use format::{format_messages, BatchLimits, MessageBatches};
