//! Pure message formatting for the Telegram digest.
//!
//! Records are packed into HTML messages that respect both a per-message
//! record cap and a hard length ceiling. Lengths are UTF-16 code units, the
//! unit Telegram counts in, so an emoji outside the BMP costs two. Ranks are
//! global, so the third message of a 25-record digest starts at `21.`.

use chrono::NaiveDate;

use crate::model::RepositoryRecord;

/// Telegram rejects messages longer than this many UTF-16 code units.
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;
pub const DEFAULT_MAX_RECORDS: usize = 10;

const TITLE: &str = "🔥 New GitHub Trending Repositories";
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_records: usize,
    /// In UTF-16 code units.
    pub max_chars: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            max_chars: TELEGRAM_MAX_MESSAGE_CHARS,
        }
    }
}

/// Lazily splits `records` into digest messages.
///
/// An empty slice still produces exactly one message saying nothing is new.
pub fn format_messages(
    records: &[RepositoryRecord],
    date: NaiveDate,
    limits: BatchLimits,
) -> MessageBatches<'_> {
    MessageBatches {
        records,
        date,
        limits: BatchLimits {
            max_records: limits.max_records.max(1),
            max_chars: limits.max_chars,
        },
        next: 0,
        done: false,
    }
}

pub struct MessageBatches<'a> {
    records: &'a [RepositoryRecord],
    date: NaiveDate,
    limits: BatchLimits,
    next: usize,
    done: bool,
}

impl MessageBatches<'_> {
    fn header(&self) -> String {
        if self.next == 0 {
            format!("<b>{TITLE} ({})</b>\n\n", self.date.format("%Y-%m-%d"))
        } else {
            format!("<b>{TITLE} (continued)</b>\n\n")
        }
    }

    fn footer(&self) -> String {
        format!("Total new repositories: {}", self.records.len())
    }

    fn empty_message(&self) -> String {
        format!(
            "<b>GitHub Trending Update ({})</b>\nNo new trending repositories found today.",
            self.date.format("%Y-%m-%d")
        )
    }
}

impl Iterator for MessageBatches<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        if self.records.is_empty() {
            self.done = true;
            return Some(plain_text_within(self.empty_message(), self.limits.max_chars));
        }

        let mut message = self.header();
        let mut used = utf16_len(&message);
        let mut placed = 0;
        let footer = self.footer();
        let footer_len = utf16_len(&footer);

        while self.next < self.records.len() && placed < self.limits.max_records {
            let rank = self.next + 1;
            let record = &self.records[self.next];
            let reserve = if rank == self.records.len() { footer_len } else { 0 };

            let mut block = format_block(rank, record);
            if used + utf16_len(&block) + reserve > self.limits.max_chars {
                if placed > 0 {
                    break;
                }
                let budget = self.limits.max_chars.saturating_sub(used + reserve);
                block = format_block_within(rank, record, budget);
            }

            used += utf16_len(&block);
            message.push_str(&block);
            placed += 1;
            self.next += 1;
        }

        if self.next == self.records.len() {
            message.push_str(&footer);
            self.done = true;
        }

        Some(plain_text_within(message, self.limits.max_chars))
    }
}

fn format_block(rank: usize, record: &RepositoryRecord) -> String {
    block_with_description(rank, record, &escape_html(&record.description))
}

/// Same as [`format_block`] but shortens the description so the block fits
/// in `budget` code units.
fn format_block_within(rank: usize, record: &RepositoryRecord, budget: usize) -> String {
    let bare = utf16_len(&block_with_description(rank, record, ""));
    let description = escape_html_within(&record.description, budget.saturating_sub(bare));
    block_with_description(rank, record, &description)
}

fn block_with_description(rank: usize, record: &RepositoryRecord, description: &str) -> String {
    format!(
        "{rank}. <a href=\"{}\">{}</a>\n\
         <b>Language:</b> {} | <b>Stars:</b> {}\n\
         <b>Description:</b> {description}\n\n",
        escape_html(&record.url),
        escape_html(&record.repo),
        escape_html(&record.language),
        escape_html(&record.stars),
    )
}

fn escape_char(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match escape_char(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Escapes `text`, cutting it short with an ellipsis if the escaped form
/// would exceed `budget` code units. Never splits an entity.
fn escape_html_within(text: &str, budget: usize) -> String {
    let escaped = escape_html(text);
    if utf16_len(&escaped) <= budget {
        return escaped;
    }
    if budget == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let width = escape_char(ch).map_or(ch.len_utf16(), utf16_len);
        if used + width + ELLIPSIS.len_utf16() > budget {
            break;
        }
        match escape_char(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
        used += width;
    }
    out.push(ELLIPSIS);
    out
}

/// Last resort for limits too small to hold even a header and a bare block:
/// drops the markup and keeps as much text as fits. Cutting inside a tag
/// would make Telegram reject the whole message, and entities stay whole.
fn plain_text_within(html: String, budget: usize) -> String {
    if utf16_len(&html) <= budget {
        return html;
    }

    let ellipsis = ELLIPSIS.len_utf16();
    let mut out = String::new();
    let mut used = 0;
    let mut rest = html.as_str();
    let mut truncated = false;

    while let Some(ch) = rest.chars().next() {
        let unit_len = match ch {
            '<' => match rest.find('>') {
                Some(end) => {
                    rest = &rest[end + 1..];
                    continue;
                }
                None => break,
            },
            '&' => rest.find(';').map_or(1, |end| end + 1),
            _ => ch.len_utf8(),
        };
        let unit = &rest[..unit_len];
        let width = utf16_len(unit);
        if used + width + ellipsis > budget {
            truncated = true;
            break;
        }
        out.push_str(unit);
        used += width;
        rest = &rest[unit_len..];
    }

    if truncated && used + ellipsis <= budget {
        out.push(ELLIPSIS);
    }
    out
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
