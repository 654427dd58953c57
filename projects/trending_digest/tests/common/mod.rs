#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use interfaces_github_trending::index::Timeframe;
use projects_trending_digest::notify::{deliver::DeliverMessageError, MessageSender};
use projects_trending_digest::trending::PageFetcher;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const TRENDING_FIXTURE: &str = include_str!("../fixtures/trending.html");

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Serves the same markup on every call, or nothing to mimic a failed fetch.
pub struct StaticFetcher {
    page: Option<String>,
    pub requested: Mutex<Vec<Option<Timeframe>>>,
}

impl StaticFetcher {
    pub fn serving(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            page: None,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, since: Option<Timeframe>) -> Option<String> {
        self.requested.lock().unwrap().push(since);
        self.page.clone()
    }
}

/// Keeps every message it is asked to send; optionally rejects some of them
/// by position (0-based).
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<String>>,
    reject: Vec<usize>,
    attempts: Mutex<usize>,
}

impl RecordingSender {
    pub fn rejecting(reject: Vec<usize>) -> Self {
        Self {
            reject,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, text: &str) -> Result<(), DeliverMessageError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };

        if self.reject.contains(&attempt) {
            return Err(DeliverMessageError::Rejected {
                status: StatusCode::BAD_REQUEST,
                body: r#"{"ok":false,"description":"Bad Request: message is too long"}"#
                    .to_string(),
            });
        }

        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A trending page with `count` well-formed entries named `owner{i}/repo{i}`.
pub fn generated_page(count: usize) -> String {
    let articles: String = (1..=count)
        .map(|i| {
            format!(
                r#"<article class="Box-row">
                     <h2><a href="/owner{i}/repo{i}">owner{i} / repo{i}</a></h2>
                     <p>Generated repository {i}</p>
                     <span itemprop="programmingLanguage">Go</span>
                     <a class="Link--muted" href="/owner{i}/repo{i}/stargazers">{i}00</a>
                   </article>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"Box\">{articles}</div></body></html>")
}

/// Answers exactly one HTTP request on a local port with `status` and `body`.
/// Returns the base URL to point a client at and a handle yielding the raw
/// request that was received.
pub async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
