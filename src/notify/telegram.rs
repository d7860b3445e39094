use super::Notifier;
use crate::config::TelegramConfig;
use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Maximum characters Telegram accepts in one message
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Telegram Bot API notifier
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let bot_token = config
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NotifyError::NotConfigured("telegram.bot_token".to_string()))?;
        let chat_id = config
            .chat_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| NotifyError::NotConfigured("telegram.chat_id".to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    async fn send_chunk(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let message = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = self.client.post(&url).json(&message).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let chunks = split_message(text, TELEGRAM_MESSAGE_LIMIT);
        tracing::debug!("Sending report to Telegram in {} message(s)", chunks.len());

        for chunk in &chunks {
            self.send_chunk(chunk).await?;
        }
        Ok(())
    }
}

/// Separator the report uses between symbol links
const LINK_SEPARATOR: &str = ", ";

/// Split `text` into pieces of at most `limit` characters.
///
/// Breaks on line boundaries; an overlong line is broken between its
/// comma-separated links so no Markdown link is cut. A heading line
/// (starting with `*`) stays with the first chunk of the body after it.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        // An overlong body starts a fresh message together with its heading
        if line.chars().count() > limit
            && current.len() > 1
            && current.last().is_some_and(|last| is_heading(last))
        {
            if let Some(heading) = current.pop() {
                push_chunk(&mut chunks, current.concat());
                current.clear();
                current_len = heading.chars().count();
                current.push(heading);
            }
        }

        for piece in split_line(line, limit - current_len, limit) {
            let piece_len = piece.chars().count();

            if current_len + piece_len > limit {
                let heading = match current.last() {
                    Some(last) if is_heading(last) => current.pop(),
                    _ => None,
                };
                push_chunk(&mut chunks, current.concat());
                current.clear();
                current_len = 0;

                if let Some(heading) = heading {
                    let heading_len = heading.chars().count();
                    if heading_len + piece_len <= limit {
                        current_len = heading_len;
                        current.push(heading);
                    } else {
                        push_chunk(&mut chunks, heading);
                    }
                }
            }

            current_len += piece_len;
            current.push(piece);
        }
    }

    push_chunk(&mut chunks, current.concat());
    chunks
}

fn is_heading(line: &str) -> bool {
    line.starts_with('*')
}

// Telegram rejects blank messages
fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

/// Break one line into pieces; the first is at most `first_limit`
/// characters, the rest at most `limit`.
///
/// Pieces end on a link separator, which becomes a line break. Only a
/// single link longer than `limit` is cut by characters.
fn split_line(line: &str, first_limit: usize, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;
    let mut budget = first_limit;

    for part in line.split_inclusive(LINK_SEPARATOR) {
        let part_len = part.chars().count();

        if piece_len + part_len > budget {
            if !piece.is_empty() {
                pieces.push(end_piece(std::mem::take(&mut piece)));
            }
            piece_len = 0;
            budget = limit;
        }

        if part_len > limit {
            let chars: Vec<char> = part.chars().collect();
            pieces.extend(chars.chunks(limit).map(|c| c.iter().collect::<String>()));
            continue;
        }

        piece.push_str(part);
        piece_len += part_len;
    }

    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn end_piece(piece: String) -> String {
    match piece.strip_suffix(LINK_SEPARATOR) {
        Some(rest) => format!("{}\n", rest),
        None => piece,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("hello\nworld", 100), vec!["hello\nworld"]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_overlong_line_cut() {
        let chunks = split_message("abcdefgh", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    fn link_line(count: usize) -> String {
        (0..count)
            .map(|i| format!("[SYM{i}](https://www.bithumb.com/react/trade/order/SYM{i}-KRW)"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn test_long_link_line_split_between_links() {
        let text = format!("*Volume spike x1.5* (1h)\n{}\n", link_line(90));
        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
            let opened = chunk.matches('[').count();
            assert_eq!(chunk.matches("](").count(), opened);
            assert_eq!(chunk.matches("-KRW)").count(), opened);
        }
        assert!(chunks[0].starts_with("*Volume spike x1.5* (1h)\n[SYM0]("));

        let links: usize = chunks.iter().map(|c| c.matches("-KRW)").count()).sum();
        assert_eq!(links, 90);
        assert!(chunks.iter().any(|c| c.contains("[SYM89](")));
    }

    #[test]
    fn test_heading_moves_with_body() {
        let chunks = split_message("*A*\nxxxx\n\n*B*\nyyyy\n", 15);
        assert_eq!(chunks, vec!["*A*\nxxxx\n\n", "*B*\nyyyy\n"]);
    }

    #[test]
    fn test_heading_starts_message_for_long_body() {
        let text = format!("*Intro*\nsome text\n*Golden cross* (24h)\n{}\n", link_line(90));
        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);

        assert_eq!(chunks[0], "*Intro*\nsome text\n");
        assert!(chunks[1].starts_with("*Golden cross* (24h)\n[SYM0]("));
        assert!(chunks.iter().all(|c| c.ends_with('\n')));
    }

    #[test]
    fn test_missing_token_not_configured() {
        let result = TelegramNotifier::new(&TelegramConfig::default(), Duration::from_secs(5));
        assert!(matches!(result, Err(NotifyError::NotConfigured(_))));
    }
}
