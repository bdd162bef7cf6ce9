//! Chat-export parser.
//!
//! A transcript line either opens a new message (*message line*) or
//! continues the previous one (*continuation*). Message lines are
//! recognized by a single regex (`fancy-regex`, needed for the
//! tilde-wrapper backreference — see design notes: the regex literal isn't
//! the contract, the grammar in this module's doc comment is). A line that
//! doesn't match is folded into the current message's content, original
//! line breaks preserved.

use crate::chat_data::{Chat, ChatName, Message};
use crate::file_id::FileId;
use fancy_regex::Regex;
use std::sync::OnceLock;

fn message_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\u{200E}?\[(?P<timestamp>[^\]]*)\] (?P<tilde>~ )?(?P<sender>[^:]*): \u{200E}?(?:(?P=tilde))?(?P<content>.*)$",
        )
        .expect("message-line grammar is a valid regex")
    })
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year pattern is a valid regex"))
}

fn media_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<(?:\p{L}{1,20}(?: \p{L}{1,20}){0,2}): (?P<filename>[^>]+)>")
            .expect("media-reference pattern is a valid regex")
    })
}

struct ParsedLine<'a> {
    timestamp: &'a str,
    sender: &'a str,
    content: &'a str,
    year: i32,
}

/// Classify a single line. `None` means it's a continuation — this includes
/// lines with the right bracket/sender/colon shape but no extractable year,
/// since the grammar's TIMESTAMP only matches a span that contains one
/// (§4.3): such lines are not message lines at all, just lines that happen
/// to look like one.
fn match_message_line(line: &str) -> Option<ParsedLine<'_>> {
    let caps = message_line_regex().captures(line).ok().flatten()?;
    let timestamp = caps.name("timestamp")?.as_str();
    let year = extract_year(timestamp)?;
    Some(ParsedLine {
        timestamp,
        sender: caps.name("sender")?.as_str(),
        content: caps.name("content")?.as_str(),
        year,
    })
}

/// Extract the year from a verbatim timestamp string. Returns `None` if no
/// 4-digit year in `[1900, 2099]` is present — callers reject the
/// transcript line in that case since the grammar requires one.
fn extract_year(timestamp: &str) -> Option<i32> {
    let caps = year_regex().captures(timestamp).ok().flatten()?;
    caps.get(1)?.as_str().parse().ok()
}

/// Strip and return a media reference from assembled message content, if
/// present. Only the first match is honored (content is searched once).
fn extract_media_reference(content: &str) -> (String, Option<String>) {
    match media_reference_regex().captures(content) {
        Ok(Some(caps)) => {
            let whole = caps.get(0).unwrap();
            let filename = caps.name("filename").unwrap().as_str().to_string();
            let mut stripped = String::with_capacity(content.len());
            stripped.push_str(&content[..whole.start()]);
            stripped.push_str(&content[whole.end()..]);
            (stripped.trim().to_string(), Some(filename))
        }
        _ => (content.to_string(), None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("first line of transcript is not a message line")]
    FirstLineNotMessage,
}

/// Parse a `_chat.txt` transcript into a [`Chat`]. The chat name is adopted
/// from the sender of the first message line (WhatsApp's synthetic
/// system-notice first line carries the conversation's display name there).
pub fn parse_transcript(text: &str, input_file_id: FileId) -> Result<Chat, ParseError> {
    let mut lines = text.split('\n');
    let first_line = lines.next().unwrap_or("");
    let first = match_message_line(first_line).ok_or(ParseError::FirstLineNotMessage)?;

    let chat_name = ChatName::new(first.sender.to_string());
    let mut chat = Chat::new(chat_name);

    let push_current = |chat: &mut Chat, current: Option<(String, String, String, i32)>| {
        if let Some((timestamp, sender, content, year)) = current {
            let (content, media_name) = extract_media_reference(&content);
            chat.messages.push(Message {
                timestamp,
                sender,
                content,
                year,
                input_file_id: input_file_id.clone(),
                media_name,
            });
        }
    };

    let mut current = Some((
        first.timestamp.to_string(),
        first.sender.to_string(),
        first.content.to_string(),
        first.year,
    ));

    for line in lines {
        match match_message_line(line) {
            Some(parsed) => {
                push_current(&mut chat, current.take());
                current = Some((
                    parsed.timestamp.to_string(),
                    parsed.sender.to_string(),
                    parsed.content.to_string(),
                    parsed.year,
                ));
            }
            None => {
                if let Some((_, _, content, _)) = current.as_mut() {
                    content.push('\n');
                    content.push_str(line);
                }
            }
        }
    }
    push_current(&mut chat, current.take());

    Ok(chat)
}
