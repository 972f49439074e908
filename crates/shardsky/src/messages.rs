//! Host messages arriving on stdin.
//!
//! One JSON object per line, e.g.
//! `{"type":"color-change","color1":"#0891B2","color2":"#7C3AED"}`.
//! The reader runs on its own thread and hands every decoded message to the
//! event loop; the render session is only ever touched from there.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use serde::Deserialize;
use winit::event_loop::EventLoopProxy;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostMessage {
    ColorChange { color1: String, color2: String },
}

/// Events injected into the winit loop from outside the window system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Host(HostMessage),
    /// The message source reached end of input.
    InputClosed,
}

/// Decodes one line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<HostMessage>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Feeds every decodable line of `reader` to `deliver` until EOF, a read
/// error, or `deliver` returning `false`. Returns the number delivered.
pub fn pump_messages<R, F>(reader: R, mut deliver: F) -> usize
where
    R: BufRead,
    F: FnMut(HostMessage) -> bool,
{
    let mut delivered = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read host message stream");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(message)) => {
                tracing::debug!(line = index + 1, ?message, "host message received");
                if !deliver(message) {
                    break;
                }
                delivered += 1;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "skipping malformed host message");
            }
        }
    }
    delivered
}

/// Spawns the stdin reader. It exits on EOF or once the event loop is gone.
pub fn spawn_stdin_reader(proxy: EventLoopProxy<UserEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("shardsky-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            let delivered = pump_messages(stdin.lock(), |message| {
                proxy.send_event(UserEvent::Host(message)).is_ok()
            });
            tracing::debug!(delivered, "host message stream closed");
            let _ = proxy.send_event(UserEvent::InputClosed);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_color_change() {
        let message = parse_line(r##"{"type":"color-change","color1":"#0891B2","color2":"#7C3AED"}"##)
            .unwrap()
            .unwrap();
        assert_eq!(
            message,
            HostMessage::ColorChange {
                color1: "#0891B2".into(),
                color2: "#7C3AED".into(),
            }
        );
    }

    #[test]
    fn blank_lines_are_ignored_and_unknown_types_rejected() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert!(parse_line(r#"{"type":"shutdown"}"#).is_err());
        assert!(parse_line(r##"{"type":"color-change","color1":"#fff"}"##).is_err());
        assert!(parse_line("not json").is_err());
    }

    #[test]
    fn pump_skips_garbage_and_keeps_going() {
        let input = concat!(
            "{\"type\":\"color-change\",\"color1\":\"#000000\",\"color2\":\"#FFFFFF\"}\n",
            "garbage\n",
            "\n",
            "{\"type\":\"color-change\",\"color1\":\"nope\",\"color2\":\"#123456\"}\n",
        );
        let mut seen = Vec::new();
        let delivered = pump_messages(Cursor::new(input), |message| {
            seen.push(message);
            true
        });
        assert_eq!(delivered, 2);
        assert_eq!(
            seen[1],
            HostMessage::ColorChange {
                color1: "nope".into(),
                color2: "#123456".into(),
            }
        );
    }

    #[test]
    fn pump_stops_when_receiver_is_gone() {
        let input = "{\"type\":\"color-change\",\"color1\":\"#000000\",\"color2\":\"#FFFFFF\"}\n".repeat(3);
        let mut calls = 0;
        let delivered = pump_messages(Cursor::new(input), |_| {
            calls += 1;
            false
        });
        assert_eq!(delivered, 0);
        assert_eq!(calls, 1);
    }
}
