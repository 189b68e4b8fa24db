//! Terminal rendering of transcript entries.

use std::fmt::Write as _;

use smartie_core::{Message, Sender};

/// Render one entry as `[index] speaker: text` followed by its sources.
pub fn format_message(index: usize, message: &Message, user_name: &str) -> String {
    let speaker = match message.sender {
        Sender::User if message.is_voice_origin => format!("{user_name} (voice)"),
        Sender::User => user_name.to_string(),
        Sender::Bot => "smartie".to_string(),
    };

    let mut out = format!("[{index}] {speaker}: {}", message.text);
    for citation in &message.citations {
        let _ = write!(out, "\n      [{}] {}", citation.label, citation.url);
    }
    out
}
