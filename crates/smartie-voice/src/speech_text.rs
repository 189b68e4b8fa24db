//! Text preparation for speech synthesis.
//!
//! Bot answers are written for the screen: they carry markdown, emoji,
//! code, and typographic quotes. [`prepare_for_speech`] reduces them to the
//! plain sentences a synthesizer should read aloud.

/// Reduce `text` to plain speakable sentences.
///
/// - Emoji and pictographs are removed
/// - Fenced code blocks are removed entirely; inline code is unwrapped
/// - Headers, list markers, blockquotes and emphasis are stripped
/// - Links keep their text; images are removed
/// - Typographic quotes (“ ” ‘ ’) are removed
/// - Line breaks become sentence breaks
///
/// Returns an empty string when nothing speakable remains.
#[must_use]
pub fn prepare_for_speech(text: &str) -> String {
    let text = remove_emoji(text);

    let mut sentences: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block || is_horizontal_rule(trimmed) {
            continue;
        }

        let plain = collapse_whitespace(&strip_line_markup(trimmed));
        if !plain.is_empty() {
            sentences.push(plain);
        }
    }

    let mut spoken = String::new();
    for sentence in sentences {
        if !spoken.is_empty() {
            if !spoken.ends_with(['.', '!', '?', ':', ';']) {
                spoken.push('.');
            }
            spoken.push(' ');
        }
        spoken.push_str(&sentence);
    }
    spoken
}

// ── Internal helpers ───────────────────────────────────────────────

/// Whether `c` falls in one of the emoji / pictograph / dingbat blocks.
const fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F   // emoticons
            | 0x1F300..=0x1F5FF // symbols & pictographs
            | 0x1F680..=0x1F6FF // transport & map
            | 0x1F1E0..=0x1F1FF // flags
            | 0x1F900..=0x1F9FF // supplemental symbols
            | 0x2600..=0x26FF   // misc symbols
            | 0x2702..=0x27B0   // dingbats
            | 0xFE0F            // variation selector
            | 0x200D            // zero-width joiner
    )
}

fn remove_emoji(text: &str) -> String {
    text.chars().filter(|&c| !is_emoji(c)).collect()
}

fn is_horizontal_rule(line: &str) -> bool {
    let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    chars.len() >= 3
        && matches!(chars[0], '-' | '*' | '_')
        && chars.iter().all(|&c| c == chars[0])
}

fn strip_line_markup(line: &str) -> String {
    let mut s = line;
    while let Some(rest) = s.strip_prefix('>') {
        s = rest.trim_start();
    }
    if s.starts_with('#') {
        s = s.trim_start_matches('#').trim_start();
    }
    let s = strip_list_marker(s);
    let s = strip_links_and_images(s);
    s.replace('`', "")
        .replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .chars()
        .filter(|c| !matches!(c, '*' | '“' | '”' | '‘' | '’'))
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
    {
        return rest;
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let after = &line[digits..];
        if let Some(rest) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            return rest;
        }
    }
    line
}

/// `[text](url)` becomes `text`; `![alt](url)` is dropped.
fn strip_links_and_images(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let is_image = rest[..open].ends_with('!');
        let before = if is_image { &rest[..open - 1] } else { &rest[..open] };

        let parsed = rest[open + 1..].find("](").and_then(|close| {
            let label_end = open + 1 + close;
            let url_start = label_end + 2;
            rest[url_start..]
                .find(')')
                .map(|url_len| (label_end, url_start + url_len + 1))
        });

        match parsed {
            Some((label_end, consumed)) => {
                result.push_str(before);
                if !is_image {
                    result.push_str(&rest[open + 1..label_end]);
                }
                rest = &rest[consumed..];
            }
            None => {
                result.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }

    result.push_str(rest);
    result
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
