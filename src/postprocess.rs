use crate::lexicon::lexicon;

const TRAILING_PUNCTUATION: &[char] = &['.', '!', '?', ',', ';'];

pub fn normalize_transcript(input: &str) -> String {
    let collapsed = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_lowercase();

    if collapsed.is_empty() {
        return String::new();
    }

    let without_prefix = strip_lead_in(&collapsed);
    strip_trailing_filler(without_prefix).to_string()
}

pub fn is_duplicate_transcript(previous: Option<&str>, current: &str) -> bool {
    let normalized_current = current.trim().to_lowercase();
    if normalized_current.is_empty() {
        return true;
    }

    previous
        .map(|value| value.trim().to_lowercase() == normalized_current)
        .unwrap_or(false)
}

fn strip_lead_in(text: &str) -> &str {
    for filler in &lexicon().lead_in_fillers {
        if let Some(rest) = text.strip_prefix(filler.as_str()) {
            if rest.is_empty() || rest.starts_with(|ch: char| !ch.is_alphanumeric()) {
                return rest.trim_start_matches(|ch: char| ch.is_whitespace() || ch == ',');
            }
        }
    }
    text
}

fn strip_trailing_filler(text: &str) -> &str {
    let body = text.trim_end_matches(|ch: char| ch.is_whitespace() || TRAILING_PUNCTUATION.contains(&ch));
    for filler in &lexicon().trailing_fillers {
        if let Some(rest) = body.strip_suffix(filler.as_str()) {
            if rest.is_empty() || rest.ends_with(|ch: char| !ch.is_alphanumeric()) {
                return rest
                    .trim_end_matches(|ch: char| ch.is_whitespace() || TRAILING_PUNCTUATION.contains(&ch));
            }
        }
    }
    text.trim()
}
