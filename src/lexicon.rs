use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

const EMBEDDED_LEXICON: &str = include_str!("../data/lexicon.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    StartCapture,
    StopCapture,
    NavigateToCart,
    NavigateToMenu,
    Reset,
}

#[derive(Debug, Deserialize)]
struct LexiconJson {
    lead_in_fillers: Vec<String>,
    trailing_fillers: Vec<String>,
    clause_separators: Vec<String>,
    commands: CommandTableJson,
    add_keywords: Vec<String>,
    remove_keywords: Vec<String>,
    stop_words: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CommandTableJson {
    start_capture: Vec<String>,
    stop_capture: Vec<String>,
    navigate_to_cart: Vec<String>,
    navigate_to_menu: Vec<String>,
    reset: Vec<String>,
}

#[derive(Debug)]
pub struct Lexicon {
    /// Sorted longest-first so "i would like" wins over "i want"-style overlaps.
    pub lead_in_fillers: Vec<String>,
    pub trailing_fillers: Vec<String>,
    pub clause_separators: HashSet<String>,
    /// (phrase tokens, command), longest phrase first.
    pub commands: Vec<(Vec<String>, CommandKind)>,
    pub add_keywords: HashSet<String>,
    /// Phrase tokens, longest first ("take off" is two tokens).
    pub remove_keywords: Vec<Vec<String>>,
    pub stop_words: HashSet<String>,
}

impl Lexicon {
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn is_add_keyword(&self, token: &str) -> bool {
        self.add_keywords.contains(token)
    }

    /// Token length of the remove keyword starting at `index`, if any.
    pub fn remove_keyword_at(&self, tokens: &[String], index: usize) -> Option<usize> {
        self.remove_keywords
            .iter()
            .find(|phrase| starts_with_phrase(tokens, index, phrase))
            .map(|phrase| phrase.len())
    }
}

static LEXICON: OnceLock<Lexicon> = OnceLock::new();

pub fn lexicon() -> &'static Lexicon {
    LEXICON.get_or_init(|| {
        parse_lexicon(EMBEDDED_LEXICON).expect("embedded lexicon.json must parse")
    })
}

fn parse_lexicon(json: &str) -> Result<Lexicon, serde_json::Error> {
    let raw: LexiconJson = serde_json::from_str(json)?;

    let mut commands = Vec::new();
    let tables = [
        (raw.commands.start_capture, CommandKind::StartCapture),
        (raw.commands.stop_capture, CommandKind::StopCapture),
        (raw.commands.navigate_to_cart, CommandKind::NavigateToCart),
        (raw.commands.navigate_to_menu, CommandKind::NavigateToMenu),
        (raw.commands.reset, CommandKind::Reset),
    ];
    for (phrases, kind) in tables {
        for phrase in phrases {
            commands.push((tokenize_phrase(&phrase), kind));
        }
    }
    commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    Ok(Lexicon {
        lead_in_fillers: longest_first(raw.lead_in_fillers),
        trailing_fillers: longest_first(raw.trailing_fillers),
        clause_separators: lowercase_set(raw.clause_separators),
        commands,
        add_keywords: lowercase_set(raw.add_keywords),
        remove_keywords: phrases_longest_first(raw.remove_keywords),
        stop_words: lowercase_set(raw.stop_words),
    })
}

pub fn starts_with_phrase(tokens: &[String], index: usize, phrase: &[String]) -> bool {
    let end = index + phrase.len();
    !phrase.is_empty() && end <= tokens.len() && tokens[index..end] == phrase[..]
}

fn phrases_longest_first(phrases: Vec<String>) -> Vec<Vec<String>> {
    let mut tokenized = phrases
        .iter()
        .map(|phrase| tokenize_phrase(phrase))
        .filter(|tokens| !tokens.is_empty())
        .collect::<Vec<_>>();
    tokenized.sort_by(|a, b| b.len().cmp(&a.len()));
    tokenized
}

fn tokenize_phrase(phrase: &str) -> Vec<String> {
    phrase
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

fn longest_first(mut phrases: Vec<String>) -> Vec<String> {
    for phrase in &mut phrases {
        *phrase = phrase.to_lowercase();
    }
    phrases.sort_by(|a, b| b.len().cmp(&a.len()));
    phrases
}

fn lowercase_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().map(|word| word.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_lexicon_parses() {
        assert!(parse_lexicon(EMBEDDED_LEXICON).is_ok());
    }

    #[test]
    fn command_phrases_are_longest_first() {
        let lex = lexicon();
        let lengths = lex
            .commands
            .iter()
            .map(|(tokens, _)| tokens.len())
            .collect::<Vec<_>>();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn keywords_are_also_stop_words() {
        let lex = lexicon();
        let remove_tokens = lex.remove_keywords.iter().flatten();
        for keyword in lex.add_keywords.iter().chain(remove_tokens) {
            assert!(lex.is_stop_word(keyword), "{keyword} should stop a fragment");
        }
    }

    #[test]
    fn matches_single_and_two_token_remove_keywords() {
        let lex = lexicon();
        let tokens = ["take", "off", "the", "cancel", "dosa"]
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>();
        assert_eq!(lex.remove_keyword_at(&tokens, 0), Some(2));
        assert_eq!(lex.remove_keyword_at(&tokens, 1), None);
        assert_eq!(lex.remove_keyword_at(&tokens, 3), Some(1));
        assert_eq!(lex.remove_keyword_at(&tokens, 4), None);
    }

    #[test]
    fn knows_reset_phrases() {
        let lex = lexicon();
        assert!(lex
            .commands
            .iter()
            .any(|(tokens, kind)| tokens == &["start", "over"] && *kind == CommandKind::Reset));
    }
}
