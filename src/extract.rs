use crate::catalog::Catalog;
use crate::clause::split_clauses;
use crate::lexicon::{lexicon, starts_with_phrase, CommandKind, Lexicon};
use crate::operation::ParsedOperation;
use crate::postprocess::normalize_transcript;
use crate::quantity::{is_numeric_text, quantity_at};

pub fn extract_operations(transcript: &str) -> Vec<ParsedOperation> {
    extract_operations_with_names(transcript, &[])
}

/// Same as `extract_operations`, except that the tokenized item names in
/// `names` are always read as one fragment, stop words included.
pub fn extract_operations_with_names(
    transcript: &str,
    names: &[Vec<String>],
) -> Vec<ParsedOperation> {
    let normalized = normalize_transcript(transcript);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut operations = Vec::new();
    for clause in split_clauses(&normalized) {
        operations.extend(extract_clause(&clause, names));
    }

    if operations.is_empty() {
        operations.push(ParsedOperation::Unrecognized { text: normalized });
    }
    operations
}

/// Catalog names that would otherwise be cut apart at a stop word
/// ("Chicken with Rice"), tokenized and longest first.
pub fn guarded_item_names(catalog: &Catalog) -> Vec<Vec<String>> {
    let lex = lexicon();
    let mut names = catalog
        .items()
        .iter()
        .map(|item| tokenize(&item.name))
        .filter(|tokens| tokens.len() > 1 && tokens.iter().any(|token| lex.is_stop_word(token)))
        .collect::<Vec<_>>();
    names.sort_by(|a, b| b.len().cmp(&a.len()));
    names
}

/// Operations for one clause, in the order they were spoken.
pub fn extract_clause(clause: &str, names: &[Vec<String>]) -> Vec<ParsedOperation> {
    let lex = lexicon();
    let tokens = tokenize(clause);
    let mut operations = Vec::new();
    let mut segment: Vec<String> = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        if let Some((kind, length)) = command_at(lex, &tokens, index) {
            // "add more" only navigates when it ends the clause; "add more idli" is an add.
            let add_led_menu_phrase = kind == CommandKind::NavigateToMenu
                && lex.is_add_keyword(&tokens[index])
                && index + length < tokens.len();
            if !add_led_menu_phrase {
                operations.extend(scan_segment(lex, names, &segment));
                segment.clear();
                operations.push(command_operation(kind));
                index += length;
                continue;
            }
        }
        segment.push(tokens[index].clone());
        index += 1;
    }
    operations.extend(scan_segment(lex, names, &segment));

    operations
}

fn tokenize(clause: &str) -> Vec<String> {
    clause
        .split_whitespace()
        .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

fn command_at(lex: &Lexicon, tokens: &[String], index: usize) -> Option<(CommandKind, usize)> {
    lex.commands
        .iter()
        .find(|(phrase, _)| starts_with_phrase(tokens, index, phrase))
        .map(|(phrase, kind)| (*kind, phrase.len()))
}

fn name_at(names: &[Vec<String>], tokens: &[String], index: usize) -> Option<usize> {
    names
        .iter()
        .find(|name| starts_with_phrase(tokens, index, name))
        .map(|name| name.len())
}

fn command_operation(kind: CommandKind) -> ParsedOperation {
    match kind {
        CommandKind::StartCapture => ParsedOperation::StartCapture,
        CommandKind::StopCapture => ParsedOperation::StopCapture,
        CommandKind::NavigateToCart => ParsedOperation::NavigateToCart,
        CommandKind::NavigateToMenu => ParsedOperation::NavigateToMenu,
        CommandKind::Reset => ParsedOperation::Reset,
    }
}

fn scan_segment(lex: &Lexicon, names: &[Vec<String>], tokens: &[String]) -> Vec<ParsedOperation> {
    let mut operations = Vec::new();
    let mut leftover: Vec<&str> = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        if let Some(length) = lex.remove_keyword_at(tokens, index) {
            flush_bare_item(&mut leftover, &mut operations);
            index += length;
            let quantity = quantity_at(tokens, index).map(|(value, consumed)| {
                index += consumed;
                value
            });
            let (fragment, next) = collect_fragment(lex, names, tokens, index);
            index = skip_modifiers(lex, tokens, next);
            if !fragment.is_empty() {
                operations.push(ParsedOperation::Remove { fragment, quantity });
            }
            continue;
        }

        let token = tokens[index].as_str();
        if lex.is_add_keyword(token) {
            flush_bare_item(&mut leftover, &mut operations);
            index += 1;
            let quantity = match quantity_at(tokens, index) {
                Some((value, consumed)) => {
                    index += consumed;
                    value
                }
                None => 1,
            };
            let (fragment, next) = collect_fragment(lex, names, tokens, index);
            index = next;
            if !fragment.is_empty() {
                operations.push(ParsedOperation::Add { fragment, quantity });
            }
            continue;
        }

        if let Some((quantity, consumed)) = quantity_at(tokens, index) {
            flush_bare_item(&mut leftover, &mut operations);
            let (fragment, next) = collect_fragment(lex, names, tokens, index + consumed);
            index = next;
            if !fragment.is_empty() {
                operations.push(ParsedOperation::Add { fragment, quantity });
            }
            continue;
        }

        if let Some(length) = name_at(names, tokens, index) {
            leftover.extend(tokens[index..index + length].iter().map(String::as_str));
            index += length;
            continue;
        }

        if lex.is_stop_word(token) {
            flush_bare_item(&mut leftover, &mut operations);
        } else {
            leftover.push(token);
        }
        index += 1;
    }
    flush_bare_item(&mut leftover, &mut operations);

    operations
}

/// Collects an item fragment starting at `start`. Leading stop words
/// ("the", "of", "more") are skipped; collection ends at the next stop word
/// or quantity. Returns the fragment and the index after it.
fn collect_fragment<'a>(
    lex: &Lexicon,
    names: &[Vec<String>],
    tokens: &'a [String],
    start: usize,
) -> (String, usize) {
    let mut index = start;
    while index < tokens.len()
        && name_at(names, tokens, index).is_none()
        && is_skippable(lex, tokens, index)
    {
        index += 1;
    }

    let mut words: Vec<&'a str> = Vec::new();
    while index < tokens.len() {
        if let Some(length) = name_at(names, tokens, index) {
            words.extend(tokens[index..index + length].iter().map(String::as_str));
            index += length;
            continue;
        }
        let token = tokens[index].as_str();
        if lex.is_stop_word(token) || quantity_at(tokens, index).is_some() {
            break;
        }
        words.push(token);
        index += 1;
    }

    (words.join(" "), index)
}

fn is_skippable(lex: &Lexicon, tokens: &[String], index: usize) -> bool {
    let token = tokens[index].as_str();
    lex.is_stop_word(token)
        && !lex.is_add_keyword(token)
        && lex.remove_keyword_at(tokens, index).is_none()
}

/// After a removal, trailing words like "from my cart" belong to the removal
/// and must not be read as a new item.
fn skip_modifiers(lex: &Lexicon, tokens: &[String], start: usize) -> usize {
    let mut index = start;
    while index < tokens.len() {
        if lex.is_add_keyword(&tokens[index])
            || lex.remove_keyword_at(tokens, index).is_some()
            || quantity_at(tokens, index).is_some()
        {
            break;
        }
        index += 1;
    }
    index
}

fn flush_bare_item(leftover: &mut Vec<&str>, operations: &mut Vec<ParsedOperation>) {
    if leftover.is_empty() {
        return;
    }
    let fragment = leftover.join(" ");
    leftover.clear();
    if !is_numeric_text(&fragment) {
        operations.push(ParsedOperation::Add {
            fragment,
            quantity: 1,
        });
    }
}
