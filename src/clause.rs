use crate::lexicon::lexicon;
use crate::postprocess::normalize_transcript;

const SENTENCE_BREAKS: &[char] = &['.', '!', '?'];
const LIST_BREAKS: &[char] = &[',', ';'];

/// Each clause is normalized again so "give me" opening a second sentence is
/// stripped too.
pub fn split_clauses(text: &str) -> Vec<String> {
    let separators = &lexicon().clause_separators;
    let mut clauses = Vec::new();

    for sentence in text.split(SENTENCE_BREAKS) {
        for piece in sentence.split(LIST_BREAKS) {
            let mut current: Vec<&str> = Vec::new();
            for word in piece.split_whitespace() {
                if separators.contains(word) {
                    push_clause(&mut clauses, &current);
                    current.clear();
                } else {
                    current.push(word);
                }
            }
            push_clause(&mut clauses, &current);
        }
    }

    clauses
}

fn push_clause(clauses: &mut Vec<String>, words: &[&str]) {
    if words.is_empty() {
        return;
    }
    let clause = normalize_transcript(&words.join(" "));
    if !clause.is_empty() {
        clauses.push(clause);
    }
}
