use std::collections::HashMap;
use std::sync::OnceLock;

pub const MAX_WORD_QUANTITY: u32 = 50;

const UNITS: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [(&str, u32); 8] = [
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

static NUMBER_WORDS: OnceLock<HashMap<String, u32>> = OnceLock::new();

fn number_words() -> &'static HashMap<String, u32> {
    NUMBER_WORDS.get_or_init(build_number_words)
}

fn build_number_words() -> HashMap<String, u32> {
    let mut table = HashMap::new();
    for (value, word) in UNITS.iter().enumerate() {
        table.insert((*word).to_string(), value as u32);
    }
    for (word, value) in TENS {
        table.insert(word.to_string(), value);
        if value >= MAX_WORD_QUANTITY {
            continue;
        }
        for unit in 1..=9 {
            let compound = value + unit;
            if compound > MAX_WORD_QUANTITY {
                break;
            }
            let unit_word = UNITS[unit as usize];
            table.insert(format!("{word}-{unit_word}"), compound);
            table.insert(format!("{word} {unit_word}"), compound);
        }
    }
    table
}

pub fn parse_quantity(token: &str) -> Option<u32> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }
    number_words().get(&trimmed.to_lowercase()).copied()
}

/// Value and tokens consumed; "twenty one" wins over "twenty".
pub fn quantity_at<S: AsRef<str>>(tokens: &[S], index: usize) -> Option<(u32, usize)> {
    let first = tokens.get(index)?.as_ref();
    if let Some(second) = tokens.get(index + 1) {
        let joined = format!("{} {}", first, second.as_ref());
        if let Some(value) = number_words().get(&joined.to_lowercase()) {
            return Some((*value, 2));
        }
    }
    parse_quantity(first).map(|value| (value, 1))
}

pub fn is_numeric_text(text: &str) -> bool {
    let mut tokens = text.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(|token| {
        parse_quantity(token).is_some() || token.chars().all(|ch| ch.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_digits_and_words() {
        assert_eq!(parse_quantity("20"), Some(20));
        assert_eq!(parse_quantity("twenty-one"), Some(21));
        assert_eq!(parse_quantity("Twelve"), Some(12));
        assert_eq!(parse_quantity("zero"), Some(0));
        assert_eq!(parse_quantity("fifty"), Some(50));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(parse_quantity("xyz"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("-3"), None);
        assert_eq!(parse_quantity("fifty-one"), None);
    }

    #[test]
    fn stores_both_compound_spellings() {
        assert_eq!(parse_quantity("forty seven"), Some(47));
        assert_eq!(parse_quantity("forty-seven"), Some(47));
        assert_eq!(parse_quantity("thirty-nine"), Some(39));
    }

    #[test]
    fn prefers_spaced_compound_over_single_token() {
        let tokens = ["twenty", "one", "idli"];
        assert_eq!(quantity_at(&tokens, 0), Some((21, 2)));
        assert_eq!(quantity_at(&tokens, 1), Some((1, 1)));
        assert_eq!(quantity_at(&tokens, 2), None);
        assert_eq!(quantity_at(&tokens, 3), None);
    }

    #[test]
    fn detects_purely_numeric_text() {
        assert!(is_numeric_text("3"));
        assert!(is_numeric_text("two 4"));
        assert!(is_numeric_text("99999999999"));
        assert!(!is_numeric_text("2 idli"));
        assert!(!is_numeric_text(""));
    }
}
