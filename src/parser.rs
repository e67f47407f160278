//! Free-text transaction entry parsing.
//!
//! A line is reduced to a small token stream after currency markers are
//! stripped: an optional leading `+` sign, standalone numbers, and the raw
//! text between them. Concatenating the tokens gives back the line, so
//! cutting out the amount (always the last number) leaves every other
//! character in place: `7-eleven 300` describes `7-eleven`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::models::{Direction, TransactionDraft};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    #[error("no amount found")]
    NoAmount,

    #[error("amount is not a number: {0}")]
    BadAmount(String),

    #[error("amount must be greater than zero: {0}")]
    NonPositive(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Sign,
    Number(&'a str),
    /// Verbatim text between numbers, whitespace and punctuation included.
    Text(&'a str),
}

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").expect("valid number pattern"))
}

// Letter currency markers only count when attached to a number.
fn currency_suffix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d)\s*(?:рублей|рубля|рубль|руб|rub|р|r)\b\.?")
            .expect("valid currency pattern")
    })
}

const CURRENCY_SYMBOLS: &[char] = &['₽', '$', '€'];

pub fn strip_currency(text: &str) -> String {
    let without_symbols = text.replace(CURRENCY_SYMBOLS, "");
    currency_suffix_pattern()
        .replace_all(&without_symbols, "${1}")
        .into_owned()
}

/// Split an already currency-stripped line into tokens.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text.trim();
    if let Some(stripped) = rest.strip_prefix('+') {
        tokens.push(Token::Sign);
        rest = stripped;
    }

    let mut cursor = 0;
    for m in number_pattern().find_iter(rest) {
        if m.start() > cursor {
            tokens.push(Token::Text(&rest[cursor..m.start()]));
        }
        tokens.push(Token::Number(m.as_str()));
        cursor = m.end();
    }
    if cursor < rest.len() {
        tokens.push(Token::Text(&rest[cursor..]));
    }
    tokens
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_amount(raw: &str) -> Result<f64, ParseFailure> {
    let amount: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| ParseFailure::BadAmount(raw.to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ParseFailure::NonPositive(raw.to_string()));
    }
    Ok(amount)
}

/// Parse one line such as `coffee 500` or `+salary 50000`.
pub fn parse_line(text: &str) -> Result<TransactionDraft, ParseFailure> {
    let cleaned = strip_currency(text);
    let tokens = tokenize(&cleaned);

    let direction = if tokens.first() == Some(&Token::Sign) {
        Direction::Income
    } else {
        Direction::Expense
    };

    let (amount_at, amount_text) = tokens
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, t)| match t {
            Token::Number(n) => Some((i, *n)),
            _ => None,
        })
        .ok_or(ParseFailure::NoAmount)?;
    let amount = parse_amount(amount_text)?;

    let remainder: String = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != amount_at)
        .filter_map(|(_, t)| match t {
            Token::Sign => None,
            Token::Number(s) | Token::Text(s) => Some(*s),
        })
        .collect();

    Ok(TransactionDraft {
        direction,
        description: collapse_whitespace(&remainder),
        amount,
    })
}

/// Drafts recovered from a multi-line message, plus the lines that failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub drafts: Vec<TransactionDraft>,
    pub rejected: Vec<String>,
}

/// Parse every non-blank line. Drafts keep input order; unreadable lines
/// are collected instead of failing the whole message.
pub fn parse_batch(text: &str) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Ok(draft) => outcome.drafts.push(draft),
            Err(e) => {
                debug!(line, error = %e, "skipping unparsed line");
                outcome.rejected.push(line.to_string());
            }
        }
    }
    outcome
}
