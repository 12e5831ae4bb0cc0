//! Line-oriented lexical classification for syntax highlighting.
//!
//! Each line is classified independently by trying a fixed list of rules at
//! the current position and taking the first one that matches. The result
//! always covers the whole line, so unknown input degrades to `Default`
//! tokens instead of failing.

use tracing::trace;

use super::vocabulary::is_command;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    String,
    NumberHex,
    NumberBinary,
    NumberFloat,
    NumberInt,
    Keyword,
    Identifier,
    Default,
}

impl TokenKind {
    /// Highlighting scope name, as used by TextMate-style themes.
    pub fn scope(&self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::String => "string",
            TokenKind::NumberHex => "number.hex",
            TokenKind::NumberBinary => "number.binary",
            TokenKind::NumberFloat => "number.float",
            TokenKind::NumberInt => "number",
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Default => "",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            TokenKind::NumberHex
                | TokenKind::NumberBinary
                | TokenKind::NumberFloat
                | TokenKind::NumberInt
        )
    }
}

/// A classified span of one line. `start` and `end` are character columns,
/// `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The text this token covers within `line`.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        let byte_at = |column: usize| {
            line.char_indices()
                .nth(column)
                .map_or(line.len(), |(offset, _)| offset)
        };
        &line[byte_at(self.start)..byte_at(self.end)]
    }
}

/// A highlighting provider that works one line at a time.
pub trait LineTokenizer: Send + Sync {
    fn tokenize_line(&self, line: &str) -> Vec<Token>;
}

/// The Stacky tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackyTokenizer;

impl LineTokenizer for StackyTokenizer {
    fn tokenize_line(&self, line: &str) -> Vec<Token> {
        tokenize_line(line)
    }
}

/// Classify `line` into tokens covering every character of it.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let (kind, len) = match_rule(&chars[pos..]);
        tokens.push(Token { start: pos, end: pos + len, kind });
        pos += len;
    }

    trace!("Tokenized {:?} into {} tokens", line, tokens.len());
    tokens
}

/// Tokenize every line of `text`, pairing each token with its 0-based line.
pub fn tokenize_document(text: &str) -> Vec<(u32, Token)> {
    text.lines()
        .enumerate()
        .flat_map(|(line_number, line)| {
            tokenize_line(line)
                .into_iter()
                .map(move |token| (line_number as u32, token))
        })
        .collect()
}

/// Apply the first matching rule to the start of `rest`, returning the kind
/// and length in characters. `rest` is never empty.
fn match_rule(rest: &[char]) -> (TokenKind, usize) {
    if rest[0] == ';' {
        return (TokenKind::Comment, rest.len());
    }

    if let Some(len) = scan_string(rest) {
        return (TokenKind::String, len);
    }

    if let Some(len) = scan_radix(rest, 'x', |c| c.is_ascii_hexdigit()) {
        return (TokenKind::NumberHex, len);
    }

    if let Some(len) = scan_radix(rest, 'b', |c| c == '0' || c == '1') {
        return (TokenKind::NumberBinary, len);
    }

    let digits = count_while(rest, |c| c.is_ascii_digit());
    if digits > 0 {
        if rest.get(digits) == Some(&'.') {
            let fraction = count_while(&rest[digits + 1..], |c| c.is_ascii_digit());
            if fraction > 0 {
                return (TokenKind::NumberFloat, digits + 1 + fraction);
            }
        }
        return (TokenKind::NumberInt, digits);
    }

    if is_word_start(rest[0]) {
        let len = 1 + count_while(&rest[1..], is_word_char);
        let word: String = rest[..len].iter().collect();
        let kind = if is_command(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        return (kind, len);
    }

    (TokenKind::Default, 1)
}

/// A double-quoted string with backslash escapes. Unterminated strings do
/// not match.
fn scan_string(rest: &[char]) -> Option<usize> {
    if rest[0] != '"' {
        return None;
    }

    let mut i = 1;
    loop {
        match *rest.get(i)? {
            '"' => return Some(i + 1),
            '\\' => {
                rest.get(i + 1)?;
                i += 2;
            }
            _ => i += 1,
        }
    }
}

/// `0` + marker (either case) + one or more digits accepted by `is_digit`.
fn scan_radix(rest: &[char], marker: char, is_digit: impl Fn(char) -> bool) -> Option<usize> {
    match rest {
        ['0', m, ..] if m.to_ascii_lowercase() == marker => {
            let digits = count_while(&rest[2..], is_digit);
            (digits > 0).then_some(2 + digits)
        }
        _ => None,
    }
}

fn count_while(chars: &[char], predicate: impl Fn(char) -> bool) -> usize {
    chars.iter().take_while(|&&c| predicate(c)).count()
}

pub(crate) fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
