//! Line tokenizer for the DOT subset emitted by `terraform graph`.

use crate::error::{TfGraphError, TfGraphResult};

/// A lexical token of a single DOT line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A double-quoted string with `\"` and `\\` already unescaped.
    Quoted(String),
    /// A bare identifier or numeral.
    Ident(String),
    Arrow,
    UndirectedEdge,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Equals,
    Comma,
    Semicolon,
}

impl Token {
    /// The identifier text, if this token can name a node.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Token::Quoted(s) => Some(s),
            Token::Ident(s) if !is_keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the bare keyword `kw` (case-insensitive).
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }
}

pub fn is_keyword(s: &str) -> bool {
    ["node", "edge", "graph", "digraph", "subgraph", "strict"]
        .iter()
        .any(|kw| s.eq_ignore_ascii_case(kw))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Tokenize one line. `line_no` is 1-based and only used for error reporting.
pub fn tokenize_line(line: &str, line_no: usize) -> TfGraphResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '"' => tokens.push(Token::Quoted(read_quoted(&mut chars, line_no, pos)?)),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '{' => tokens.push(Token::LBrace),
            '}' => tokens.push(Token::RBrace),
            '=' => tokens.push(Token::Equals),
            ',' => tokens.push(Token::Comma),
            ';' => tokens.push(Token::Semicolon),
            '/' if matches!(chars.peek(), Some((_, '/'))) => break,
            '#' if tokens.is_empty() => break,
            '-' => match chars.peek() {
                Some((_, '>')) => {
                    chars.next();
                    tokens.push(Token::Arrow);
                }
                Some((_, '-')) => {
                    chars.next();
                    tokens.push(Token::UndirectedEdge);
                }
                _ => {
                    let mut ident = String::from('-');
                    while let Some((_, next)) = chars.peek() {
                        if !is_ident_char(*next) {
                            break;
                        }
                        ident.push(*next);
                        chars.next();
                    }
                    tokens.push(Token::Ident(ident));
                }
            },
            c if is_ident_char(c) => {
                let mut ident = String::from(c);
                while let Some((_, next)) = chars.peek() {
                    if !is_ident_char(*next) {
                        break;
                    }
                    ident.push(*next);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(TfGraphError::parse(
                    line_no,
                    format!("unexpected character '{}' at column {}", other, pos + 1),
                ));
            }
        }
    }

    Ok(tokens)
}

fn read_quoted(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    line_no: usize,
    start: usize,
) -> TfGraphResult<String> {
    let mut value = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(value),
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                // Graphviz escapes such as \n, \l and \N are kept verbatim.
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            other => value.push(other),
        }
    }

    Err(TfGraphError::parse(
        line_no,
        format!("unbalanced quote starting at column {}", start + 1),
    ))
}
