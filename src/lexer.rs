//! # Lexer
//!
//! Turns source text plus a [`LanguageEntry`] into a flat sequence of [`Token`]s.
//!
//! ## Algorithm
//!
//! A single left-to-right scan over the input's characters. Whitespace (space, tab, carriage
//! return) is skipped without producing a token; a newline produces a `NEWLINE` token so that
//! position tracking stays accurate even though the parser filters `NEWLINE` out before it ever
//! sees the stream (see [`Lexer::lex`] and [`strip_newlines`]). Every other character dispatches
//! into one of: a number run, a quoted string, an identifier/keyword run, a two-character
//! operator, a one-character operator or delimiter, or — if nothing matches — a single `UNKNOWN`
//! token. The lexer never aborts on bad input; `UNKNOWN` tokens are rejected downstream, by the
//! parser, as unexpected tokens.
//!
//! Keyword classification is entirely data-driven: an identifier-shaped lexeme is looked up in
//! the language entry's keyword map, and only becomes a keyword token if that language spells one
//! of the ten canonical keywords that way. Swapping the language entry never requires touching
//! this module.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::Position;
use crate::lang_table::{CanonicalKeyword, LanguageEntry};
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    lang: &'a LanguageEntry,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, lang: &'a LanguageEntry) -> Self {
        Self {
            chars: source.chars().peekable(),
            lang,
            line: 1,
            column: 1,
        }
    }

    /// Lex the entire input, returning tokens in reading order with a single trailing `EOF`.
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            match self.peek() {
                None => return Token::new(TokenKind::Eof, "", self.peek_position()),
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                    continue;
                }
                Some('\n') => {
                    let position = self.peek_position();
                    self.advance();
                    return Token::new(TokenKind::Newline, "\n", position);
                }
                Some('/') => {
                    // lookahead for a line comment without consuming a lone '/' as a token
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'/') {
                        self.skip_line_comment();
                        continue;
                    }
                    return self.scan_operator_or_delimiter();
                }
                Some(c) if c.is_ascii_digit() => return self.scan_number(),
                Some('"') | Some('\'') => return self.scan_string(),
                Some(c) if is_identifier_start(c) => return self.scan_identifier(),
                Some(_) => return self.scan_operator_or_delimiter(),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_number(&mut self) -> Token {
        let position = self.peek_position();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, text, position)
    }

    fn scan_string(&mut self) -> Token {
        let position = self.peek_position();
        let quote = self.advance().expect("caller confirmed a quote is next");
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                break;
            }
            if c == '\\' {
                raw.push(c);
                self.advance();
                if let Some(escaped) = self.advance() {
                    raw.push(escaped);
                }
                continue;
            }
            raw.push(c);
            self.advance();
        }
        // `unescape` decodes the standard escapes (`\n`, `\t`, `\\`, `\"`, `\'`, ...); a malformed
        // sequence just passes the raw text through rather than failing the whole token.
        let text = unescape::unescape(&raw).unwrap_or(raw);
        Token::new(TokenKind::String, text, position)
    }

    fn scan_identifier(&mut self) -> Token {
        let position = self.peek_position();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match self.lang.keyword_for(&text) {
            Some(CanonicalKeyword::If) => TokenKind::If,
            Some(CanonicalKeyword::Else) => TokenKind::Else,
            Some(CanonicalKeyword::While) => TokenKind::While,
            Some(CanonicalKeyword::For) => TokenKind::For,
            Some(CanonicalKeyword::Function) => TokenKind::Function,
            Some(CanonicalKeyword::Return) => TokenKind::Return,
            Some(CanonicalKeyword::Var) => TokenKind::Var,
            Some(CanonicalKeyword::True) => TokenKind::True,
            Some(CanonicalKeyword::False) => TokenKind::False,
            Some(CanonicalKeyword::Null) => TokenKind::Null,
            None => TokenKind::Identifier,
        };
        Token::new(kind, text, position)
    }

    fn scan_operator_or_delimiter(&mut self) -> Token {
        let position = self.peek_position();
        let first = self.advance().expect("caller confirmed a character is next");

        let two_char = self.peek().map(|second| (first, second));
        if let Some(kind) = two_char.and_then(|pair| two_char_operator(pair)) {
            self.advance();
            let text: String = [first, two_char.unwrap().1].iter().collect();
            return Token::new(kind, text, position);
        }

        let kind = match first {
            '=' => TokenKind::Assign,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multiply,
            '/' => TokenKind::Divide,
            '%' => TokenKind::Modulo,
            '!' => TokenKind::Not,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            _ => TokenKind::Unknown,
        };
        Token::new(kind, first.to_string(), position)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn two_char_operator(pair: (char, char)) -> Option<TokenKind> {
    match pair {
        ('=', '=') => Some(TokenKind::Equal),
        ('!', '=') => Some(TokenKind::NotEqual),
        ('<', '=') => Some(TokenKind::LessEqual),
        ('>', '=') => Some(TokenKind::GreaterEqual),
        ('&', '&') => Some(TokenKind::And),
        ('|', '|') => Some(TokenKind::Or),
        _ => None,
    }
}

/// Drop `NEWLINE` tokens before handing the stream to the parser; they exist only so lexer
/// positions stay accurate, and the grammar never references them.
pub fn strip_newlines(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Newline)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang_table;

    fn lex(source: &str) -> Vec<Token> {
        let lang = lang_table::lookup("en").unwrap();
        Lexer::new(source, lang).lex()
    }

    #[test]
    fn lexes_a_var_decl() {
        let tokens = lex("var x = 10;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_classification_is_exact_for_the_selected_language() {
        let tokens = lex("if");
        assert_eq!(tokens[0].kind, TokenKind::If);

        let lang = lang_table::lookup("hi").unwrap();
        let tokens = Lexer::new("if", lang).lex();
        // "if" is not how Hindi spells the keyword, so it must lex as a plain identifier.
        assert_eq!(tokens[0].kind, TokenKind::Identifier);

        let tokens = Lexer::new("agar", lang).lex();
        assert_eq!(tokens[0].kind, TokenKind::If);
    }

    #[test]
    fn two_char_operators_win_over_one_char_prefixes() {
        let tokens = lex("<= < ==");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LessEqual,
                TokenKind::LessThan,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes_are_decoded() {
        let tokens = lex(r#""a\nb\"c""#);
        assert_eq!(tokens[0].text, "a\nb\"c");
    }

    #[test]
    fn unrecognized_character_becomes_unknown_token() {
        let tokens = lex("@");
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
    }

    #[test]
    fn line_comment_is_discarded() {
        let tokens = lex("var x = 1; // trailing note\nvar y = 2;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::Divide));
    }

    #[test]
    fn positions_are_one_based_and_track_lines() {
        let tokens = lex("var x;\nvar y;");
        // the second `var` starts on line 2, column 1
        let second_var = &tokens[3];
        assert_eq!(second_var.kind, TokenKind::Var);
        assert_eq!(second_var.position.line, 2);
        assert_eq!(second_var.position.column, 1);
    }

    #[test]
    fn newline_tokens_are_filtered_before_parsing() {
        let tokens = lex("var x;\nvar y;");
        let stripped = strip_newlines(tokens);
        assert!(stripped.iter().all(|t| t.kind != TokenKind::Newline));
    }
}
