//! T-SQL tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes T-SQL input.
#[derive(Clone)]
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// 1-based line number at `pos`.
    line: u32,
    /// Line number at `start`.
    start_line: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.advance();
            }

            // Single-line comments (-- ...)
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                self.advance();
                self.advance();
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // Multi-line comments (/* ... */)
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a span from start to current position.
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans an identifier or keyword.
    ///
    /// Temp-table names (`#t`, `##g`) lex as identifiers keeping their
    /// leading hashes.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c == '#') {
            self.advance();
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a variable reference (`@name` or `@@name`).
    ///
    /// The produced token keeps its `@` / `@@` prefix; the environment
    /// treats the prefixed form as the canonical name.
    fn scan_variable(&mut self) -> Token {
        self.advance(); // first @
        if self.peek() == Some('@') {
            self.advance();
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        if text.trim_start_matches('@').is_empty() {
            return self.make_token(TokenKind::Error(String::from("Empty variable name")));
        }
        self.make_token(TokenKind::Variable(String::from(text)))
    }

    /// Scans a bracketed identifier (`[column name]`).
    fn scan_bracketed_identifier(&mut self) -> Token {
        self.advance(); // consume [
        let content_start = self.pos;

        loop {
            match self.peek() {
                Some(']') => break,
                Some(_) => {
                    self.advance();
                }
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated bracketed identifier",
                    )));
                }
            }
        }

        let content = String::from(&self.input[content_start..self.pos]);
        self.advance(); // consume ]
        self.make_token(TokenKind::Identifier(content))
    }

    /// Scans a number (integer, float, or `0x...` binary literal).
    fn scan_number(&mut self) -> Token {
        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x' | 'X')) {
            return self.scan_hex_literal();
        }

        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];

        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid float: {e}"))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid integer: {e}"))),
            }
        }
    }

    /// Scans a `0x...` binary literal.
    fn scan_hex_literal(&mut self) -> Token {
        self.advance(); // 0
        self.advance(); // x

        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
        }

        let digits = &self.input[digits_start..self.pos];
        if digits.len() % 2 != 0 {
            return self.make_token(TokenKind::Error(String::from(
                "Odd number of hex digits in binary literal",
            )));
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .filter_map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
            .collect();
        self.make_token(TokenKind::Binary(bytes))
    }

    /// Scans a string literal (`'...'` with `''` escapes).
    fn scan_string(&mut self) -> Token {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        value.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }

        self.advance(); // consume closing quote
        self.make_token(TokenKind::String(value))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;
        self.start_line = self.line;

        let c = match self.peek() {
            Some(c) => c,
            None => return self.make_token(TokenKind::Eof),
        };

        match c {
            '(' => {
                self.advance();
                self.make_token(TokenKind::LeftParen)
            }
            ')' => {
                self.advance();
                self.make_token(TokenKind::RightParen)
            }
            ',' => {
                self.advance();
                self.make_token(TokenKind::Comma)
            }
            ';' => {
                self.advance();
                self.make_token(TokenKind::Semicolon)
            }
            '.' => {
                self.advance();
                self.make_token(TokenKind::Dot)
            }
            '+' => {
                self.advance();
                self.make_token(TokenKind::Plus)
            }
            '-' => {
                self.advance();
                self.make_token(TokenKind::Minus)
            }
            '*' => {
                self.advance();
                self.make_token(TokenKind::Star)
            }
            '/' => {
                self.advance();
                self.make_token(TokenKind::Slash)
            }
            '%' => {
                self.advance();
                self.make_token(TokenKind::Percent)
            }
            '=' => {
                self.advance();
                self.make_token(TokenKind::Eq)
            }
            '<' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: !")))
                }
            }

            '\'' => self.scan_string(),

            // N'...' Unicode string literal
            'N' if self.peek_next() == Some('\'') => {
                self.advance(); // consume N
                self.start = self.pos;
                self.scan_string()
            }

            '@' => self.scan_variable(),
            '[' => self.scan_bracketed_identifier(),
            '#' => self.scan_identifier(),

            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                self.advance();
                self.make_token(TokenKind::Error(format!("Unexpected character: {c}")))
            }
        }
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds(""), vec![TokenKind::Eof]);
        assert_eq!(token_kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            token_kinds("SELECT -- comment\nFROM /* multi\nline */ WHERE"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            token_kinds("@x @@ROWCOUNT @user_id"),
            vec![
                TokenKind::Variable(String::from("@x")),
                TokenKind::Variable(String::from("@@ROWCOUNT")),
                TokenKind::Variable(String::from("@user_id")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_temp_table_names() {
        assert_eq!(
            token_kinds("#tmp ##shared"),
            vec![
                TokenKind::Identifier(String::from("#tmp")),
                TokenKind::Identifier(String::from("##shared")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bracketed_identifier() {
        assert_eq!(
            token_kinds("[order details]"),
            vec![
                TokenKind::Identifier(String::from("order details")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_string() {
        assert_eq!(
            token_kinds("N'héllo'"),
            vec![TokenKind::String(String::from("héllo")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            token_kinds("'it''s'"),
            vec![TokenKind::String(String::from("it's")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 3.14 2.5e-3"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.14),
                TokenKind::Float(2.5e-3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_binary_literal() {
        assert_eq!(
            token_kinds("0x48AF"),
            vec![TokenKind::Binary(vec![0x48, 0xAF]), TokenKind::Eof]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("+ - * / % = != <> < <= > >="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_batch_statement() {
        assert_eq!(
            token_kinds("DECLARE @x INT = 5 PRINT @x"),
            vec![
                TokenKind::Keyword(Keyword::Declare),
                TokenKind::Variable(String::from("@x")),
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Eq,
                TokenKind::Integer(5),
                TokenKind::Keyword(Keyword::Print),
                TokenKind::Variable(String::from("@x")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Lexer::new("SELECT 1\nFROM t").tokenize();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[2].span.line, 2);
    }

    #[test]
    fn test_identifier_n_not_string_prefix() {
        // A bare N followed by something other than a quote is an identifier.
        assert_eq!(
            token_kinds("Name"),
            vec![TokenKind::Identifier(String::from("Name")), TokenKind::Eof]
        );
    }
}
