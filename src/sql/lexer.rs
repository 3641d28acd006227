//! SQL lexer for tokenizing DDL statements.

use std::iter::Peekable;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Only,
    Primary,
    Key,
    Foreign,
    References,
    Not,
    Null,
    Unique,
    Default,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    Constraint,
    Index,
    If,
    Exists,
    AutoIncrement,
    Check,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    /// True for reserved words the lexer recognizes.
    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            Token::Ident(_)
                | Token::Str(_)
                | Token::Num(_)
                | Token::LParen
                | Token::RParen
                | Token::LBracket
                | Token::RBracket
                | Token::Lt
                | Token::Gt
                | Token::Comma
                | Token::Semicolon
                | Token::Dot
                | Token::Eof
        )
    }
}

/// A token with the byte range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices().peekable();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.current.map_or(self.input.len(), |(i, _)| i)
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '*' && self.current_char() == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Read a quoted identifier or string; a doubled quote is an escaped quote.
    fn read_quoted(&mut self, quote: char) -> String {
        self.advance();
        let mut text = String::new();
        while let Some(c) = self.current_char() {
            if c == quote {
                if self.peek() == Some(quote) {
                    text.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else if c == '\\' && quote == '\'' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    self.advance();
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "TABLE" => Token::Table,
            "ONLY" => Token::Only,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "UNIQUE" => Token::Unique,
            "DEFAULT" => Token::Default,
            "ON" => Token::On,
            "DELETE" => Token::Delete,
            "UPDATE" => Token::Update,
            "CASCADE" => Token::Cascade,
            "RESTRICT" => Token::Restrict,
            "CONSTRAINT" => Token::Constraint,
            "INDEX" => Token::Index,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "AUTO_INCREMENT" | "AUTOINCREMENT" => Token::AutoIncrement,
            "CHECK" => Token::Check,
            _ => Token::Ident(s),
        }
    }

    fn next_token(&mut self) -> Spanned {
        loop {
            self.skip_whitespace();

            let start = self.offset();
            let Some(c) = self.current_char() else {
                return self.spanned(Token::Eof, start);
            };
            let next = self.peek();

            let token = match c {
                '(' | ')' | '[' | ']' | '<' | '>' | ',' | ';' | '.' => {
                    self.advance();
                    match c {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        '[' => Token::LBracket,
                        ']' => Token::RBracket,
                        '<' => Token::Lt,
                        '>' => Token::Gt,
                        ',' => Token::Comma,
                        ';' => Token::Semicolon,
                        _ => Token::Dot,
                    }
                }
                '-' if next == Some('-') => {
                    self.skip_line_comment();
                    continue;
                }
                '-' if next.is_some_and(|c| c.is_ascii_digit()) => {
                    Token::Num(self.read_number())
                }
                '/' if next == Some('*') => {
                    self.skip_block_comment();
                    continue;
                }
                '#' => {
                    self.skip_line_comment();
                    continue;
                }
                '"' | '`' => Token::Ident(self.read_quoted(c)),
                '\'' => Token::Str(self.read_quoted(c)),
                c if c.is_ascii_digit() => Token::Num(self.read_number()),
                c if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    Self::keyword_or_ident(ident)
                }
                _ => {
                    // Operators, casts and the like carry no structure we need
                    self.advance();
                    continue;
                }
            };
            return self.spanned(token, start);
        }
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            start,
            end: self.offset(),
        }
    }

    /// Collect all tokens with their source spans, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token();
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }
        tokens
    }
}

/// Tokenize `input` into spanned tokens.
pub fn tokenize(input: &str) -> Vec<Spanned> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<Token> {
        tokenize(sql).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_simple_create_table() {
        let tokens = kinds("CREATE TABLE users (id INT);");

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens[2], Token::Ident("users".to_string()));
        assert_eq!(tokens[3], Token::LParen);
        assert_eq!(tokens[4], Token::Ident("id".to_string()));
        assert_eq!(tokens[5], Token::Ident("INT".to_string()));
        assert_eq!(tokens[6], Token::RParen);
        assert_eq!(tokens[7], Token::Semicolon);
        assert_eq!(tokens[8], Token::Eof);
    }

    #[test]
    fn test_quoted_identifiers() {
        let tokens = kinds(r#"CREATE TABLE "User Table" (`column name` INT, "a""b" INT);"#);

        assert_eq!(tokens[2], Token::Ident("User Table".to_string()));
        assert_eq!(tokens[4], Token::Ident("column name".to_string()));
        assert_eq!(tokens[7], Token::Ident("a\"b".to_string()));
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("-- comment\nCREATE /* block */ TABLE t (id INT); # trailing");

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_type_brackets() {
        let tokens = kinds("tags VARCHAR[] m MAP<INT, TEXT>");
        assert!(tokens.contains(&Token::LBracket));
        assert!(tokens.contains(&Token::RBracket));
        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Gt));
    }

    #[test]
    fn test_spans_cover_source_text() {
        let sql = "a  /* x */ DECIMAL(10,2)";
        let tokens = tokenize(sql);
        let decimal = &tokens[1];
        assert_eq!(decimal.token, Token::Ident("DECIMAL".to_string()));
        assert_eq!(&sql[decimal.start..decimal.end], "DECIMAL");
        let close = &tokens[6];
        assert_eq!(close.token, Token::RParen);
        assert_eq!(&sql[close.start..close.end], ")");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds(r"DEFAULT 'it''s\n'");
        assert_eq!(tokens[1], Token::Str("it's\n".to_string()));
    }

    #[test]
    fn test_keyword_classification() {
        let tokens = kinds("key update idx ( 1 'x'");
        assert!(tokens[0].is_keyword());
        assert!(tokens[1].is_keyword());
        assert!(!tokens[2].is_keyword());
        assert!(!tokens[3].is_keyword());
        assert!(!tokens[4].is_keyword());
        assert!(!tokens[5].is_keyword());
        assert!(!Token::Eof.is_keyword());
    }
}
