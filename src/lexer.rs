use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    /// Raw numeric literal, kept as written (`255`, `10.5`)
    Num(String),
    /// Backtick expression, e.g. `now()`
    Expr(String),
    /// Hex color literal including the leading `#`
    Color(String),

    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
    Dot,      // .
    Lt,       // <
    Gt,       // >
    LtGt,     // <>
    Minus,    // -

    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated expression")]
    UnterminatedExpr,
    #[error("Unterminated block comment")]
    UnterminatedComment,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some('/') => {
                            while let Some(c) = self.chars.next() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            self.chars.next();
                            self.chars.next();
                            self.skip_block_comment()?;
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let mut prev = '\0';
        for c in self.chars.by_ref() {
            if prev == '*' && c == '/' {
                return Ok(());
            }
            prev = c;
        }
        Err(LexError::UnterminatedComment)
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        // ''' opens a multi-line string
        if quote == '\'' {
            let mut ahead = self.chars.clone();
            if ahead.next() == Some('\'') && ahead.next() == Some('\'') {
                self.chars.next();
                self.chars.next();
                return self.read_triple_string();
            }
        }

        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(s),
                Some('\\') => {
                    if let Some(c) = self.chars.next() {
                        match c {
                            'n' => s.push('\n'),
                            't' => s.push('\t'),
                            _ => s.push(c),
                        }
                    }
                }
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }
    }

    fn read_triple_string(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('\'') if s.ends_with("''") => {
                    s.truncate(s.len() - 2);
                    return Ok(dedent(&s));
                }
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }
    }

    fn read_expr(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('`') => return Ok(s),
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedExpr),
            }
        }
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_color(&mut self) -> String {
        let mut s = String::from('#');
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_hexdigit() {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '.' => Token::Dot,
            '>' => Token::Gt,
            '-' => Token::Minus,
            '<' => {
                if self.chars.peek() == Some(&'>') {
                    self.chars.next();
                    Token::LtGt
                } else {
                    Token::Lt
                }
            }
            '#' => Token::Color(self.read_color()),
            '`' => Token::Expr(self.read_expr()?),
            '\'' | '"' => Token::Str(self.read_string(c)?),
            c if c.is_ascii_digit() => Token::Num(self.read_number(c)),
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_ident(c)),
            _ => return Err(LexError::UnexpectedChar(c)),
        };

        Ok(tok)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

/// Strip the common leading indentation of a multi-line string.
fn dedent(s: &str) -> String {
    let lines: Vec<&str> = s.trim_matches('\n').lines().collect();
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let tokens = Lexer::new("Table users { }").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("Table".into()),
                Token::Ident("users".into()),
                Token::LBrace,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_ident() {
        let tokens = Lexer::new("Table ユーザー { 名前 varchar }").tokenize().unwrap();
        assert_eq!(tokens[1], Token::Ident("ユーザー".into()));
        assert_eq!(tokens[3], Token::Ident("名前".into()));
    }

    #[test]
    fn test_comments() {
        let input = "// comment\nTable users { /* block\n comment */ }";
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("Table".into()),
                Token::Ident("users".into()),
                Token::LBrace,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_ref_operators() {
        let tokens = Lexer::new("< > <> -").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Lt, Token::Gt, Token::LtGt, Token::Minus, Token::Eof]
        );
    }

    #[test]
    fn test_strings_and_literals() {
        let tokens = Lexer::new(r#"'it\'s' "dq" `now()` #3498DB 10.5"#)
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Str("it's".into()),
                Token::Str("dq".into()),
                Token::Expr("now()".into()),
                Token::Color("#3498DB".into()),
                Token::Num("10.5".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_triple_quoted_string() {
        let input = "'''\n    COLOR: 2\n    multi line\n  '''";
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Str("COLOR: 2\nmulti line".into()));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            Lexer::new("'open").tokenize(),
            Err(LexError::UnterminatedString)
        ));
    }
}
