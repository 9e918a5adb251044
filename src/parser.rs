use crate::ast::*;
use crate::lexer::{LexError, Lexer, Token};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Unexpected token: {0:?}, expected {1}")]
    Unexpected(Token, &'static str),
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Invalid value for setting '{0}'")]
    InvalidSetting(String),
}

/// A bracketed setting such as `pk`, `not null` or `note: 'text'`.
#[derive(Debug, Clone)]
struct Setting {
    key: String,
    value: Vec<Token>,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn from_tokens(mut tokens: Vec<Token>) -> Self {
        tokens.push(Token::Eof);
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let tok = self.advance().clone();
        if tok == expected {
            Ok(())
        } else if tok == Token::Eof {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(ParseError::Unexpected(tok, "specific token"))
        }
    }

    /// DBML keywords are case-insensitive (`Table`, `table`, `TABLE`).
    fn check_keyword(&self, name: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(name))
    }

    /// Identifier or quoted name.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Ident(s) | Token::Str(s) => Ok(s),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "name")),
        }
    }

    /// `name` or `schema.name`.
    fn parse_qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_name()?;
        while *self.peek() == Token::Dot {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    pub fn parse(&mut self) -> Result<Schema, ParseError> {
        let mut schema = Schema::default();

        while *self.peek() != Token::Eof {
            if self.check_keyword("table") {
                self.advance();
                let table = self.parse_table(&mut schema.refs)?;
                schema.tables.push(table);
            } else if self.check_keyword("enum") {
                self.advance();
                schema.enums.push(self.parse_enum()?);
            } else if self.check_keyword("ref") {
                self.advance();
                schema.refs.extend(self.parse_ref_item()?);
            } else if self.check_keyword("project")
                || self.check_keyword("tablegroup")
                || self.check_keyword("note")
            {
                self.skip_item()?;
            } else {
                return Err(ParseError::Unexpected(
                    self.peek().clone(),
                    "Table, Enum, Ref, Project, TableGroup or Note",
                ));
            }
        }

        resolve_aliases(&mut schema);
        Ok(schema)
    }

    /// Skip a block whose contents we don't model: header tokens up to `{`,
    /// then everything up to the matching `}`.
    fn skip_item(&mut self) -> Result<(), ParseError> {
        while *self.peek() != Token::LBrace {
            if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            }
            self.advance();
        }
        self.skip_balanced()
    }

    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LBrace)?;
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Token::LBrace => depth += 1,
                Token::RBrace => depth -= 1,
                Token::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_table(&mut self, refs: &mut Vec<Reference>) -> Result<Table, ParseError> {
        let name = self.parse_qualified_name()?;

        let mut alias = None;
        if self.check_keyword("as") {
            self.advance();
            alias = Some(self.expect_name()?);
        }

        let mut table = Table {
            name,
            alias,
            ..Default::default()
        };

        if *self.peek() == Token::LBracket {
            for setting in self.parse_settings()? {
                match setting.key.as_str() {
                    "headercolor" => match setting.value.as_slice() {
                        [Token::Color(c)] => table.header_color = Some(c.clone()),
                        _ => return Err(ParseError::InvalidSetting(setting.key.clone())),
                    },
                    "note" => table.note = Some(setting_string(&setting)?),
                    _ => {}
                }
            }
        }

        self.expect(Token::LBrace)?;

        while *self.peek() != Token::RBrace {
            if self.check_keyword("note")
                && matches!(self.peek_at(1), Token::Colon | Token::LBrace)
            {
                self.advance();
                table.note = Some(self.parse_note_value()?);
            } else if self.check_keyword("indexes") && *self.peek_at(1) == Token::LBrace {
                self.advance();
                self.skip_balanced()?;
            } else if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            } else {
                let column = self.parse_column(&table.name, refs)?;
                table.columns.push(column);
            }
        }

        self.expect(Token::RBrace)?;
        Ok(table)
    }

    /// `Note: 'text'` or `Note { 'text' }`, with the `Note` keyword consumed.
    fn parse_note_value(&mut self) -> Result<String, ParseError> {
        let braced = match self.advance().clone() {
            Token::Colon => false,
            Token::LBrace => true,
            tok => return Err(ParseError::Unexpected(tok, "':' or '{' after Note")),
        };
        let text = match self.advance().clone() {
            Token::Str(s) => s,
            tok => return Err(ParseError::Unexpected(tok, "note string")),
        };
        if braced {
            self.expect(Token::RBrace)?;
        }
        Ok(text)
    }

    fn parse_column(
        &mut self,
        table: &str,
        refs: &mut Vec<Reference>,
    ) -> Result<Column, ParseError> {
        let name = self.expect_name()?;
        let typ = self.parse_type()?;
        let mut column = Column {
            name,
            typ,
            ..Default::default()
        };

        if *self.peek() == Token::LBracket {
            for setting in self.parse_settings()? {
                match setting.key.as_str() {
                    "pk" | "primary key" => column.pk = true,
                    "unique" => column.unique = true,
                    "not null" => column.not_null = true,
                    "null" => column.not_null = false,
                    "note" => column.note = Some(setting_string(&setting)?),
                    "ref" => {
                        let mut sub = Parser::from_tokens(setting.value);
                        let kind = sub.parse_ref_op()?;
                        let to = sub.parse_endpoint()?;
                        refs.push(Reference {
                            name: None,
                            from: Endpoint::new(table, column.name.clone()),
                            to,
                            kind,
                            note: None,
                        });
                    }
                    _ => {}
                }
            }
        }

        Ok(column)
    }

    /// `int`, `varchar(255)`, `decimal(10, 2)`, `int[]`, `public.status`
    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut typ = self.parse_qualified_name()?;

        if *self.peek() == Token::LParen {
            self.advance();
            let mut args = Vec::new();
            loop {
                match self.advance().clone() {
                    Token::RParen => break,
                    Token::Comma => {}
                    Token::Num(n) | Token::Ident(n) => args.push(n),
                    Token::Eof => return Err(ParseError::UnexpectedEof),
                    tok => return Err(ParseError::Unexpected(tok, "type argument")),
                }
            }
            typ = format!("{}({})", typ, args.join(","));
        }

        if *self.peek() == Token::LBracket && *self.peek_at(1) == Token::RBracket {
            self.advance();
            self.advance();
            typ.push_str("[]");
        }

        Ok(typ)
    }

    /// Parse `[a, b: value, c d]` into settings with lowercased keys.
    fn parse_settings(&mut self) -> Result<Vec<Setting>, ParseError> {
        self.expect(Token::LBracket)?;
        let mut settings = Vec::new();

        loop {
            let mut words = Vec::new();
            while let Token::Ident(s) = self.peek() {
                words.push(s.to_lowercase());
                self.advance();
            }
            if words.is_empty() {
                return Err(ParseError::Unexpected(self.peek().clone(), "setting name"));
            }

            let mut value = Vec::new();
            if *self.peek() == Token::Colon {
                self.advance();
                let mut depth = 0usize;
                loop {
                    match self.peek() {
                        Token::Comma | Token::RBracket if depth == 0 => break,
                        Token::Eof => return Err(ParseError::UnexpectedEof),
                        Token::LParen | Token::LBracket => depth += 1,
                        Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    value.push(self.advance().clone());
                }
            }

            settings.push(Setting {
                key: words.join(" "),
                value,
            });

            match self.advance().clone() {
                Token::Comma => continue,
                Token::RBracket => break,
                Token::Eof => return Err(ParseError::UnexpectedEof),
                tok => return Err(ParseError::Unexpected(tok, "',' or ']'")),
            }
        }

        Ok(settings)
    }

    fn parse_enum(&mut self) -> Result<Enum, ParseError> {
        let name = self.parse_qualified_name()?;
        self.expect(Token::LBrace)?;

        let mut items = Vec::new();
        while *self.peek() != Token::RBrace {
            items.push(self.expect_name()?);
            if *self.peek() == Token::LBracket {
                // item notes are not rendered
                self.parse_settings()?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Enum { name, items })
    }

    /// `Ref [name]: a.b < c.d [settings]` or `Ref [name] { ... }`
    fn parse_ref_item(&mut self) -> Result<Vec<Reference>, ParseError> {
        let name = match self.peek() {
            Token::Colon | Token::LBrace => None,
            _ => Some(self.expect_name()?),
        };

        match self.advance().clone() {
            Token::Colon => {
                let mut r = self.parse_ref_body()?;
                r.name = name;
                Ok(vec![r])
            }
            Token::LBrace => {
                let mut refs = Vec::new();
                while *self.peek() != Token::RBrace {
                    if *self.peek() == Token::Eof {
                        return Err(ParseError::UnexpectedEof);
                    }
                    let mut r = self.parse_ref_body()?;
                    r.name = name.clone();
                    refs.push(r);
                }
                self.expect(Token::RBrace)?;
                Ok(refs)
            }
            tok => Err(ParseError::Unexpected(tok, "':' or '{' after Ref")),
        }
    }

    fn parse_ref_body(&mut self) -> Result<Reference, ParseError> {
        let from = self.parse_endpoint()?;
        let kind = self.parse_ref_op()?;
        let to = self.parse_endpoint()?;

        let mut note = None;
        if *self.peek() == Token::LBracket {
            for setting in self.parse_settings()? {
                if setting.key == "note" {
                    note = Some(setting_string(&setting)?);
                }
            }
        }

        Ok(Reference {
            name: None,
            from,
            to,
            kind,
            note,
        })
    }

    fn parse_ref_op(&mut self) -> Result<RefKind, ParseError> {
        match self.advance().clone() {
            Token::Minus => Ok(RefKind::OneToOne),
            Token::Lt => Ok(RefKind::OneToMany),
            Token::Gt => Ok(RefKind::ManyToOne),
            Token::LtGt => Ok(RefKind::ManyToMany),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "relationship (-, <, >, <>)")),
        }
    }

    /// `table.column`, `schema.table.column` or `table.(a, b)`
    fn parse_endpoint(&mut self) -> Result<Endpoint, ParseError> {
        let mut parts = vec![self.expect_name()?];

        while *self.peek() == Token::Dot {
            self.advance();
            if *self.peek() == Token::LParen {
                self.advance();
                let mut columns = vec![self.expect_name()?];
                while *self.peek() == Token::Comma {
                    self.advance();
                    columns.push(self.expect_name()?);
                }
                self.expect(Token::RParen)?;
                return Ok(Endpoint {
                    table: parts.join("."),
                    columns,
                });
            }
            parts.push(self.expect_name()?);
        }

        if parts.len() < 2 {
            return Err(ParseError::Unexpected(self.peek().clone(), "table.column"));
        }
        let column = parts.pop().unwrap_or_default();
        Ok(Endpoint::new(parts.join("."), column))
    }
}

fn setting_string(setting: &Setting) -> Result<String, ParseError> {
    match setting.value.as_slice() {
        [Token::Str(s)] => Ok(s.clone()),
        _ => Err(ParseError::InvalidSetting(setting.key.clone())),
    }
}

/// Rewrite reference endpoints written against a table alias to the table name.
fn resolve_aliases(schema: &mut Schema) {
    let aliases: Vec<(String, String)> = schema
        .tables
        .iter()
        .filter_map(|t| t.alias.clone().map(|a| (a, t.name.clone())))
        .collect();
    if aliases.is_empty() {
        return;
    }

    for r in &mut schema.refs {
        for end in [&mut r.from, &mut r.to] {
            if let Some((_, name)) = aliases.iter().find(|(a, _)| *a == end.table) {
                end.table = name.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let input = r#"
            Table users {
                id integer [pk, increment]
                name varchar(255) [not null, note: 'COLOR: 2 display name']
                email varchar [unique, not null]
                created_at timestamp [default: `now()`]
                Note: 'COLOR: 1 Registered users'
            }
        "#;
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.tables.len(), 1);
        let users = &schema.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 4);
        assert!(users.columns[0].pk && !users.columns[0].not_null);
        assert_eq!(users.columns[1].typ, "varchar(255)");
        assert_eq!(users.columns[1].note.as_deref(), Some("COLOR: 2 display name"));
        assert!(users.columns[2].unique && users.columns[2].not_null);
        assert_eq!(users.columns[3].typ, "timestamp");
        assert_eq!(users.note.as_deref(), Some("COLOR: 1 Registered users"));
    }

    #[test]
    fn test_parse_enum() {
        let input = r#"
            Enum job_status {
                created [note: 'Waiting to be processed']
                running
                "in progress"
            }
        "#;
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.enums[0].name, "job_status");
        assert_eq!(schema.enums[0].items, vec!["created", "running", "in progress"]);
    }

    #[test]
    fn test_parse_refs() {
        let input = r#"
            Table users { id int [pk] }
            Table posts {
                id int [pk]
                user_id int [ref: > users.id]
            }
            Ref: posts.id - users.id
            Ref tags {
                posts.id <> users.id [note: 'COLOR: 3']
                users.id < posts.user_id
            }
        "#;
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.refs.len(), 4);

        assert_eq!(schema.refs[0].from, Endpoint::new("posts", "user_id"));
        assert_eq!(schema.refs[0].to, Endpoint::new("users", "id"));
        assert_eq!(schema.refs[0].kind, RefKind::ManyToOne);

        assert_eq!(schema.refs[1].kind, RefKind::OneToOne);
        assert_eq!(schema.refs[2].kind, RefKind::ManyToMany);
        assert_eq!(schema.refs[2].name.as_deref(), Some("tags"));
        assert_eq!(schema.refs[2].note.as_deref(), Some("COLOR: 3"));
        assert_eq!(schema.refs[3].kind, RefKind::OneToMany);
    }

    #[test]
    fn test_parse_composite_ref() {
        let input = "Ref: merchant_periods.(merchant_id, country_code) > merchants.(id, country_code)";
        let schema = Parser::new(input).unwrap().parse().unwrap();
        let r = &schema.refs[0];
        assert_eq!(r.from.table, "merchant_periods");
        assert_eq!(r.from.columns, vec!["merchant_id", "country_code"]);
        assert_eq!(r.to.first_column(), Some("id"));
    }

    #[test]
    fn test_parse_alias_and_schema_names() {
        let input = r#"
            Table public.users as U [headercolor: #3498DB] {
                id int
                status public.user_status[]
            }
            Table posts { author int [ref: > U.id] }
        "#;
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.tables[0].name, "public.users");
        assert_eq!(schema.tables[0].header_color.as_deref(), Some("#3498DB"));
        assert_eq!(schema.tables[0].columns[1].typ, "public.user_status[]");
        assert_eq!(schema.refs[0].to.table, "public.users");
    }

    #[test]
    fn test_skips_project_groups_and_indexes() {
        let input = r#"
            Project shop { database_type: 'PostgreSQL' Note: 'x' }
            Table orders {
                id int
                indexes {
                    (id, created_at) [unique]
                }
            }
            TableGroup sales { orders }
        "#;
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].columns.len(), 1);
    }

    #[test]
    fn test_braced_table_note() {
        let input = "Table t { id int\n Note { 'COLOR: 4' } }";
        let schema = Parser::new(input).unwrap().parse().unwrap();
        assert_eq!(schema.tables[0].note.as_deref(), Some("COLOR: 4"));
    }

    #[test]
    fn test_unexpected_top_level() {
        let err = Parser::new("Entity x {}").unwrap().parse().unwrap_err();
        assert!(matches!(err, ParseError::Unexpected(Token::Ident(_), _)));
    }

    #[test]
    fn test_missing_ref_column() {
        let err = Parser::new("Ref: users > posts.id").unwrap().parse().unwrap_err();
        assert!(matches!(err, ParseError::Unexpected(_, "table.column")));
    }
}
