//! SQL parser for CREATE TABLE and ALTER TABLE statements.

use super::dialect::Dialect;
use super::lexer::{Spanned, Token, tokenize};
use super::types::normalize_type;
use crate::schema::{Attribute, Entity, ForeignKey, Schema};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Expected {expected}, found {found:?}")]
    Expected { expected: &'static str, found: Token },
    #[error("Unexpected end of input in table {0}")]
    UnterminatedTable(String),
}

/// Modifiers that may directly follow `CREATE` before `TABLE`.
const CREATE_PREFIXES: &[&str] = &["OR", "REPLACE", "TEMP", "TEMPORARY", "UNLOGGED", "GLOBAL", "LOCAL"];

/// Words that end a column type at nesting depth zero.
const TYPE_TERMINATORS: &[&str] = &["COLLATE", "GENERATED", "AS", "COMMENT", "IDENTITY"];

/// Parse a SQL dump into a schema.
///
/// Foreign keys and primary keys declared after a table (inline, as table
/// constraints, or through `ALTER TABLE`) are attached once the whole dump
/// has been read.
pub fn parse_sql(input: &str, dialect: Dialect) -> crate::error::Result<Schema> {
    let dialect = dialect.resolve(input);
    debug!(?dialect, input_len = input.len(), "parsing SQL dump");

    let mut parser = Parser::new(input, tokenize(input), dialect);
    parser.parse()?;
    let entities = parser.finish();
    debug!(tables = entities.len(), "parsed SQL dump");
    Schema::new(entities)
}

struct PendingFk {
    table: String,
    columns: Vec<String>,
    target: String,
    target_columns: Vec<String>,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    dialect: Dialect,
    entities: Vec<Entity>,
    pending_pks: Vec<(String, Vec<String>)>,
    pending_fks: Vec<PendingFk>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Spanned>, dialect: Dialect) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            dialect,
            entities: Vec::new(),
            pending_pks: Vec::new(),
            pending_fks: Vec::new(),
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).map_or(&Token::Eof, |t| &t.token)
    }

    /// Source text of the current token, as written.
    fn current_text(&self) -> &'a str {
        self.tokens.get(self.pos).map_or("", |t| &self.source[t.start..t.end])
    }

    /// A keyword such as `key` or `update` used as a bare column name. It is
    /// recognized by the type name that follows it.
    fn at_keyword_column(&self) -> bool {
        let current = self.current();
        if !current.is_keyword()
            || matches!(current, Token::Constraint | Token::Primary | Token::Foreign)
        {
            return false;
        }
        if !matches!(self.peek(1), Token::Ident(_)) {
            return false;
        }
        // KEY idx (col, ...), UNIQUE idx (col), INDEX idx USING BTREE (col)
        let index_definition = matches!(current, Token::Key | Token::Index | Token::Unique)
            && (matches!((self.peek(2), self.peek(3)), (Token::LParen, Token::Ident(_)))
                || self.peek(2).is_ident("USING"));
        !index_definition
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn parse(&mut self) -> Result<(), SqlParseError> {
        while self.current() != &Token::Eof {
            match self.current() {
                Token::Create => {
                    self.advance();
                    while CREATE_PREFIXES.iter().any(|w| self.current().is_ident(w)) {
                        self.advance();
                    }

                    if self.current() == &Token::Table {
                        self.advance();
                        self.skip_if_not_exists();
                        self.parse_create_table()?;
                    } else {
                        // CREATE INDEX, VIEW, SEQUENCE, ...
                        self.skip_statement();
                    }
                }
                Token::Alter => self.parse_alter_table()?,
                _ => self.advance(),
            }
        }
        Ok(())
    }

    fn skip_if_not_exists(&mut self) {
        if self.current() == &Token::If {
            self.advance();
            if self.current() == &Token::Not {
                self.advance();
            }
            if self.current() == &Token::Exists {
                self.advance();
            }
        }
    }

    /// Read `name`, `schema.name` or `catalog.schema.name`, keeping the last part.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let mut name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return None,
        };
        self.advance();

        while self.current() == &Token::Dot {
            self.advance();
            match self.current() {
                Token::Ident(part) => {
                    name = part.clone();
                    self.advance();
                }
                _ => break,
            }
        }
        Some(name)
    }

    fn parse_create_table(&mut self) -> Result<(), SqlParseError> {
        let Some(table_name) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };

        if self.current() != &Token::LParen {
            warn!(table = %table_name, "skipping table without column list");
            self.skip_statement();
            return Ok(());
        }
        self.advance();

        let mut attributes = Vec::new();

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Comma => self.advance(),
                _ if self.at_keyword_column() => {
                    if let Some(attribute) = self.parse_column(&table_name)? {
                        attributes.push(attribute);
                    }
                }
                Token::Primary => {
                    // PRIMARY KEY (col1, col2, ...)
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                        let cols = self.parse_column_list();
                        self.pending_pks.push((table_name.clone(), cols));
                    }
                }
                Token::Foreign => self.parse_foreign_key_constraint(&table_name)?,
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::Unique | Token::Index | Token::Key => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Check => {
                    self.advance();
                    self.skip_parenthesized();
                }
                Token::Ident(_) => {
                    if let Some(attribute) = self.parse_column(&table_name)? {
                        attributes.push(attribute);
                    }
                }
                Token::Eof => return Err(SqlParseError::UnterminatedTable(table_name)),
                _ => self.advance(),
            }
        }

        // Table options (ENGINE=, WITH (...), ...)
        self.skip_statement();

        debug!(table = %table_name, columns = attributes.len(), "parsed table");
        self.entities.push(Entity::new(table_name, attributes));
        Ok(())
    }

    fn parse_column(&mut self, table: &str) -> Result<Option<Attribute>, SqlParseError> {
        let name = match self.current() {
            Token::Ident(n) => n.clone(),
            token if token.is_keyword() => self.current_text().to_string(),
            _ => return Ok(None),
        };
        self.advance();

        let mut attribute = Attribute::new(name, self.parse_column_type());

        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                    attribute.primary_key = true;
                }
                Token::Not | Token::Null | Token::AutoIncrement => self.advance(),
                Token::Unique => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                }
                Token::Default => {
                    self.advance();
                    self.skip_default_value();
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.parse_reference()?;
                    self.pending_fks.push(PendingFk {
                        table: table.to_string(),
                        columns: vec![attribute.name.clone()],
                        target,
                        target_columns,
                    });
                    self.skip_on_actions();
                }
                Token::Check => {
                    self.advance();
                    self.skip_parenthesized();
                }
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::On => self.skip_on_actions(),
                Token::LParen => self.skip_parenthesized(),
                Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => break,
                _ => self.advance(),
            }
        }

        Ok(Some(attribute))
    }

    /// Take the column type straight from the source text so nested member
    /// lists keep their original punctuation.
    fn parse_column_type(&mut self) -> String {
        let mut span: Option<(usize, usize)> = None;
        let mut depth = 0usize;

        loop {
            let Some(spanned) = self.tokens.get(self.pos) else {
                break;
            };
            let take = match &spanned.token {
                Token::Eof => false,
                Token::LParen | Token::LBracket | Token::Lt => {
                    depth += 1;
                    true
                }
                Token::RParen | Token::RBracket | Token::Gt if depth > 0 => {
                    depth -= 1;
                    true
                }
                _ if depth > 0 => true,
                // schema-qualified type: public.mood
                Token::Dot => span.is_some() && matches!(self.peek(1), Token::Ident(_)),
                Token::Ident(word) => !TYPE_TERMINATORS.iter().any(|w| word.eq_ignore_ascii_case(w)),
                Token::Num(_) => true,
                _ => false,
            };
            if !take {
                break;
            }
            span = Some((span.map_or(spanned.start, |(s, _)| s), spanned.end));
            self.advance();
        }

        match span {
            Some((start, end)) => normalize_type(&self.source[start..end], self.dialect),
            None => String::new(),
        }
    }

    fn skip_default_value(&mut self) {
        match self.current() {
            Token::LParen => self.skip_parenthesized(),
            Token::Eof | Token::Comma | Token::RParen => {}
            _ => {
                self.advance();
                // function call such as now() or nextval('seq')
                if self.current() == &Token::LParen {
                    self.skip_parenthesized();
                }
            }
        }
    }

    fn parse_reference(&mut self) -> Result<(String, Vec<String>), SqlParseError> {
        let Some(target) = self.parse_qualified_name() else {
            return Err(SqlParseError::Expected {
                expected: "referenced table",
                found: self.current().clone(),
            });
        };
        let columns = self.parse_column_list();
        Ok((target, columns))
    }

    /// FOREIGN KEY (cols) REFERENCES table [(cols)] [ON ...]
    fn parse_foreign_key_constraint(&mut self, table: &str) -> Result<(), SqlParseError> {
        self.advance(); // FOREIGN
        if self.current() != &Token::Key {
            return Ok(());
        }
        self.advance(); // KEY

        let columns = self.parse_column_list();

        if self.current() != &Token::References {
            return Ok(());
        }
        self.advance();

        let (target, target_columns) = self.parse_reference()?;
        self.skip_on_actions();

        self.pending_fks.push(PendingFk {
            table: table.to_string(),
            columns,
            target,
            target_columns,
        });
        Ok(())
    }

    fn parse_column_list(&mut self) -> Vec<String> {
        let mut cols = Vec::new();

        if self.current() != &Token::LParen {
            return cols;
        }
        self.advance();

        loop {
            match self.current() {
                Token::Ident(name) => {
                    cols.push(name.clone());
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                _ => self.advance(),
            }
        }

        cols
    }

    /// ALTER TABLE [ONLY] name ADD [CONSTRAINT n] PRIMARY KEY | FOREIGN KEY | [COLUMN] col type
    fn parse_alter_table(&mut self) -> Result<(), SqlParseError> {
        self.advance(); // ALTER

        if self.current() != &Token::Table {
            self.skip_statement();
            return Ok(());
        }
        self.advance();
        self.skip_if_not_exists();
        if self.current() == &Token::Only {
            self.advance();
        }

        let Some(table_name) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };

        if self.current() != &Token::Add {
            self.skip_statement();
            return Ok(());
        }
        self.advance();

        if self.current() == &Token::Constraint {
            self.advance();
            if let Token::Ident(_) = self.current() {
                self.advance();
            }
        }

        match self.current() {
            Token::Primary => {
                self.advance();
                if self.current() == &Token::Key {
                    self.advance();
                    let cols = self.parse_column_list();
                    self.pending_pks.push((table_name, cols));
                }
            }
            Token::Foreign => self.parse_foreign_key_constraint(&table_name)?,
            _ => {
                if self.current().is_ident("COLUMN") {
                    self.advance();
                }
                self.skip_if_not_exists();
                let at_column =
                    matches!(self.current(), Token::Ident(_)) || self.at_keyword_column();
                if at_column {
                    if let Some(attribute) = self.parse_column(&table_name)? {
                        match self.entities.iter_mut().find(|e| e.name == table_name) {
                            Some(entity) => entity.attributes.push(attribute),
                            None => warn!(table = %table_name, "column added to unknown table"),
                        }
                    }
                }
            }
        }

        self.skip_statement();
        Ok(())
    }

    fn skip_on_actions(&mut self) {
        while self.current() == &Token::On {
            self.advance();
            if matches!(self.current(), Token::Delete | Token::Update) {
                self.advance();
            }
            // CASCADE, RESTRICT, SET NULL, SET DEFAULT, NO ACTION
            match self.current() {
                Token::Cascade | Token::Restrict => self.advance(),
                t if t.is_ident("SET") => {
                    self.advance();
                    if matches!(self.current(), Token::Null | Token::Default) {
                        self.advance();
                    }
                }
                t if t.is_ident("NO") => {
                    self.advance();
                    if self.current().is_ident("ACTION") {
                        self.advance();
                    }
                }
                _ => {}
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if self.current() != &Token::LParen {
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        if self.current() == &Token::Semicolon {
            self.advance();
        }
    }

    fn skip_until(&mut self, tokens: &[Token]) {
        while !tokens.contains(self.current()) && self.current() != &Token::Eof {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }

    /// Attach the collected keys to their attributes.
    fn finish(mut self) -> Vec<Entity> {
        for (table, columns) in std::mem::take(&mut self.pending_pks) {
            for column in columns {
                match self.attribute_mut(&table, &column) {
                    Some(attribute) => attribute.primary_key = true,
                    None => warn!(%table, %column, "primary key on unknown column"),
                }
            }
        }

        for fk in std::mem::take(&mut self.pending_fks) {
            let targets = self.resolve_target_columns(&fk);
            for (column, target_column) in fk.columns.iter().zip(targets) {
                let Some(attribute) = self.attribute_mut(&fk.table, column) else {
                    warn!(table = %fk.table, %column, "foreign key on unknown column");
                    continue;
                };
                if attribute.foreign_key.is_some() {
                    debug!(table = %fk.table, %column, "keeping first foreign key");
                    continue;
                }
                attribute.foreign_key = Some(ForeignKey {
                    entity: fk.target.clone(),
                    attribute: target_column,
                });
            }
        }

        self.entities
    }

    /// Explicit target columns, else the target's primary key, else `id`.
    fn resolve_target_columns(&self, fk: &PendingFk) -> Vec<String> {
        if !fk.target_columns.is_empty() {
            return fk.target_columns.clone();
        }
        let pks: Vec<String> = self
            .entities
            .iter()
            .find(|e| e.name == fk.target)
            .map(|e| e.primary_keys().map(|a| a.name.clone()).collect())
            .unwrap_or_default();
        if !pks.is_empty() && pks.len() == fk.columns.len() {
            pks
        } else {
            vec!["id".to_string(); fk.columns.len()]
        }
    }

    fn attribute_mut(&mut self, table: &str, column: &str) -> Option<&mut Attribute> {
        self.entities
            .iter_mut()
            .find(|e| e.name == table)?
            .attributes
            .iter_mut()
            .find(|a| a.name == column)
    }
}
