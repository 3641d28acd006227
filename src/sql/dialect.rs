//! SQL dialect detection and handling.

use std::str::FromStr;

use super::lexer::{Token, tokenize};

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Auto-detect from dump content
    #[default]
    Auto,
    /// Standard SQL
    Generic,
    /// PostgreSQL
    PostgreSQL,
    /// MySQL
    MySQL,
    /// DuckDB
    DuckDB,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "generic" => Ok(Self::Generic),
            "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "mysql" => Ok(Self::MySQL),
            "duckdb" => Ok(Self::DuckDB),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}

/// Type names only DuckDB uses.
const DUCKDB_TYPES: &[&str] = &[
    "HUGEINT",
    "UHUGEINT",
    "UBIGINT",
    "UINTEGER",
    "USMALLINT",
    "UTINYINT",
];

/// DuckDB nested types, recognized when followed by a member list.
const DUCKDB_NESTED_TYPES: &[&str] = &["STRUCT", "MAP", "UNION"];

const POSTGRES_TYPES: &[&str] = &[
    "SERIAL",
    "BIGSERIAL",
    "SMALLSERIAL",
    "TIMESTAMPTZ",
    "JSONB",
    "BYTEA",
];

const MYSQL_TYPES: &[&str] = &["TINYINT", "MEDIUMINT", "UNSIGNED"];

impl Dialect {
    /// Detect dialect from SQL content.
    ///
    /// Dump headers (the comment lines before the first statement) win. After
    /// that, type names that only one dialect uses decide, matched as whole
    /// words in type position.
    pub fn detect(content: &str) -> Self {
        Self::detect_header(content).unwrap_or_else(|| Self::detect_types(content))
    }

    fn detect_header(content: &str) -> Option<Self> {
        let header = content
            .lines()
            .map(str::trim)
            .take_while(|line| line.is_empty() || line.starts_with("--") || line.starts_with('#'));

        for line in header {
            let line = line.to_lowercase();
            if line.contains("duckdb") {
                return Some(Self::DuckDB);
            }
            if line.contains("postgres") || line.contains("pg_dump") {
                return Some(Self::PostgreSQL);
            }
            if line.contains("mysql") {
                return Some(Self::MySQL);
            }
        }
        None
    }

    fn detect_types(content: &str) -> Self {
        let tokens = tokenize(content);
        let (mut duckdb, mut postgres, mut mysql) = (false, false, false);

        for (i, spanned) in tokens.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| &tokens[p].token);
            let next = tokens.get(i + 1).map(|t| &t.token);

            match &spanned.token {
                // column name followed by its type
                Token::Ident(word) if matches!(prev, Some(Token::Ident(_))) => {
                    let word = word.to_uppercase();
                    let word = word.as_str();
                    if DUCKDB_TYPES.contains(&word)
                        || (DUCKDB_NESTED_TYPES.contains(&word) && next == Some(&Token::LParen))
                    {
                        duckdb = true;
                    } else if POSTGRES_TYPES.contains(&word) {
                        postgres = true;
                    } else if MYSQL_TYPES.contains(&word) {
                        mysql = true;
                    }
                }
                // INT(10) UNSIGNED, ) ENGINE=InnoDB
                Token::Ident(word)
                    if prev == Some(&Token::RParen)
                        && (word.eq_ignore_ascii_case("UNSIGNED")
                            || word.eq_ignore_ascii_case("ENGINE")) =>
                {
                    mysql = true;
                }
                // SQLite spells it AUTOINCREMENT
                Token::AutoIncrement
                    if content[spanned.start..spanned.end].eq_ignore_ascii_case("AUTO_INCREMENT") =>
                {
                    mysql = true;
                }
                _ => {}
            }
        }

        if duckdb {
            Self::DuckDB
        } else if postgres {
            Self::PostgreSQL
        } else if mysql {
            Self::MySQL
        } else {
            Self::Generic
        }
    }

    /// Resolve Auto to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_postgres() {
        let sql = "-- PostgreSQL database dump\nCREATE TABLE users (id SERIAL);";
        assert_eq!(Dialect::detect(sql), Dialect::PostgreSQL);
    }

    #[test]
    fn test_detect_mysql() {
        let sql = "-- MySQL dump\nCREATE TABLE users (id INT AUTO_INCREMENT);";
        assert_eq!(Dialect::detect(sql), Dialect::MySQL);
    }

    #[test]
    fn test_detect_duckdb() {
        let sql = "CREATE TABLE events (payload STRUCT(a INTEGER, b VARCHAR[]));";
        assert_eq!(Dialect::detect(sql), Dialect::DuckDB);
    }

    #[test]
    fn test_detect_generic() {
        let sql = "CREATE TABLE users (id INTEGER PRIMARY KEY);";
        assert_eq!(Dialect::detect(sql), Dialect::Generic);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Postgres".parse(), Ok(Dialect::PostgreSQL));
        assert_eq!("duckdb".parse(), Ok(Dialect::DuckDB));
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_resolve_keeps_explicit_dialect() {
        let sql = "-- Dumped by pg_dump version 16.2\nCREATE TABLE t (id INT);";
        assert_eq!(Dialect::MySQL.resolve(sql), Dialect::MySQL);
        assert_eq!(Dialect::Auto.resolve(sql), Dialect::PostgreSQL);
    }

    #[test]
    fn test_detect_mysql_without_header() {
        let sql = "CREATE TABLE t (id INT(10) UNSIGNED NOT NULL) ENGINE=InnoDB;";
        assert_eq!(Dialect::detect(sql), Dialect::MySQL);
    }

    #[test]
    fn test_type_names_match_whole_words_in_type_position() {
        let sql =
            "CREATE TABLE parts (serial_no VARCHAR(20), map_id INT, note TEXT DEFAULT roadmap(1));";
        assert_eq!(Dialect::detect(sql), Dialect::Generic);

        // a column named like a type is not a type
        let sql = "CREATE TABLE s (serial TEXT, jsonb TEXT);";
        assert_eq!(Dialect::detect(sql), Dialect::Generic);
    }

    #[test]
    fn test_only_header_comments_name_the_dialect() {
        let sql = "CREATE TABLE t (id INT);\n-- copied from duckdb\nCREATE TABLE u (id INT);";
        assert_eq!(Dialect::detect(sql), Dialect::Generic);

        let sql = "\n-- DuckDB schema export\n\nCREATE TABLE t (id INT);";
        assert_eq!(Dialect::detect(sql), Dialect::DuckDB);
    }
}
