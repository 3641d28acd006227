//! Column type normalization.
//!
//! Only the leading type name is canonicalized. Arguments, array suffixes
//! and nested member lists are kept verbatim (uppercased) so the datatype
//! formatter sees the full structure.

use super::Dialect;

/// Normalize a raw column type as written in DDL.
pub fn normalize_type(raw: &str, dialect: Dialect) -> String {
    let upper = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    let split = upper.find(['(', '[', '<']).unwrap_or(upper.len());
    let (base, rest) = upper.split_at(split);
    let base = base.trim_end();

    if dialect == Dialect::MySQL && base == "TINYINT" && rest.starts_with("(1)") {
        return "BOOLEAN".to_string();
    }

    let canonical = match dialect {
        Dialect::PostgreSQL => postgres_name(base),
        Dialect::MySQL => mysql_name(base),
        Dialect::DuckDB => duckdb_name(base),
        Dialect::Generic | Dialect::Auto => generic_name(base),
    };

    format!("{}{}", canonical.unwrap_or(base), rest)
}

fn postgres_name(base: &str) -> Option<&'static str> {
    Some(match base {
        "INT" | "INT4" | "INTEGER" | "SERIAL" | "SERIAL4" => "INTEGER",
        "INT8" | "BIGSERIAL" | "SERIAL8" => "BIGINT",
        "INT2" | "SMALLSERIAL" | "SERIAL2" => "SMALLINT",
        "FLOAT4" => "REAL",
        "FLOAT8" => "DOUBLE PRECISION",
        "DECIMAL" => "NUMERIC",
        "CHARACTER VARYING" => "VARCHAR",
        "CHARACTER" | "BPCHAR" => "CHAR",
        "TIMESTAMPTZ" => "TIMESTAMP WITH TIME ZONE",
        "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP",
        "TIMETZ" => "TIME WITH TIME ZONE",
        "BOOL" => "BOOLEAN",
        _ => return None,
    })
}

fn mysql_name(base: &str) -> Option<&'static str> {
    Some(match base {
        "INTEGER" => "INT",
        "BOOL" => "BOOLEAN",
        "DEC" | "NUMERIC" => "DECIMAL",
        "REAL" => "DOUBLE",
        _ => return None,
    })
}

fn duckdb_name(base: &str) -> Option<&'static str> {
    Some(match base {
        "INT" | "INT4" | "SIGNED" => "INTEGER",
        "INT8" | "LONG" => "BIGINT",
        "INT2" | "SHORT" => "SMALLINT",
        "INT1" => "TINYINT",
        "FLOAT4" | "REAL" => "FLOAT",
        "FLOAT8" | "DOUBLE PRECISION" => "DOUBLE",
        "NUMERIC" => "DECIMAL",
        "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "CHARACTER VARYING" => "VARCHAR",
        "BOOL" | "LOGICAL" => "BOOLEAN",
        "BYTEA" | "BINARY" | "VARBINARY" => "BLOB",
        "DATETIME" => "TIMESTAMP",
        "TIMESTAMPTZ" => "TIMESTAMP WITH TIME ZONE",
        _ => return None,
    })
}

fn generic_name(base: &str) -> Option<&'static str> {
    Some(match base {
        "INT" => "INTEGER",
        "BOOL" => "BOOLEAN",
        "CHARACTER VARYING" => "VARCHAR",
        "DOUBLE" => "DOUBLE PRECISION",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_types() {
        assert_eq!(normalize_type("SERIAL", Dialect::PostgreSQL), "INTEGER");
        assert_eq!(normalize_type("varchar(255)", Dialect::PostgreSQL), "VARCHAR(255)");
        assert_eq!(
            normalize_type("character  varying(20)", Dialect::PostgreSQL),
            "VARCHAR(20)"
        );
        assert_eq!(normalize_type("int4[]", Dialect::PostgreSQL), "INTEGER[]");
        assert_eq!(
            normalize_type("timestamptz", Dialect::PostgreSQL),
            "TIMESTAMP WITH TIME ZONE"
        );
        assert_eq!(normalize_type("jsonb", Dialect::PostgreSQL), "JSONB");
    }

    #[test]
    fn test_mysql_types() {
        assert_eq!(normalize_type("INTEGER", Dialect::MySQL), "INT");
        assert_eq!(normalize_type("TINYINT(1)", Dialect::MySQL), "BOOLEAN");
        assert_eq!(normalize_type("TINYINT(4)", Dialect::MySQL), "TINYINT(4)");
        assert_eq!(normalize_type("int unsigned", Dialect::MySQL), "INT UNSIGNED");
    }

    #[test]
    fn test_duckdb_nested_types_kept() {
        assert_eq!(
            normalize_type("struct(a int, b text[])", Dialect::DuckDB),
            "STRUCT(A INT, B TEXT[])"
        );
        assert_eq!(normalize_type("text[]", Dialect::DuckDB), "VARCHAR[]");
        assert_eq!(normalize_type("MAP(VARCHAR, INT)", Dialect::DuckDB), "MAP(VARCHAR, INT)");
        assert_eq!(normalize_type("DECIMAL(10,2)", Dialect::DuckDB), "DECIMAL(10,2)");
    }

    #[test]
    fn test_generic_types() {
        assert_eq!(normalize_type("int", Dialect::Generic), "INTEGER");
        assert_eq!(normalize_type("ARRAY<STRING>", Dialect::Generic), "ARRAY<STRING>");
    }
}
