use db_schema_viz::label::LabelRenderer;
use db_schema_viz::sql::{Dialect, parse_sql};
use db_schema_viz::{Schema, datatype_to_text, schema_labels, sql_to_schema};

const DUCKDB_DUMP: &str = r#"
CREATE TABLE customers (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL,
    address STRUCT(street VARCHAR, city VARCHAR)
);
CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER REFERENCES customers(id),
    lines STRUCT(sku VARCHAR, qty INTEGER)[],
    tags VARCHAR[]
);
"#;

#[test]
fn test_sql_dump_to_labels() {
    let schema = parse_sql(DUCKDB_DUMP, Dialect::Auto).unwrap();
    let labels = LabelRenderer::default().schema_labels(&schema);

    let expected = "\
customers
  PK id: INTEGER
  name: VARCHAR
  address: STRUCT(
             STREET VARCHAR, CITY VARCHAR
           )

orders
  PK id: INTEGER
  FK customer_id: INTEGER -> customers.id
  lines: STRUCT(
           SKU VARCHAR, QTY INTEGER
         )[]
  tags: VARCHAR[]";
    assert_eq!(labels, expected);
}

#[test]
fn test_schema_json_round_trip_through_bindings() {
    let json = sql_to_schema(DUCKDB_DUMP, Some("duckdb".to_string())).unwrap();
    let schema = Schema::from_json(&json).unwrap();
    assert_eq!(schema.len(), 2);
    assert!(schema.dangling_references().is_empty());

    let labels = schema_labels(&json).unwrap();
    assert!(labels.starts_with("customers\n  PK id: INTEGER"));
}

#[test]
fn test_bindings_report_errors_as_text() {
    assert!(sql_to_schema("CREATE TABLE t (", None).unwrap_err().contains("t"));
    assert!(sql_to_schema("", Some("oracle".to_string())).is_err());
    assert!(schema_labels("not json").unwrap_err().starts_with("JSON error"));
}

#[test]
fn test_format_binding() {
    assert_eq!(datatype_to_text("MAP(VARCHAR,INTEGER)"), "MAP(\n  VARCHAR,\n  INTEGER\n)");
}

#[test]
fn test_dangling_reference_survives_loading() {
    let json = r#"{
        "a": {"name": "a", "attributes": [
            {"name": "b_id", "datatype": "INTEGER",
             "foreign_key": {"entity": "b", "attribute": "id"}}
        ]}
    }"#;
    let schema = Schema::from_json(json).unwrap();
    let dangling = schema.dangling_references();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].to_string(), "a.b_id -> b.id");
}
