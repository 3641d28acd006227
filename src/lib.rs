pub mod datatype;
pub mod error;
pub mod label;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod schema;
pub mod sql;

use wasm_bindgen::prelude::*;

pub use datatype::{DatatypeFormatter, format_datatype};
pub use error::{Error, Result};
pub use schema::{Attribute, Entity, ForeignKey, Reference, Schema};

use label::LabelRenderer;
use sql::Dialect;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Format a datatype descriptor for display
#[wasm_bindgen(js_name = "formatDatatype")]
pub fn datatype_to_text(datatype: &str) -> String {
    format_datatype(datatype)
}

/// Read a SQL dump into the schema JSON document
#[wasm_bindgen(js_name = "sqlToSchema")]
pub fn sql_to_schema(sql: &str, dialect: Option<String>) -> std::result::Result<String, String> {
    let dialect = match dialect.as_deref() {
        Some(name) => name.parse()?,
        None => Dialect::Auto,
    };
    let schema = sql::parse_sql(sql, dialect).map_err(|e| e.to_string())?;
    schema.to_json().map_err(|e| e.to_string())
}

/// Render the text labels of every entity in a schema JSON document
#[wasm_bindgen(js_name = "schemaLabels")]
pub fn schema_labels(json: &str) -> std::result::Result<String, String> {
    let schema = Schema::from_json(json).map_err(|e| e.to_string())?;
    Ok(LabelRenderer::default().schema_labels(&schema))
}
