//! MySQL schema discovery and statement templates.

use std::collections::HashMap;

use mysql_async::prelude::*;
use sync_core::{RecordTypeBuilder, Schema, SchemaError, Table};

use crate::types::{basic_type_to_mysql_ddl, mysql_type_to_basic_type};

/// One row of `INFORMATION_SCHEMA.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub table: String,
    pub column: String,
    /// Type name, e.g. `bigint`
    pub data_type: String,
    /// Full type, e.g. `tinyint(1)`
    pub column_type: String,
}

impl ColumnMetadata {
    pub fn new(table: &str, column: &str, data_type: &str, column_type: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            data_type: data_type.to_string(),
            column_type: column_type.to_string(),
        }
    }
}

/// Enumerate every column of every table in the connection's database,
/// ordered by table name then ordinal position.
pub async fn discover_columns(
    conn: &mut mysql_async::Conn,
) -> Result<Vec<ColumnMetadata>, mysql_async::Error> {
    let query = "
        SELECT TABLE_NAME, COLUMN_NAME, DATA_TYPE, COLUMN_TYPE
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        ORDER BY TABLE_NAME, ORDINAL_POSITION";

    let rows: Vec<(String, String, String, String)> = conn.query(query).await?;
    Ok(rows
        .into_iter()
        .map(|(table, column, data_type, column_type)| ColumnMetadata {
            table,
            column,
            data_type,
            column_type,
        })
        .collect())
}

/// Assemble discovered columns into a schema, one table per table name in
/// column order.
///
/// Any column whose type has no mapping fails the whole schema.
pub fn build_schema(columns: &[ColumnMetadata]) -> Result<Schema, SchemaError> {
    let mut tables: Vec<(String, RecordTypeBuilder)> = Vec::new();
    let mut table_map: HashMap<String, usize> = HashMap::new();

    for column in columns {
        let basic_type = mysql_type_to_basic_type(&column.data_type, &column.column_type)
            .ok_or_else(|| SchemaError::UnsupportedType {
                table: column.table.clone(),
                column: column.column.clone(),
                native_type: column.column_type.clone(),
            })?;

        let index = *table_map.entry(column.table.clone()).or_insert_with(|| {
            tables.push((column.table.clone(), RecordTypeBuilder::new()));
            tables.len() - 1
        });
        tables[index].1.add_field(&column.column, basic_type);
    }

    let tables = tables
        .into_iter()
        .map(|(name, builder)| Ok(Table::new(name, builder.build()?)))
        .collect::<Result<Vec<_>, SchemaError>>()?;
    Schema::new(tables)
}

/// Parameterized conflict-skipping insert for one row of `table`.
///
/// Columns appear in field order, e.g.
/// `INSERT IGNORE INTO orders(id,name) VALUES (?,?)`.
pub fn insert_template(table: &Table) -> String {
    let fields = table.record_type.fields();
    let columns: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let placeholders = vec!["?"; fields.len()];
    format!(
        "INSERT IGNORE INTO {}({}) VALUES ({})",
        table.name,
        columns.join(","),
        placeholders.join(",")
    )
}

/// `CREATE TABLE` statement for `table`, with an optional primary key column.
pub fn create_table_ddl(table: &Table, primary_key: Option<&str>) -> String {
    let mut definitions: Vec<String> = table
        .record_type
        .fields()
        .iter()
        .map(|f| format!("{} {}", f.name, basic_type_to_mysql_ddl(f.field_type)))
        .collect();
    if let Some(key) = primary_key {
        definitions.push(format!("PRIMARY KEY ({key})"));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.name,
        definitions.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::{BasicType, Field};

    #[test]
    fn test_orders_round_trip() {
        let columns = vec![
            ColumnMetadata::new("orders", "id", "bigint", "bigint"),
            ColumnMetadata::new("orders", "name", "varchar", "varchar(255)"),
        ];
        let schema = build_schema(&columns).unwrap();

        assert_eq!(schema.len(), 1);
        let orders = schema.get_table("orders").unwrap();
        assert_eq!(
            orders.record_type.fields(),
            &[
                Field::new("id", BasicType::Long),
                Field::new("name", BasicType::String)
            ]
        );
        assert_eq!(
            insert_template(orders),
            "INSERT IGNORE INTO orders(id,name) VALUES (?,?)"
        );
    }

    #[test]
    fn test_multiple_tables_keep_column_order() {
        let columns = vec![
            ColumnMetadata::new("a", "z", "int", "int"),
            ColumnMetadata::new("a", "y", "blob", "blob"),
            ColumnMetadata::new("b", "flag", "tinyint", "tinyint(1)"),
        ];
        let schema = build_schema(&columns).unwrap();

        assert_eq!(schema.table_names(), vec!["a", "b"]);
        assert_eq!(
            schema.get_table("a").unwrap().record_type.field_names(),
            vec!["z", "y"]
        );
        assert_eq!(
            schema.get_table("b").unwrap().record_type.fields()[0].field_type,
            BasicType::Boolean
        );
    }

    #[test]
    fn test_unsupported_type_fails_schema() {
        let columns = vec![
            ColumnMetadata::new("places", "id", "int", "int"),
            ColumnMetadata::new("places", "location", "point", "point"),
        ];
        assert_eq!(
            build_schema(&columns).unwrap_err(),
            SchemaError::UnsupportedType {
                table: "places".to_string(),
                column: "location".to_string(),
                native_type: "point".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_database() {
        assert!(build_schema(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_create_table_ddl() {
        let columns = vec![
            ColumnMetadata::new("orders", "id", "bigint", "bigint"),
            ColumnMetadata::new("orders", "paid", "tinyint", "tinyint(1)"),
        ];
        let schema = build_schema(&columns).unwrap();
        let orders = schema.get_table("orders").unwrap();

        assert_eq!(
            create_table_ddl(orders, Some("id")),
            "CREATE TABLE IF NOT EXISTS orders (id BIGINT, paid TINYINT(1), PRIMARY KEY (id))"
        );
    }
}
