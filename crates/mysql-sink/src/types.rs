//! MySQL column type conversion.
//!
//! Maps `INFORMATION_SCHEMA.COLUMNS` types to [`BasicType`] and back, and
//! converts record values into driver parameters.

use mysql_async::Value as MySQLValue;
use sync_core::{BasicType, Value};

/// Convert a MySQL column type to a `BasicType`.
///
/// # Arguments
///
/// * `data_type` - The MySQL data type name (e.g., "INT", "VARCHAR")
/// * `column_type` - The full column type (e.g., "int(11)", "tinyint(1)")
///
/// Returns `None` for types without a mapping (spatial types, multi-bit
/// `BIT`, ...).
///
/// # Example
///
/// ```
/// use shardsync_mysql_sink::mysql_type_to_basic_type;
/// use sync_core::BasicType;
///
/// assert_eq!(mysql_type_to_basic_type("BIGINT", "bigint"), Some(BasicType::Long));
///
/// // TINYINT(1) is treated as boolean in MySQL
/// assert_eq!(mysql_type_to_basic_type("TINYINT", "tinyint(1)"), Some(BasicType::Boolean));
/// ```
pub fn mysql_type_to_basic_type(data_type: &str, column_type: &str) -> Option<BasicType> {
    let column_type = column_type.to_lowercase();
    let basic_type = match data_type.to_lowercase().as_str() {
        "tinyint" if column_type.starts_with("tinyint(1)") => BasicType::Boolean,
        "bit" if column_type == "bit(1)" => BasicType::Boolean,
        "bool" | "boolean" => BasicType::Boolean,

        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "year" => BasicType::Int,
        "bigint" => BasicType::Long,
        "float" => BasicType::Float,
        "double" | "real" => BasicType::Double,

        "decimal" | "numeric" | "char" | "varchar" | "tinytext" | "text" | "mediumtext"
        | "longtext" | "enum" | "set" | "json" | "date" | "time" | "datetime" | "timestamp" => {
            BasicType::String
        }

        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            BasicType::Binary
        }

        _ => return None,
    };
    Some(basic_type)
}

/// MySQL column type used when creating a table for a `BasicType`.
pub fn basic_type_to_mysql_ddl(basic_type: BasicType) -> &'static str {
    match basic_type {
        BasicType::Boolean => "TINYINT(1)",
        BasicType::Int => "INT",
        BasicType::Long => "BIGINT",
        BasicType::Float => "FLOAT",
        BasicType::Double => "DOUBLE",
        BasicType::String => "TEXT",
        BasicType::Binary => "BLOB",
    }
}

/// Convert a record value into a statement parameter.
pub fn to_mysql_value(value: &Value) -> MySQLValue {
    match value {
        Value::Bool(b) => MySQLValue::Int(i64::from(*b)),
        Value::Int(i) => MySQLValue::Int(i64::from(*i)),
        Value::Long(i) => MySQLValue::Int(*i),
        Value::Float(f) => MySQLValue::Float(*f),
        Value::Double(d) => MySQLValue::Double(*d),
        Value::String(s) => MySQLValue::Bytes(s.as_bytes().to_vec()),
        Value::Binary(b) => MySQLValue::Bytes(b.clone()),
        Value::Null => MySQLValue::NULL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_types() {
        assert_eq!(
            mysql_type_to_basic_type("INT", "int(11)"),
            Some(BasicType::Int)
        );
        assert_eq!(
            mysql_type_to_basic_type("tinyint", "tinyint(4)"),
            Some(BasicType::Int)
        );
        assert_eq!(
            mysql_type_to_basic_type("year", "year"),
            Some(BasicType::Int)
        );
        assert_eq!(
            mysql_type_to_basic_type("bigint", "bigint unsigned"),
            Some(BasicType::Long)
        );
    }

    #[test]
    fn test_boolean_types() {
        assert_eq!(
            mysql_type_to_basic_type("tinyint", "tinyint(1)"),
            Some(BasicType::Boolean)
        );
        assert_eq!(
            mysql_type_to_basic_type("bit", "bit(1)"),
            Some(BasicType::Boolean)
        );
        assert_eq!(
            mysql_type_to_basic_type("BOOLEAN", "tinyint(1)"),
            Some(BasicType::Boolean)
        );
        assert_eq!(mysql_type_to_basic_type("bit", "bit(8)"), None);
    }

    #[test]
    fn test_floating_types() {
        assert_eq!(
            mysql_type_to_basic_type("float", "float"),
            Some(BasicType::Float)
        );
        assert_eq!(
            mysql_type_to_basic_type("real", "double"),
            Some(BasicType::Double)
        );
    }

    #[test]
    fn test_text_and_binary_types() {
        for data_type in ["varchar", "TEXT", "decimal", "json", "datetime", "enum", "set"] {
            assert_eq!(
                mysql_type_to_basic_type(data_type, data_type),
                Some(BasicType::String),
                "{data_type}"
            );
        }
        for data_type in ["binary", "VARBINARY", "blob", "longblob"] {
            assert_eq!(
                mysql_type_to_basic_type(data_type, data_type),
                Some(BasicType::Binary),
                "{data_type}"
            );
        }
    }

    #[test]
    fn test_unmapped_types() {
        assert_eq!(mysql_type_to_basic_type("geometry", "geometry"), None);
        assert_eq!(mysql_type_to_basic_type("point", "point"), None);
    }

    #[test]
    fn test_ddl_types_map_back() {
        for basic_type in BasicType::ALL {
            let ddl = basic_type_to_mysql_ddl(basic_type);
            let data_type = ddl.split('(').next().unwrap_or(ddl);
            assert_eq!(
                mysql_type_to_basic_type(data_type, &ddl.to_lowercase()),
                Some(basic_type)
            );
        }
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(to_mysql_value(&Value::Bool(true)), MySQLValue::Int(1));
        assert_eq!(to_mysql_value(&Value::Int(-3)), MySQLValue::Int(-3));
        assert_eq!(
            to_mysql_value(&Value::String("hi".to_string())),
            MySQLValue::Bytes(b"hi".to_vec())
        );
        assert_eq!(to_mysql_value(&Value::Null), MySQLValue::NULL);
    }
}
