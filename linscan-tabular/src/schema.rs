//! Column descriptors and table schemas.
//!
//! A table schema is an ordered list of [`ColumnDesc`]s. Column order is
//! significant: rows are positional tuples and a projection is expressed as a
//! list of column indices into the schema.
//!
//! # Design
//!
//! - **Type vocabulary**: column types use the platform's type strings
//!   (`"int32"`, `"double"`, ...) both on the wire and in config files
//! - **Name lookup**: names are unique, so lookup by name is unambiguous
//! - **Validation on write**: rows are checked against the schema when they are
//!   appended, so readers never re-validate

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabularError};
use crate::value::{Row, Value};

/// Column value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    /// 32-bit float; stored widened to `f64`.
    Float,
    Double,
    String,
}

impl FieldType {
    /// Parse from a type string (e.g., "int32", "double").
    pub fn from_type_str(type_str: &str) -> Option<Self> {
        match type_str {
            "boolean" => Some(Self::Boolean),
            "uint8" => Some(Self::UInt8),
            "int16" => Some(Self::Int16),
            "uint16" => Some(Self::UInt16),
            "int32" => Some(Self::Int32),
            "uint32" => Some(Self::UInt32),
            "int64" => Some(Self::Int64),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// The canonical type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Inclusive value bounds for integer types, `None` otherwise.
    pub fn int_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::UInt8 => Some((0, u8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::UInt16 => Some((0, u16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::UInt32 => Some((0, u32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.int_bounds().is_some()
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_type_str(s).ok_or_else(|| TabularError::UnknownType(s.to_string()))
    }
}

/// Description of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    /// Column name (unique within a schema).
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the column accepts nulls.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDesc {
    /// A non-nullable column.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// Mark the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Check a value against this column, widening integers for float columns.
    pub fn conform(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(TabularError::value(format!(
                    "column '{}' is not nullable",
                    self.name
                )))
            };
        }

        match (self.field_type, value) {
            (FieldType::Boolean, v @ Value::Bool(_)) => Ok(v),
            (FieldType::String, v @ Value::String(_)) => Ok(v),
            (ft, Value::Float(f)) if ft.is_floating() => Ok(Value::Float(f)),
            (ft, Value::Int(i)) if ft.is_floating() => Ok(Value::Float(i as f64)),
            (ft, Value::Int(i)) if ft.is_integer() => {
                let (lo, hi) = ft.int_bounds().unwrap_or((i64::MIN, i64::MAX));
                if i < lo || i > hi {
                    Err(TabularError::value(format!(
                        "value {} out of range for {} column '{}'",
                        i, ft, self.name
                    )))
                } else {
                    Ok(Value::Int(i))
                }
            }
            (ft, v) => Err(TabularError::value(format!(
                "{} value does not conform to {} column '{}'",
                v.kind(),
                ft,
                self.name
            ))),
        }
    }
}

/// Parse a `name:type` column specification (e.g., `"rand_value:int32"`).
///
/// A trailing `?` on the type marks the column nullable (`"note:string?"`).
impl FromStr for ColumnDesc {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, type_str) = s.split_once(':').ok_or_else(|| {
            TabularError::schema(format!("expected name:type column spec, got '{}'", s))
        })?;
        let (type_str, nullable) = match type_str.strip_suffix('?') {
            Some(t) => (t, true),
            None => (type_str, false),
        };
        let field_type: FieldType = type_str.trim().parse()?;
        let mut desc = ColumnDesc::new(name.trim(), field_type);
        desc.nullable = nullable;
        Ok(desc)
    }
}

/// Ordered table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnDesc>,
    name_to_index: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a schema from column descriptors.
    ///
    /// Fails on empty or duplicate column names.
    pub fn new(columns: Vec<ColumnDesc>) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if col.name.is_empty() {
                return Err(TabularError::schema(format!("column {} has an empty name", i)));
            }
            if name_to_index.insert(col.name.clone(), i).is_some() {
                return Err(TabularError::schema(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self {
            columns,
            name_to_index,
        })
    }

    /// Column descriptors in order.
    #[inline]
    pub fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    /// Number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get column index by name.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get column by index.
    #[inline]
    pub fn column(&self, index: usize) -> Option<&ColumnDesc> {
        self.columns.get(index)
    }

    /// Schema restricted to the given column indices, in that order.
    pub fn project(&self, indices: &[usize]) -> Result<Self> {
        let columns = indices
            .iter()
            .map(|&i| {
                self.columns.get(i).cloned().ok_or_else(|| {
                    TabularError::schema(format!("column index {} out of bounds", i))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    /// Validate a row, returning it with values coerced to their column types.
    pub fn conform_row(&self, row: Row) -> Result<Row> {
        if row.len() != self.columns.len() {
            return Err(TabularError::schema(format!(
                "row has {} values, schema has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        row.into_iter()
            .zip(&self.columns)
            .map(|(value, col)| col.conform(value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnDesc::new("id", FieldType::Int64),
            ColumnDesc::new("name", FieldType::String).nullable(),
            ColumnDesc::new("score", FieldType::Double),
        ])
        .unwrap()
    }

    #[test]
    fn test_field_type_parsing() {
        assert_eq!(FieldType::from_type_str("int32"), Some(FieldType::Int32));
        assert_eq!(FieldType::from_type_str("uint8"), Some(FieldType::UInt8));
        assert_eq!(FieldType::from_type_str("double"), Some(FieldType::Double));
        assert_eq!(FieldType::from_type_str("int"), None);
        assert!("decimal".parse::<FieldType>().is_err());

        for ft in [FieldType::Boolean, FieldType::UInt16, FieldType::Float] {
            assert_eq!(ft.as_str().parse::<FieldType>().unwrap(), ft);
        }
    }

    #[test]
    fn test_schema_lookup() {
        let schema = sample_schema();
        assert_eq!(schema.index_of("id"), Some(0));
        assert_eq!(schema.index_of("score"), Some(2));
        assert_eq!(schema.index_of("unknown"), None);
        assert_eq!(schema.column(1).unwrap().name, "name");
        assert!(schema.column(3).is_none());
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let dup = TableSchema::new(vec![
            ColumnDesc::new("v", FieldType::Int32),
            ColumnDesc::new("v", FieldType::Int64),
        ]);
        assert!(matches!(dup, Err(TabularError::Schema(_))));

        let empty = TableSchema::new(vec![ColumnDesc::new("", FieldType::Int32)]);
        assert!(empty.is_err());
    }

    #[test]
    fn test_project() {
        let schema = sample_schema();
        let projected = schema.project(&[2, 0]).unwrap();
        assert_eq!(projected.num_columns(), 2);
        assert_eq!(projected.column(0).unwrap().name, "score");
        assert_eq!(projected.index_of("id"), Some(1));
        assert!(schema.project(&[5]).is_err());
    }

    #[test]
    fn test_conform_row() {
        let schema = sample_schema();

        let row = schema
            .conform_row(vec![Value::Int(1), Value::Null, Value::Int(3)])
            .unwrap();
        assert_eq!(row[2], Value::Float(3.0));

        // null in a non-nullable column
        assert!(schema
            .conform_row(vec![Value::Null, Value::Null, Value::Float(1.0)])
            .is_err());
        // wrong arity
        assert!(schema.conform_row(vec![Value::Int(1)]).is_err());
        // wrong type
        assert!(schema
            .conform_row(vec![Value::from("x"), Value::Null, Value::Float(1.0)])
            .is_err());
    }

    #[test]
    fn test_integer_bounds() {
        let col = ColumnDesc::new("b", FieldType::UInt8);
        assert!(col.conform(Value::Int(255)).is_ok());
        assert!(col.conform(Value::Int(256)).is_err());
        assert!(col.conform(Value::Int(-1)).is_err());

        let col = ColumnDesc::new("i", FieldType::Int32);
        assert!(col.conform(Value::Int(i32::MIN as i64)).is_ok());
        assert!(col.conform(Value::Int(i32::MAX as i64 + 1)).is_err());
        assert!(col.conform(Value::Float(1.5)).is_err());
    }

    #[test]
    fn test_column_spec_parsing() {
        let desc: ColumnDesc = "rand_value:int32".parse().unwrap();
        assert_eq!(desc, ColumnDesc::new("rand_value", FieldType::Int32));

        let desc: ColumnDesc = "note:string?".parse().unwrap();
        assert!(desc.nullable);

        assert!("novalue".parse::<ColumnDesc>().is_err());
        assert!(matches!(
            "x:int".parse::<ColumnDesc>(),
            Err(TabularError::UnknownType(_))
        ));
    }

    #[test]
    fn test_column_desc_json() {
        let desc: ColumnDesc =
            serde_json::from_str(r#"{"name": "rand_value", "type": "int32"}"#).unwrap();
        assert_eq!(desc.field_type, FieldType::Int32);
        assert!(!desc.nullable);
    }
}
