//! Tagged value representation
//!
//! A [`Value`] holds any supported column type or NULL. Comparison follows
//! SQL three-valued logic (see `comparison.rs`): anything compared with NULL
//! is UNKNOWN, which callers treat as "does not match".

mod comparison;
mod display;

use crate::data_type::DataType;

/// A single cell value: one of the supported column types, or NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Null,
}

impl Value {
    /// Check whether this value is NULL.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The data type of this value, or `None` for NULL (NULL carries no type).
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int(_) => Some(DataType::Int),
            Value::Long(_) => Some(DataType::Long),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::Text(_) => Some(DataType::Text),
            Value::Null => None,
        }
    }

    /// Check whether this value can be stored in a column of `data_type`.
    /// NULL is storable in any (nullable) column.
    pub fn matches_data_type(&self, data_type: DataType) -> bool {
        match self.data_type() {
            Some(own) => own == data_type,
            None => true,
        }
    }

    /// Cast this value to another data type.
    ///
    /// Numeric values convert freely between the numeric types (the widening
    /// and narrowing a scan needs to compare constants against a column of a
    /// different numeric type). TEXT only casts to TEXT; NULL stays NULL.
    /// Returns `None` for impossible casts (numeric to TEXT or vice versa).
    pub fn cast_to(&self, data_type: DataType) -> Option<Value> {
        if let Some(own) = self.data_type() {
            if own == data_type {
                return Some(self.clone());
            }
        }

        match (self, data_type) {
            (Value::Null, _) => Some(Value::Null),

            (Value::Int(v), DataType::Long) => Some(Value::Long(i64::from(*v))),
            (Value::Int(v), DataType::Float) => Some(Value::Float(*v as f32)),
            (Value::Int(v), DataType::Double) => Some(Value::Double(f64::from(*v))),

            (Value::Long(v), DataType::Int) => Some(Value::Int(*v as i32)),
            (Value::Long(v), DataType::Float) => Some(Value::Float(*v as f32)),
            (Value::Long(v), DataType::Double) => Some(Value::Double(*v as f64)),

            (Value::Float(v), DataType::Int) => Some(Value::Int(*v as i32)),
            (Value::Float(v), DataType::Long) => Some(Value::Long(*v as i64)),
            (Value::Float(v), DataType::Double) => Some(Value::Double(f64::from(*v))),

            (Value::Double(v), DataType::Int) => Some(Value::Int(*v as i32)),
            (Value::Double(v), DataType::Long) => Some(Value::Long(*v as i64)),
            (Value::Double(v), DataType::Float) => Some(Value::Float(*v as f32)),

            _ => None,
        }
    }
}
