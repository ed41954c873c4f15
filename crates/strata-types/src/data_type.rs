//! Column data type definitions

use crate::value::Value;

/// The closed set of column data types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    Text,
}

impl DataType {
    /// Check if this type holds numbers (everything except TEXT).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Text)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Long => write!(f, "LONG"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

/// Binds a Rust element type to its [`DataType`].
///
/// This is the static side of type dispatch: code that needs to run a hot
/// loop for a concrete element type resolves a [`DataType`] to one of the
/// five implementors (see [`resolve_data_type!`]) and monomorphizes on it.
pub trait ColumnType:
    Clone + Default + PartialEq + PartialOrd + std::fmt::Debug + Send + Sync + 'static
{
    const DATA_TYPE: DataType;

    /// Extract a typed element from a value of the exact matching type.
    /// Returns `None` for NULL and for any other data type; callers that
    /// want coercion cast the value first (`Value::cast_to`).
    fn from_value(value: &Value) -> Option<Self>;

    /// Wrap a typed element back into a [`Value`].
    fn into_value(self) -> Value;

    /// Heap bytes owned by this element beyond its inline size. Zero for
    /// the numeric types; strings report their buffer capacity.
    #[inline]
    fn heap_size(&self) -> usize {
        0
    }
}

macro_rules! column_type_impl {
    ($rust_type:ty, $data_type:ident, $variant:ident) => {
        impl ColumnType for $rust_type {
            const DATA_TYPE: DataType = DataType::$data_type;

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

column_type_impl!(i32, Int, Int);
column_type_impl!(i64, Long, Long);
column_type_impl!(f32, Float, Float);
column_type_impl!(f64, Double, Double);

impl ColumnType for String {
    const DATA_TYPE: DataType = DataType::Text;

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    #[inline]
    fn into_value(self) -> Value {
        Value::Text(self)
    }

    #[inline]
    fn heap_size(&self) -> usize {
        self.capacity()
    }
}

/// Resolve a [`DataType`] to its Rust element type and run `$body` with the
/// type bound to `$T`. Every arm is monomorphized, so the body can call
/// generic hot loops that the compiler inlines per type.
#[macro_export]
macro_rules! resolve_data_type {
    ($data_type:expr, $T:ident => $body:expr) => {
        match $data_type {
            $crate::DataType::Int => {
                type $T = i32;
                $body
            }
            $crate::DataType::Long => {
                type $T = i64;
                $body
            }
            $crate::DataType::Float => {
                type $T = f32;
                $body
            }
            $crate::DataType::Double => {
                type $T = f64;
                $body
            }
            $crate::DataType::Text => {
                type $T = String;
                $body
            }
        }
    };
}

/// Like [`resolve_data_type!`] but only for the numeric types. Callers must
/// have dispatched TEXT separately beforehand.
#[macro_export]
macro_rules! resolve_numeric_data_type {
    ($data_type:expr, $T:ident => $body:expr) => {
        match $data_type {
            $crate::DataType::Int => {
                type $T = i32;
                $body
            }
            $crate::DataType::Long => {
                type $T = i64;
                $body
            }
            $crate::DataType::Float => {
                type $T = f32;
                $body
            }
            $crate::DataType::Double => {
                type $T = f64;
                $body
            }
            $crate::DataType::Text => {
                unreachable!("text columns are dispatched before numeric resolution")
            }
        }
    };
}
