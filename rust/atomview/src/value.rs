//! Element values exchanged with accessors.

/// Interpretation of an element's bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Two's complement signed integer.
    Integer,
    /// IEEE 754 binary floating point.
    Float,
}

/// Static type of an argument or a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Result of compare-and-set style modes.
    Bool,
    /// Result of setters.
    Unit,
}

impl ValueType {
    /// Returns the element type for a `(kind, width)` pair, if there is one.
    pub fn element(kind: ElementKind, width: usize) -> Option<ValueType> {
        match (kind, width) {
            (ElementKind::Integer, 1) => Some(ValueType::I8),
            (ElementKind::Integer, 2) => Some(ValueType::I16),
            (ElementKind::Integer, 4) => Some(ValueType::I32),
            (ElementKind::Integer, 8) => Some(ValueType::I64),
            (ElementKind::Float, 4) => Some(ValueType::F32),
            (ElementKind::Float, 8) => Some(ValueType::F64),
            _ => None,
        }
    }

    /// Width in bytes of an element type; `None` for `Bool` and `Unit`.
    pub fn width(self) -> Option<usize> {
        match self {
            ValueType::I8 => Some(1),
            ValueType::I16 => Some(2),
            ValueType::I32 | ValueType::F32 => Some(4),
            ValueType::I64 | ValueType::F64 => Some(8),
            ValueType::Bool | ValueType::Unit => None,
        }
    }

    pub fn kind(self) -> Option<ElementKind> {
        match self {
            ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64 => {
                Some(ElementKind::Integer)
            }
            ValueType::F32 | ValueType::F64 => Some(ElementKind::Float),
            ValueType::Bool | ValueType::Unit => None,
        }
    }

    /// Returns `true` if a value of type `self` converts to `target` without loss
    /// under the generic calling convention (identity, integer sign extension,
    /// `F32` to `F64`).
    pub fn widens_to(self, target: ValueType) -> bool {
        if self == target {
            return true;
        }
        match (self.kind(), target.kind()) {
            (Some(ElementKind::Integer), Some(ElementKind::Integer))
            | (Some(ElementKind::Float), Some(ElementKind::Float)) => {
                self.width() < target.width()
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Unit,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::Bool(_) => ValueType::Bool,
            Value::Unit => ValueType::Unit,
        }
    }

    /// Returns the raw bit pattern of an element value, zero-extended to 64 bits.
    pub fn to_bits(&self) -> Option<u64> {
        match *self {
            Value::I8(v) => Some(v as u8 as u64),
            Value::I16(v) => Some(v as u16 as u64),
            Value::I32(v) => Some(v as u32 as u64),
            Value::I64(v) => Some(v as u64),
            Value::F32(v) => Some(v.to_bits() as u64),
            Value::F64(v) => Some(v.to_bits()),
            Value::Bool(_) | Value::Unit => None,
        }
    }

    /// Builds an element value of type `ty` from the low bits of `bits`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not an element type.
    pub fn from_bits(ty: ValueType, bits: u64) -> Value {
        match ty {
            ValueType::I8 => Value::I8(bits as u8 as i8),
            ValueType::I16 => Value::I16(bits as u16 as i16),
            ValueType::I32 => Value::I32(bits as u32 as i32),
            ValueType::I64 => Value::I64(bits as i64),
            ValueType::F32 => Value::F32(f32::from_bits(bits as u32)),
            ValueType::F64 => Value::F64(f64::from_bits(bits)),
            ValueType::Bool | ValueType::Unit => panic!("{ty} is not an element type"),
        }
    }

    /// Converts the value to `target` if it widens to it (see [`ValueType::widens_to`]).
    pub fn widen_to(&self, target: ValueType) -> Option<Value> {
        if !self.value_type().widens_to(target) {
            return None;
        }
        let widened = match (*self, target) {
            (v, t) if v.value_type() == t => v,
            (Value::F32(v), ValueType::F64) => Value::F64(v as f64),
            (v, t) => Value::from_bits(t, v.as_i64()? as u64),
        };
        Some(widened)
    }

    /// Returns `true` if both values are of the same type and have identical bits.
    pub fn bit_eq(&self, other: &Value) -> bool {
        self.value_type() == other.value_type()
            && match (self.to_bits(), other.to_bits()) {
                (Some(a), Some(b)) => a == b,
                _ => self == other,
            }
    }

    fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{v:#04x}i8"),
            Value::I16(v) => write!(f, "{v:#06x}i16"),
            Value::I32(v) => write!(f, "{v:#010x}i32"),
            Value::I64(v) => write!(f, "{v:#018x}i64"),
            Value::F32(v) => write!(f, "{v}f32 ({:#010x})", v.to_bits()),
            Value::F64(v) => write!(f, "{v}f64 ({:#018x})", v.to_bits()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Unit => f.write_str("()"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Rust types that can be stored as memory view elements.
///
/// Implemented for `i8`, `i16`, `i32`, `i64`, `f32` and `f64` only; the trait is
/// sealed.
pub trait Element:
    sealed::Sealed + Copy + bytemuck::Pod + std::fmt::Debug + Send + Sync + 'static
{
    const TYPE: ValueType;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const TYPE: ValueType = ValueType::$variant;

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i8, I8);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(f32, F32);
impl_element!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_round_trip() {
        for v in [
            Value::I8(-2),
            Value::I16(-300),
            Value::I32(0x0102_0304),
            Value::I64(-1),
            Value::F32(-1.5),
            Value::F64(f64::NAN),
        ] {
            let bits = v.to_bits().unwrap();
            assert!(Value::from_bits(v.value_type(), bits).bit_eq(&v));
        }
        assert_eq!(Value::I8(-1).to_bits(), Some(0xff));
        assert_eq!(Value::Bool(true).to_bits(), None);
    }

    #[test]
    fn test_nan_bit_identity() {
        let a = Value::F64(f64::NAN);
        assert_ne!(a, a);
        assert!(a.bit_eq(&a));
        assert!(!Value::F32(0.0).bit_eq(&Value::F32(-0.0)));
    }

    #[test]
    fn test_widening() {
        assert_eq!(Value::I8(-1).widen_to(ValueType::I64), Some(Value::I64(-1)));
        assert_eq!(
            Value::I16(0x1234).widen_to(ValueType::I32),
            Some(Value::I32(0x1234))
        );
        assert_eq!(Value::F32(1.5).widen_to(ValueType::F64), Some(Value::F64(1.5)));
        assert_eq!(Value::I64(1).widen_to(ValueType::I32), None);
        assert_eq!(Value::I32(1).widen_to(ValueType::F64), None);
        assert_eq!(Value::Bool(true).widen_to(ValueType::Bool), Some(Value::Bool(true)));
    }

    #[test]
    fn test_element_types() {
        assert_eq!(
            ValueType::element(ElementKind::Integer, 2),
            Some(ValueType::I16)
        );
        assert_eq!(ValueType::element(ElementKind::Float, 2), None);
        assert_eq!(<f32 as Element>::TYPE.width(), Some(4));
        assert_eq!(i64::from_value(Value::I64(7)), Some(7));
        assert_eq!(i64::from_value(Value::I32(7)), None);
    }
}
