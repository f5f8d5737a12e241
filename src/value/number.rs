use std::{cmp::Ordering, fmt};

use tracing::debug;

use crate::ast::ArithmeticOperator;

use super::{format::general, TypeTag};

/// Numeric payload of a dynamic value, tagged with its storage kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// Rungs of the promotion ladder, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum NumberClass {
    Signed,
    Unsigned,
    Single,
    Double,
}

impl Number {
    pub fn class(self) -> NumberClass {
        match self {
            Number::I8(_) | Number::I16(_) | Number::I32(_) | Number::I64(_) => NumberClass::Signed,
            Number::U8(_) | Number::U16(_) | Number::U32(_) | Number::U64(_) => {
                NumberClass::Unsigned
            }
            Number::F32(_) => NumberClass::Single,
            Number::F64(_) => NumberClass::Double,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Number::I8(_) | Number::U8(_) => 8,
            Number::I16(_) | Number::U16(_) => 16,
            Number::I32(_) | Number::U32(_) | Number::F32(_) => 32,
            Number::I64(_) | Number::U64(_) | Number::F64(_) => 64,
        }
    }

    pub fn type_tag(self) -> TypeTag {
        match self {
            Number::I8(_) => TypeTag::Int8,
            Number::I16(_) => TypeTag::Int16,
            Number::I32(_) => TypeTag::Int32,
            Number::I64(_) => TypeTag::Int64,
            Number::U8(_) => TypeTag::UInt8,
            Number::U16(_) => TypeTag::UInt16,
            Number::U32(_) => TypeTag::UInt32,
            Number::U64(_) => TypeTag::UInt64,
            Number::F32(_) => TypeTag::Single,
            Number::F64(_) => TypeTag::Double,
        }
    }

    /// Exact integer value; `None` for floating kinds.
    pub fn as_i128(self) -> Option<i128> {
        match self {
            Number::I8(v) => Some(v.into()),
            Number::I16(v) => Some(v.into()),
            Number::I32(v) => Some(v.into()),
            Number::I64(v) => Some(v.into()),
            Number::U8(v) => Some(v.into()),
            Number::U16(v) => Some(v.into()),
            Number::U32(v) => Some(v.into()),
            Number::U64(v) => Some(v.into()),
            Number::F32(_) | Number::F64(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::F32(v) => v.into(),
            Number::F64(v) => v,
            other => other.as_i128().unwrap_or_default() as f64,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Number::F32(v) => v,
            Number::F64(v) => v as f32,
            other => other.as_i128().unwrap_or_default() as f32,
        }
    }

    pub fn is_zero(self) -> bool {
        match self.as_i128() {
            Some(v) => v == 0,
            None => self.as_f64() == 0.0,
        }
    }

    /// Applies `op`, promoting both operands to the wider kind.
    ///
    /// Returns `None` when the divisor of `/` or `%` is zero.
    pub fn apply(op: ArithmeticOperator, left: Number, right: Number) -> Option<Number> {
        if matches!(op, ArithmeticOperator::Divide | ArithmeticOperator::Modulo) && right.is_zero()
        {
            debug!(%op, ?left, "zero divisor");
            return None;
        }

        let class = left.class().max(right.class());
        let result = match class {
            NumberClass::Double => {
                Number::F64(float_op(op, left.as_f64(), right.as_f64()))
            }
            NumberClass::Single => Number::F32(float_op(op, left.as_f32(), right.as_f32())),
            NumberClass::Signed | NumberClass::Unsigned => {
                let (Some(l), Some(r)) = (left.as_i128(), right.as_i128()) else {
                    return None;
                };
                let exact = match op {
                    ArithmeticOperator::Add => l.checked_add(r),
                    ArithmeticOperator::Subtract => l.checked_sub(r),
                    ArithmeticOperator::Multiply => l.checked_mul(r),
                    ArithmeticOperator::Divide => l.checked_div(r),
                    ArithmeticOperator::Modulo => l.checked_rem(r),
                };
                let bits = left.bits().max(right.bits()).max(32);
                match exact {
                    Some(value) => narrow(value, class, bits),
                    None => Number::F64(float_op(op, left.as_f64(), right.as_f64())),
                }
            }
        };
        Some(result)
    }

    pub fn negate(self) -> Number {
        match self {
            Number::F32(v) => Number::F32(-v),
            Number::F64(v) => Number::F64(-v),
            other => {
                let value = other.as_i128().unwrap_or_default();
                narrow(-value, NumberClass::Signed, other.bits().max(32))
            }
        }
    }

    /// Numeric ordering after promotion. `None` only when a NaN is involved.
    pub fn compare(left: Number, right: Number) -> Option<Ordering> {
        match left.class().max(right.class()) {
            NumberClass::Double => left.as_f64().partial_cmp(&right.as_f64()),
            NumberClass::Single => left.as_f32().partial_cmp(&right.as_f32()),
            NumberClass::Signed | NumberClass::Unsigned => {
                Some(left.as_i128()?.cmp(&right.as_i128()?))
            }
        }
    }
}

trait FloatOps:
    Copy
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Rem<Output = Self>
{
}

impl FloatOps for f32 {}
impl FloatOps for f64 {}

fn float_op<T: FloatOps>(op: ArithmeticOperator, l: T, r: T) -> T {
    match op {
        ArithmeticOperator::Add => l + r,
        ArithmeticOperator::Subtract => l - r,
        ArithmeticOperator::Multiply => l * r,
        ArithmeticOperator::Divide => l / r,
        ArithmeticOperator::Modulo => l % r,
    }
}

/// Fits an exact integer result into the narrowest kind of `class` that is at
/// least `bits` wide, widening to 64 bits and then to double on overflow.
fn narrow(value: i128, class: NumberClass, bits: u32) -> Number {
    match class {
        NumberClass::Unsigned => {
            if bits <= 32 {
                if let Ok(v) = u32::try_from(value) {
                    return Number::U32(v);
                }
            }
            match u64::try_from(value) {
                Ok(v) => Number::U64(v),
                Err(_) => Number::F64(value as f64),
            }
        }
        _ => {
            if bits <= 32 {
                if let Ok(v) = i32::try_from(value) {
                    return Number::I32(v);
                }
            }
            match i64::try_from(value) {
                Ok(v) => Number::I64(v),
                Err(_) => Number::F64(value as f64),
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::F32(v) => f.write_str(&general(v.into(), 7)),
            Number::F64(v) => f.write_str(&general(v, 15)),
            other => write!(f, "{}", other.as_i128().unwrap_or_default()),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value)
                }
            }
        )*
    };
}

number_from!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
