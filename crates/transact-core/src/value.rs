//! Runtime SQL values.
//!
//! A [`Value`] pairs a SQL type tag with a payload; NULL keeps its
//! type tag so `DECLARE @v INT` observably yields a typed NULL.
//! Arithmetic, concatenation, truthiness, and SQL three-valued
//! comparison live here; the expression evaluator builds on them.

use core::cmp::Ordering;
use core::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// SQL type tags carried by runtime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlType {
    /// 1-byte unsigned integer.
    TinyInt,
    /// 2-byte integer.
    SmallInt,
    /// 4-byte integer.
    Int,
    /// 8-byte integer.
    BigInt,
    /// Exact numeric; payload carried as `f64`.
    Decimal,
    /// Approximate numeric.
    Float,
    /// Bit / boolean.
    Bit,
    /// Variable-length string.
    VarChar,
    /// Variable-length Unicode string.
    NVarChar,
    /// Fixed-length string.
    Char,
    /// Fixed-length Unicode string.
    NChar,
    /// Unbounded text.
    Text,
    /// Date and time.
    DateTime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Binary data.
    Binary,
    /// GUID.
    UniqueIdentifier,
    /// Type not known (backend rows without type info, untyped NULLs).
    #[default]
    Unknown,
}

impl SqlType {
    /// Returns true for the integer family and BIT.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Int | Self::BigInt | Self::Bit
        )
    }

    /// Returns true for any numeric type.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal | Self::Float)
    }

    /// Returns true for any character type.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            Self::VarChar
                | Self::NVarChar
                | Self::Char
                | Self::NChar
                | Self::Text
                | Self::UniqueIdentifier
        )
    }

    /// The T-SQL name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Float => "FLOAT",
            Self::Bit => "BIT",
            Self::VarChar => "VARCHAR",
            Self::NVarChar => "NVARCHAR",
            Self::Char => "CHAR",
            Self::NChar => "NCHAR",
            Self::Text => "TEXT",
            Self::DateTime => "DATETIME",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Binary => "VARBINARY",
            Self::UniqueIdentifier => "UNIQUEIDENTIFIER",
            Self::Unknown => "SQL_VARIANT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    /// NULL of any type.
    Null,
    /// Integer payload (INT/BIGINT/BIT).
    Int(i64),
    /// Floating payload (FLOAT/DECIMAL).
    Float(f64),
    /// String payload.
    String(String),
    /// Binary payload.
    Bytes(Vec<u8>),
    /// Date and time payload.
    DateTime(NaiveDateTime),
    /// Date payload.
    Date(NaiveDate),
    /// Time payload.
    Time(NaiveTime),
}

/// Errors raised by value operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Division (or modulo) by zero.
    DivideByZero,
    /// An operation between incompatible types.
    TypeMismatch {
        /// Operation description.
        operation: &'static str,
        /// Left-hand type.
        left: SqlType,
        /// Right-hand type.
        right: SqlType,
    },
    /// A cast that cannot be performed.
    InvalidCast {
        /// Source type.
        from: SqlType,
        /// Target type.
        to: SqlType,
        /// Offending rendering of the value.
        value: String,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivideByZero => write!(f, "Division by zero"),
            Self::TypeMismatch {
                operation,
                left,
                right,
            } => write!(f, "Cannot {operation} {left} and {right}"),
            Self::InvalidCast { from, to, value } => {
                write!(f, "Cannot convert {from} value '{value}' to {to}")
            }
        }
    }
}

impl std::error::Error for ValueError {}

/// A tagged runtime value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// The SQL type tag.
    pub ty: SqlType,
    /// The payload; `ValueData::Null` for NULL of any type.
    pub data: ValueData,
}

impl Value {
    /// Creates a typed NULL.
    #[must_use]
    pub const fn null_of(ty: SqlType) -> Self {
        Self {
            ty,
            data: ValueData::Null,
        }
    }

    /// Creates an untyped NULL.
    #[must_use]
    pub const fn null() -> Self {
        Self::null_of(SqlType::Unknown)
    }

    /// Creates an INT value.
    #[must_use]
    pub const fn int(v: i64) -> Self {
        Self {
            ty: SqlType::Int,
            data: ValueData::Int(v),
        }
    }

    /// Creates a BIGINT value.
    #[must_use]
    pub const fn bigint(v: i64) -> Self {
        Self {
            ty: SqlType::BigInt,
            data: ValueData::Int(v),
        }
    }

    /// Creates a BIT value.
    #[must_use]
    pub const fn bit(v: bool) -> Self {
        Self {
            ty: SqlType::Bit,
            data: ValueData::Int(v as i64),
        }
    }

    /// Creates a FLOAT value.
    #[must_use]
    pub const fn float(v: f64) -> Self {
        Self {
            ty: SqlType::Float,
            data: ValueData::Float(v),
        }
    }

    /// Creates a DECIMAL value (payload carried as `f64`).
    #[must_use]
    pub const fn decimal(v: f64) -> Self {
        Self {
            ty: SqlType::Decimal,
            data: ValueData::Float(v),
        }
    }

    /// Creates a VARCHAR value.
    #[must_use]
    pub fn varchar(v: impl Into<String>) -> Self {
        Self {
            ty: SqlType::VarChar,
            data: ValueData::String(v.into()),
        }
    }

    /// Creates an NVARCHAR value.
    #[must_use]
    pub fn nvarchar(v: impl Into<String>) -> Self {
        Self {
            ty: SqlType::NVarChar,
            data: ValueData::String(v.into()),
        }
    }

    /// Creates a VARBINARY value.
    #[must_use]
    pub const fn binary(v: Vec<u8>) -> Self {
        Self {
            ty: SqlType::Binary,
            data: ValueData::Bytes(v),
        }
    }

    /// Creates a DATETIME value.
    #[must_use]
    pub const fn datetime(v: NaiveDateTime) -> Self {
        Self {
            ty: SqlType::DateTime,
            data: ValueData::DateTime(v),
        }
    }

    /// Creates a DATE value.
    #[must_use]
    pub const fn date(v: NaiveDate) -> Self {
        Self {
            ty: SqlType::Date,
            data: ValueData::Date(v),
        }
    }

    /// Creates a TIME value.
    #[must_use]
    pub const fn time(v: NaiveTime) -> Self {
        Self {
            ty: SqlType::Time,
            data: ValueData::Time(v),
        }
    }

    /// Returns true if the value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.data, ValueData::Null)
    }

    /// Returns the value as an integer, coercing where SQL would.
    ///
    /// NULL yields `None`; non-numeric strings yield `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i64> {
        match &self.data {
            ValueData::Null => None,
            ValueData::Int(i) => Some(*i),
            ValueData::Float(f) => Some(*f as i64),
            ValueData::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Returns the value as a float, coercing where SQL would.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match &self.data {
            ValueData::Null => None,
            ValueData::Int(i) => Some(*i as f64),
            ValueData::Float(f) => Some(*f),
            ValueData::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Renders the value as a string; NULL renders as the empty string.
    #[must_use]
    pub fn as_string(&self) -> String {
        match &self.data {
            ValueData::Null => String::new(),
            ValueData::Int(i) => i.to_string(),
            ValueData::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
            ValueData::String(s) => s.clone(),
            ValueData::Bytes(b) => {
                let mut out = String::with_capacity(2 + b.len() * 2);
                out.push_str("0x");
                for byte in b {
                    out.push_str(&format!("{byte:02X}"));
                }
                out
            }
            ValueData::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            ValueData::Date(d) => d.format("%Y-%m-%d").to_string(),
            ValueData::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }

    /// T-SQL truthiness: non-zero numerics are true, non-empty strings
    /// other than "0" and "false" are true, NULL is false.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match &self.data {
            ValueData::Null => false,
            ValueData::Int(i) => *i != 0,
            ValueData::Float(f) => *f != 0.0,
            ValueData::String(s) => {
                !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
            }
            ValueData::Bytes(b) => !b.is_empty(),
            ValueData::DateTime(_) | ValueData::Date(_) | ValueData::Time(_) => true,
        }
    }

    /// Returns true if either side of an operation should use string
    /// semantics (`+` concatenates).
    fn concatenates_with(&self, other: &Self) -> bool {
        matches!(self.data, ValueData::String(_)) || matches!(other.data, ValueData::String(_))
    }

    /// The numeric result type for an arithmetic operation:
    /// int/decimal mixes promote to decimal, decimal/float to float.
    fn numeric_result_type(&self, other: &Self) -> SqlType {
        let promote = |ty: SqlType| match ty {
            SqlType::Float => 2_u8,
            SqlType::Decimal => 1,
            _ => 0,
        };
        match promote(self.ty).max(promote(other.ty)) {
            2 => SqlType::Float,
            1 => SqlType::Decimal,
            _ => {
                if self.ty == SqlType::BigInt || other.ty == SqlType::BigInt {
                    SqlType::BigInt
                } else {
                    SqlType::Int
                }
            }
        }
    }

    /// SQL addition: NULL-propagating; concatenation when either
    /// operand is a string.
    pub fn add(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::null_of(self.numeric_result_type(other)));
        }
        if self.concatenates_with(other) {
            let ty = if self.ty.is_string() { self.ty } else { other.ty };
            return Ok(Self {
                ty,
                data: ValueData::String(self.as_string() + &other.as_string()),
            });
        }
        self.arithmetic(other, "add", |a, b| Some(a + b), |a, b| a.checked_add(b))
    }

    /// SQL subtraction.
    pub fn sub(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::null_of(self.numeric_result_type(other)));
        }
        self.arithmetic(other, "subtract", |a, b| Some(a - b), |a, b| {
            a.checked_sub(b)
        })
    }

    /// SQL multiplication.
    pub fn mul(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::null_of(self.numeric_result_type(other)));
        }
        self.arithmetic(other, "multiply", |a, b| Some(a * b), |a, b| {
            a.checked_mul(b)
        })
    }

    /// SQL division. Integer division between integer operands;
    /// dividing by zero is an error.
    pub fn div(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::null_of(self.numeric_result_type(other)));
        }
        if other.as_float() == Some(0.0) {
            return Err(ValueError::DivideByZero);
        }
        self.arithmetic(
            other,
            "divide",
            |a, b| if b == 0.0 { None } else { Some(a / b) },
            |a, b| a.checked_div(b),
        )
    }

    /// SQL modulo.
    pub fn modulo(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::null_of(self.numeric_result_type(other)));
        }
        if other.as_float() == Some(0.0) {
            return Err(ValueError::DivideByZero);
        }
        self.arithmetic(other, "modulo", |a, b| Some(a % b), |a, b| a.checked_rem(b))
    }

    fn arithmetic(
        &self,
        other: &Self,
        operation: &'static str,
        float_op: impl Fn(f64, f64) -> Option<f64>,
        int_op: impl Fn(i64, i64) -> Option<i64>,
    ) -> Result<Self, ValueError> {
        let mismatch = || ValueError::TypeMismatch {
            operation,
            left: self.ty,
            right: other.ty,
        };

        let result_type = self.numeric_result_type(other);
        if result_type.is_integer()
            && matches!(self.data, ValueData::Int(_))
            && matches!(other.data, ValueData::Int(_))
        {
            let (ValueData::Int(a), ValueData::Int(b)) = (&self.data, &other.data) else {
                return Err(mismatch());
            };
            let v = int_op(*a, *b).ok_or(ValueError::DivideByZero)?;
            return Ok(Self {
                ty: result_type,
                data: ValueData::Int(v),
            });
        }

        let a = self.as_float().ok_or_else(mismatch)?;
        let b = other.as_float().ok_or_else(mismatch)?;
        let v = float_op(a, b).ok_or(ValueError::DivideByZero)?;
        Ok(Self {
            ty: result_type,
            data: ValueData::Float(v),
        })
    }

    /// SQL three-valued comparison: `None` when either side is NULL.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (&self.data, &other.data) {
            (ValueData::Int(a), ValueData::Int(b)) => Some(a.cmp(b)),
            (ValueData::String(a), ValueData::String(b)) => Some(a.cmp(b)),
            (ValueData::Bytes(a), ValueData::Bytes(b)) => Some(a.cmp(b)),
            (ValueData::DateTime(a), ValueData::DateTime(b)) => Some(a.cmp(b)),
            (ValueData::Date(a), ValueData::Date(b)) => Some(a.cmp(b)),
            (ValueData::Time(a), ValueData::Time(b)) => Some(a.cmp(b)),
            // Mixed numerics, and strings compared against numbers,
            // compare as floats when both coerce.
            _ => {
                let a = self.as_float()?;
                let b = other.as_float()?;
                a.partial_cmp(&b)
            }
        }
    }

    /// Casts the value to another SQL type.
    pub fn cast(&self, to: SqlType) -> Result<Self, ValueError> {
        if self.is_null() {
            return Ok(Self::null_of(to));
        }
        let invalid = || ValueError::InvalidCast {
            from: self.ty,
            to,
            value: self.as_string(),
        };

        let data = match to {
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Int | SqlType::BigInt => {
                ValueData::Int(self.as_int().ok_or_else(invalid)?)
            }
            SqlType::Bit => ValueData::Int(i64::from(self.as_bool())),
            SqlType::Float | SqlType::Decimal => {
                ValueData::Float(self.as_float().ok_or_else(invalid)?)
            }
            SqlType::VarChar
            | SqlType::NVarChar
            | SqlType::Char
            | SqlType::NChar
            | SqlType::Text
            | SqlType::UniqueIdentifier => ValueData::String(self.as_string()),
            SqlType::DateTime => match &self.data {
                ValueData::DateTime(dt) => ValueData::DateTime(*dt),
                ValueData::Date(d) => {
                    ValueData::DateTime(d.and_hms_opt(0, 0, 0).ok_or_else(invalid)?)
                }
                ValueData::String(s) => ValueData::DateTime(parse_datetime(s).ok_or_else(invalid)?),
                _ => return Err(invalid()),
            },
            SqlType::Date => match &self.data {
                ValueData::Date(d) => ValueData::Date(*d),
                ValueData::DateTime(dt) => ValueData::Date(dt.date()),
                ValueData::String(s) => ValueData::Date(
                    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| invalid())?,
                ),
                _ => return Err(invalid()),
            },
            SqlType::Time => match &self.data {
                ValueData::Time(t) => ValueData::Time(*t),
                ValueData::DateTime(dt) => ValueData::Time(dt.time()),
                ValueData::String(s) => ValueData::Time(
                    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").map_err(|_| invalid())?,
                ),
                _ => return Err(invalid()),
            },
            SqlType::Binary => match &self.data {
                ValueData::Bytes(b) => ValueData::Bytes(b.clone()),
                ValueData::String(s) => ValueData::Bytes(s.clone().into_bytes()),
                _ => return Err(invalid()),
            },
            SqlType::Unknown => self.data.clone(),
        };
        Ok(Self { ty: to, data })
    }

    /// Renders the value as an inline SQL literal (escaped).
    ///
    /// Used when a `@@sysvar` is inlined textually into backend SQL.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match &self.data {
            ValueData::Null => String::from("NULL"),
            ValueData::Int(i) => i.to_string(),
            ValueData::Float(f) => f.to_string(),
            ValueData::Bytes(_) => self.as_string(),
            _ => format!("'{}'", self.as_string().replace('\'', "''")),
        }
    }
}

/// Parses the datetime formats T-SQL text commonly carries.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NULL")
        } else {
            f.write_str(&self.as_string())
        }
    }
}
