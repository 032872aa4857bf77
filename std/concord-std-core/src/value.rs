//!
//! Scalar Payload Representation
//!
//! Values moved between threads are one 64-bit word read under one of four
//! interpretations:
//! - signed integer
//! - unsigned integer
//! - IEEE-754 double
//! - raw pointer (stored as its exposed address)
//!
//! The interpretation travels with the value as the enum variant. Producer and
//! consumer still agree on it out of band; no implicit conversion happens when
//! the wrong accessor is used, it simply returns `None`.
//!

use std::fmt;
use std::hash::{Hash, Hasher};

/// The interpretation a `Scalar` word is read under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Uint,
    Float,
    Pointer,
}

/// One word of payload
#[derive(Clone, Copy)]
pub enum Scalar {
    Int(i64),
    Uint(u64),
    Float(f64),
    Pointer(usize),
}

impl Scalar {
    /// The value a drained channel hands out
    pub const ZERO: Scalar = Scalar::Int(0);

    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Uint(_) => ScalarKind::Uint,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Pointer(_) => ScalarKind::Pointer,
        }
    }

    /// Raw bits of the word, independent of interpretation
    pub fn to_bits(&self) -> u64 {
        match *self {
            Scalar::Int(v) => v as u64,
            Scalar::Uint(v) => v,
            Scalar::Float(v) => v.to_bits(),
            Scalar::Pointer(addr) => addr as u64,
        }
    }

    /// Rebuild a scalar from raw bits under the given interpretation
    pub fn from_bits(kind: ScalarKind, bits: u64) -> Self {
        match kind {
            ScalarKind::Int => Scalar::Int(bits as i64),
            ScalarKind::Uint => Scalar::Uint(bits),
            ScalarKind::Float => Scalar::Float(f64::from_bits(bits)),
            ScalarKind::Pointer => Scalar::Pointer(bits as usize),
        }
    }

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Scalar::Pointer(ptr.expose_provenance())
    }

    pub fn is_zero(&self) -> bool {
        self.to_bits() == 0
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Scalar::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match *self {
            Scalar::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Scalar::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Pointer interpretation; dereferencing it is the caller's business
    pub fn as_ptr<T>(&self) -> Option<*mut T> {
        match *self {
            Scalar::Pointer(addr) => Some(std::ptr::with_exposed_provenance_mut(addr)),
            _ => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::ZERO
    }
}

// Bit equality under the active interpretation: NaN equals itself, -0.0 does not equal 0.0.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_bits() == other.to_bits()
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.to_bits().hash(state);
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::Int(v) => write!(f, "Int({})", v),
            Scalar::Uint(v) => write!(f, "Uint({})", v),
            Scalar::Float(v) => write!(f, "Float({})", v),
            Scalar::Pointer(addr) => write!(f, "Pointer({:#x})", addr),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Uint(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Pointer(addr) => write!(f, "{:#x}", addr),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Uint(v)
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Scalar::Uint(v as u64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Int(v as i64)
    }
}
