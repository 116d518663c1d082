//! The structural type lattice: intrinsic types, bus shapes, unification and
//! casting (component C).

use crate::{keywords, sem::error::SemError, sem::instance::InstanceLocation, token::Token};

/// A signal or variable's data type. Integer and float widths of `-1` mean
/// "unconstrained" (the type of an un-suffixed literal before it meets a
/// concrete context).
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Signed(i64),
    Unsigned(i64),
    Float(i64),
    Bool,
    /// Identity-compared by the declaring enum's instance location.
    Enumeration(InstanceLocation),
    Bus(BusShape),
    Special,
}

/// Ordered mapping from signal name to its type, defining a bus's interface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BusShape {
    pub signals: Vec<(String, DataType)>,
}

impl BusShape {
    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.signals.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

fn is_numeric(t: &DataType) -> bool {
    matches!(t, DataType::Signed(_) | DataType::Unsigned(_) | DataType::Float(_))
}

/// Width of a numeric type; `-1` for unconstrained, `0` for non-numeric types.
pub fn width(t: &DataType) -> i64 {
    match t {
        DataType::Signed(w) | DataType::Unsigned(w) | DataType::Float(w) => *w,
        _ => 0,
    }
}

fn max_width(a: i64, b: i64) -> i64 {
    if a < 0 && b < 0 {
        -1
    } else if a < 0 {
        b
    } else if b < 0 {
        a
    } else {
        a.max(b)
    }
}

/// Width of a mixed signed/unsigned unification: widens by one bit when
/// `primary` (the side named first in the rule) is no wider than `other`.
fn cross_width(primary: i64, other: i64) -> i64 {
    if primary < 0 || other < 0 {
        max_width(primary, other)
    } else if primary <= other {
        primary.max(other) + 1
    } else {
        primary.max(other)
    }
}

/// Widens two types to their smallest common supertype, or `None` if they
/// cannot be unified (§4.C).
pub fn unify(a: &DataType, b: &DataType) -> Option<DataType> {
    use DataType::*;
    match (a, b) {
        (Signed(wa), Signed(wb)) => Some(Signed(max_width(*wa, *wb))),
        (Unsigned(wa), Unsigned(wb)) => Some(Unsigned(max_width(*wa, *wb))),
        (Signed(sw), Unsigned(uw)) => Some(Signed(cross_width(*sw, *uw))),
        (Unsigned(uw), Signed(sw)) => Some(Unsigned(cross_width(*uw, *sw))),
        (Float(wa), Float(wb)) => Some(Float(max_width(*wa, *wb))),
        (Bool, Bool) => Some(Bool),
        (Enumeration(da), Enumeration(db)) => {
            if da == db {
                Some(Enumeration(*da))
            } else {
                None
            }
        }
        (Bus(sa), Bus(sb)) => unify_bus(sa, sb).map(Bus),
        _ => None,
    }
}

fn unify_bus(a: &BusShape, b: &BusShape) -> Option<BusShape> {
    let mut signals = a.signals.clone();
    for (name, ty) in &a.signals {
        if let Some(other_ty) = b.get(name) {
            if !types_equal(ty, other_ty) {
                return None;
            }
        }
    }
    for (name, ty) in &b.signals {
        if a.get(name).is_none() {
            signals.push((name.clone(), ty.clone()));
        }
    }
    Some(BusShape { signals })
}

/// Two types are equal iff they unify to themselves on both sides.
pub fn types_equal(a: &DataType, b: &DataType) -> bool {
    match unify(a, b) {
        Some(u) => u == *a && u == *b,
        None => false,
    }
}

/// Whether an explicit `a as b` cast is permitted: the types unify, or both
/// sides are numeric. `bool`/non-`bool` and bus/non-bus casts are always
/// rejected.
pub fn can_cast(a: &DataType, b: &DataType) -> bool {
    unify(a, b).is_some() || (is_numeric(a) && is_numeric(b))
}

/// The intrinsic spelling `parse_intrinsic` would read back to reproduce
/// `ty`, used when synthesizing a `TypeName` token for a cast that has no
/// source-text type annotation to borrow (e.g. a `connect` identity
/// process's implicit cast).
pub fn spelling(ty: &DataType) -> String {
    match ty {
        DataType::Signed(w) if *w < 0 => "int".to_string(),
        DataType::Signed(w) => format!("i{w}"),
        DataType::Unsigned(w) if *w < 0 => "uint".to_string(),
        DataType::Unsigned(w) => format!("u{w}"),
        DataType::Float(w) => format!("f{w}"),
        DataType::Bool => "bool".to_string(),
        DataType::Enumeration(_) | DataType::Bus(_) | DataType::Special => "int".to_string(),
    }
}

/// Parses an intrinsic type spelling (`int`, `uint`, `bool`, `f8`..`f64`,
/// `iN`, `uN`).
pub fn parse_intrinsic(token: &Token) -> Result<DataType, SemError> {
    let name = token.as_ref();
    match name {
        "int" => return Ok(DataType::Signed(-1)),
        "uint" => return Ok(DataType::Unsigned(-1)),
        "bool" => return Ok(DataType::Bool),
        "f8" => return Ok(DataType::Float(8)),
        "f16" => return Ok(DataType::Float(16)),
        "f32" => return Ok(DataType::Float(32)),
        "f64" => return Ok(DataType::Float(64)),
        _ => {}
    }
    match keywords::parse_sized(name) {
        Some(('i', width)) => Ok(DataType::Signed(width as i64)),
        Some(('u', width)) => Ok(DataType::Unsigned(width as i64)),
        _ => Err(SemError::bad_type(name, token)),
    }
}
