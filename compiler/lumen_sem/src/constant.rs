//! Compile-time constant values.

use crate::{Idx, Scalar};

/// Payload of a constant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Number(Scalar),
    /// Vector, matrix (columns), array or struct (members) elements.
    Composite(Vec<Constant>),
}

/// A typed constant value.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub ty: Idx,
    pub value: ConstValue,
}

impl Constant {
    pub fn bool(value: bool) -> Self {
        Constant {
            ty: Idx::BOOL,
            value: ConstValue::Bool(value),
        }
    }

    pub fn scalar(ty: Idx, value: impl Into<Scalar>) -> Self {
        Constant {
            ty,
            value: ConstValue::Number(value.into()),
        }
    }

    pub fn composite(ty: Idx, elements: Vec<Constant>) -> Self {
        Constant {
            ty,
            value: ConstValue::Composite(elements),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            ConstValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self.value {
            ConstValue::Number(v) => Some(v),
            _ => None,
        }
    }

    /// Integer value of an integer scalar constant.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::to_i64)
    }

    /// Elements of a composite; empty for scalars.
    pub fn elements(&self) -> &[Constant] {
        match &self.value {
            ConstValue::Composite(elements) => elements,
            _ => &[],
        }
    }

    pub fn element(&self, index: usize) -> Option<&Constant> {
        self.elements().get(index)
    }

    /// `true` if every leaf is zero or `false`.
    pub fn all_zero(&self) -> bool {
        match &self.value {
            ConstValue::Bool(v) => !v,
            ConstValue::Number(v) => v.is_zero(),
            ConstValue::Composite(elements) => elements.iter().all(Constant::all_zero),
        }
    }

    /// `true` if any leaf is zero or `false`.
    pub fn any_zero(&self) -> bool {
        match &self.value {
            ConstValue::Bool(v) => !v,
            ConstValue::Number(v) => v.is_zero(),
            ConstValue::Composite(elements) => elements.iter().any(Constant::any_zero),
        }
    }
}

#[cfg(test)]
mod tests;
