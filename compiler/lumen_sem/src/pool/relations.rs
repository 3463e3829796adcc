//! Conversion ranks, common types and materialization targets.

use super::{ArrayCount, Pool, TypeKind};
use crate::Idx;

impl Pool {
    /// Cost of implicitly converting `from` to `to`.
    ///
    /// `Some(0)` for identical types, a positive rank for abstract-to-concrete
    /// conversions (lower is preferred), `None` when no implicit conversion
    /// exists. Vectors, matrices and sized arrays convert element-wise when
    /// their shapes match.
    pub fn conversion_rank(&self, from: Idx, to: Idx) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        match (self.kind(from), self.kind(to)) {
            (TypeKind::AbstractFloat, TypeKind::F32) => Some(1),
            (TypeKind::AbstractFloat, TypeKind::F16) => Some(2),
            (TypeKind::AbstractInt, TypeKind::I32) => Some(3),
            (TypeKind::AbstractInt, TypeKind::U32) => Some(4),
            (TypeKind::AbstractInt, TypeKind::AbstractFloat) => Some(5),
            (TypeKind::AbstractInt, TypeKind::F32) => Some(6),
            (TypeKind::AbstractInt, TypeKind::F16) => Some(7),
            (
                TypeKind::Vector {
                    elem: from_el,
                    width: from_w,
                },
                TypeKind::Vector {
                    elem: to_el,
                    width: to_w,
                },
            ) if from_w == to_w => self.conversion_rank(from_el, to_el),
            (
                TypeKind::Matrix {
                    elem: from_el,
                    columns: from_c,
                    rows: from_r,
                    ..
                },
                TypeKind::Matrix {
                    elem: to_el,
                    columns: to_c,
                    rows: to_r,
                    ..
                },
            ) if from_c == to_c && from_r == to_r => self.conversion_rank(from_el, to_el),
            (
                TypeKind::Array {
                    elem: from_el,
                    count: from_n @ ArrayCount::Constant(_),
                    ..
                },
                TypeKind::Array {
                    elem: to_el,
                    count: to_n,
                    ..
                },
            ) if from_n == to_n => self.conversion_rank(from_el, to_el),
            _ => None,
        }
    }

    /// The type every type in `types` can implicitly convert to, if any.
    pub fn common(&self, types: &[Idx]) -> Option<Idx> {
        let (&first, rest) = types.split_first()?;
        let mut common = first;
        for &ty in rest {
            if ty == common || self.conversion_rank(ty, common).is_some() {
                continue;
            }
            if self.conversion_rank(common, ty).is_some() {
                common = ty;
                continue;
            }
            return None;
        }
        Some(common)
    }

    /// The default concrete type for `ty`: abstract-int becomes i32,
    /// abstract-float becomes f32, recursively through vectors, matrices and
    /// arrays. Concrete types are returned unchanged.
    pub fn concrete(&mut self, ty: Idx) -> Idx {
        if !self.is_abstract(ty) {
            return ty;
        }
        match self.kind(ty) {
            TypeKind::AbstractInt => Idx::I32,
            TypeKind::AbstractFloat => Idx::F32,
            TypeKind::Vector { elem, width } => {
                let elem = self.concrete(elem);
                self.vector(elem, width)
            }
            TypeKind::Matrix {
                elem,
                columns,
                rows,
                ..
            } => {
                let elem = self.concrete(elem);
                self.matrix(elem, columns, rows)
            }
            TypeKind::Array { elem, count, .. } => {
                let elem = self.concrete(elem);
                self.array_of(elem, count)
            }
            _ => ty,
        }
    }

    /// Rebuild `ty` with its deepest element replaced by `elem`, keeping the
    /// vector, matrix or array shape.
    pub fn with_deepest_element(&mut self, ty: Idx, elem: Idx) -> Idx {
        match self.kind(ty) {
            TypeKind::Vector { width, .. } => self.vector(elem, width),
            TypeKind::Matrix { columns, rows, .. } => self.matrix(elem, columns, rows),
            TypeKind::Array {
                elem: inner, count, ..
            } => {
                let inner = self.with_deepest_element(inner, elem);
                self.array_of(inner, count)
            }
            _ => elem,
        }
    }
}
