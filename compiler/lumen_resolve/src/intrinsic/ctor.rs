//! Scalar, vector and matrix constructors and conversions.
//!
//! Array and struct constructors are not overloaded; the resolver checks
//! them directly.

use lumen_sem::{Idx, Pool, TypeKind};
use smallvec::SmallVec;

use super::{IntrinsicTable, NoMatch};
use crate::const_eval::CtorEval;

/// The type named by a constructor call. Vector and matrix element types are
/// `None` when they are to be inferred from the arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CtorTarget {
    Scalar(Idx),
    Vector {
        width: u32,
        elem: Option<Idx>,
    },
    Matrix {
        columns: u32,
        rows: u32,
        elem: Option<Idx>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CtorKind {
    Construct,
    /// Value conversion from a different element type.
    Convert { from: Idx },
}

/// A resolved constructor or conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtorOverload {
    /// The constructed type.
    pub ty: Idx,
    pub params: SmallVec<[Idx; 4]>,
    pub kind: CtorKind,
    pub eval: CtorEval,
}

impl CtorOverload {
    fn new(ty: Idx, params: SmallVec<[Idx; 4]>, kind: CtorKind, eval: CtorEval) -> Self {
        CtorOverload {
            ty,
            params,
            kind,
            eval,
        }
    }
}

fn converts(pool: &Pool, args: &[Idx], params: &[Idx]) -> bool {
    args.len() == params.len()
        && args
            .iter()
            .zip(params)
            .all(|(&a, &p)| pool.conversion_rank(a, p).is_some())
}

/// Matrices only hold floats: an inferred abstract-int element becomes
/// abstract-float.
fn matrix_elem(pool: &Pool, elem: Idx) -> Option<Idx> {
    let elem = if elem == Idx::ABSTRACT_INT {
        Idx::ABSTRACT_FLOAT
    } else {
        elem
    };
    pool.is_float_scalar(elem).then_some(elem)
}

fn scalar(pool: &mut Pool, ty: Idx, args: &[Idx]) -> Option<CtorOverload> {
    match args {
        [] => Some(CtorOverload::new(
            ty,
            SmallVec::new(),
            CtorKind::Construct,
            CtorEval::Zero,
        )),
        [arg] if pool.is_scalar(*arg) => {
            if pool.conversion_rank(*arg, ty).is_some() {
                Some(CtorOverload::new(
                    ty,
                    SmallVec::from_slice(&[ty]),
                    CtorKind::Construct,
                    CtorEval::Identity,
                ))
            } else {
                let from = pool.concrete(*arg);
                Some(CtorOverload::new(
                    ty,
                    SmallVec::from_slice(&[from]),
                    CtorKind::Convert { from },
                    CtorEval::Conversion,
                ))
            }
        }
        _ => None,
    }
}

fn vector(pool: &mut Pool, width: u32, elem: Option<Idx>, args: &[Idx]) -> Option<CtorOverload> {
    match args {
        [] => {
            let ty = pool.vector(elem.unwrap_or(Idx::ABSTRACT_INT), width);
            Some(CtorOverload::new(
                ty,
                SmallVec::new(),
                CtorKind::Construct,
                CtorEval::Zero,
            ))
        }
        [arg] if pool.is_scalar(*arg) => {
            let elem = elem.unwrap_or(*arg);
            if pool.conversion_rank(*arg, elem).is_none() {
                return None;
            }
            let ty = pool.vector(elem, width);
            Some(CtorOverload::new(
                ty,
                SmallVec::from_slice(&[elem]),
                CtorKind::Construct,
                CtorEval::Splat,
            ))
        }
        [arg] if pool.element_count(*arg) == Some(width) && pool.is_vector(*arg) => {
            let from_elem = pool.deepest_element(*arg);
            let ty = pool.vector(elem.unwrap_or(from_elem), width);
            if pool.conversion_rank(*arg, ty).is_some() {
                Some(CtorOverload::new(
                    ty,
                    SmallVec::from_slice(&[ty]),
                    CtorKind::Construct,
                    CtorEval::Identity,
                ))
            } else {
                let from = pool.concrete(*arg);
                Some(CtorOverload::new(
                    ty,
                    SmallVec::from_slice(&[from]),
                    CtorKind::Convert { from },
                    CtorEval::Conversion,
                ))
            }
        }
        _ => {
            // Mixed scalars and vectors whose widths add up.
            let mut total = 0;
            let mut leaves = SmallVec::<[Idx; 4]>::new();
            for &arg in args {
                match pool.kind(arg) {
                    TypeKind::Vector { elem, width } => {
                        total += width;
                        leaves.push(elem);
                    }
                    _ if pool.is_scalar(arg) => {
                        total += 1;
                        leaves.push(arg);
                    }
                    _ => return None,
                }
            }
            if total != width || args.len() < 2 {
                return None;
            }
            let elem = match elem {
                Some(elem) => elem,
                None => pool.common(&leaves)?,
            };
            let params: SmallVec<[Idx; 4]> = args
                .iter()
                .map(|&arg| match pool.kind(arg) {
                    TypeKind::Vector { width, .. } => pool.vector(elem, width),
                    _ => elem,
                })
                .collect();
            if !converts(pool, args, &params) {
                return None;
            }
            let ty = pool.vector(elem, width);
            Some(CtorOverload::new(
                ty,
                params,
                CtorKind::Construct,
                CtorEval::Compose,
            ))
        }
    }
}

fn matrix(
    pool: &mut Pool,
    columns: u32,
    rows: u32,
    elem: Option<Idx>,
    args: &[Idx],
) -> Option<CtorOverload> {
    if let [] = args {
        let elem = matrix_elem(pool, elem.unwrap_or(Idx::ABSTRACT_FLOAT))?;
        let ty = pool.matrix(elem, columns, rows);
        return Some(CtorOverload::new(
            ty,
            SmallVec::new(),
            CtorKind::Construct,
            CtorEval::Zero,
        ));
    }
    if let [arg] = args {
        let TypeKind::Matrix {
            columns: c,
            rows: r,
            elem: from_elem,
            ..
        } = pool.kind(*arg)
        else {
            return None;
        };
        if c != columns || r != rows {
            return None;
        }
        let elem = matrix_elem(pool, elem.unwrap_or(from_elem))?;
        let ty = pool.matrix(elem, columns, rows);
        return Some(if pool.conversion_rank(*arg, ty).is_some() {
            CtorOverload::new(
                ty,
                SmallVec::from_slice(&[ty]),
                CtorKind::Construct,
                CtorEval::Identity,
            )
        } else {
            let from = pool.concrete(*arg);
            CtorOverload::new(
                ty,
                SmallVec::from_slice(&[from]),
                CtorKind::Convert { from },
                CtorEval::Conversion,
            )
        });
    }

    let as_columns = args.len() == columns as usize
        && args
            .iter()
            .all(|&a| pool.is_vector(a) && pool.element_count(a) == Some(rows));
    let as_scalars =
        args.len() == (columns * rows) as usize && args.iter().all(|&a| pool.is_scalar(a));
    if !as_columns && !as_scalars {
        return None;
    }
    let leaves: SmallVec<[Idx; 4]> = args.iter().map(|&a| pool.deepest_element(a)).collect();
    let elem = match elem {
        Some(elem) => elem,
        None => pool.common(&leaves)?,
    };
    let elem = matrix_elem(pool, elem)?;
    let ty = pool.matrix(elem, columns, rows);
    let (param, eval) = if as_columns {
        (pool.vector(elem, rows), CtorEval::Compose)
    } else {
        (elem, CtorEval::MatrixScalars)
    };
    let params: SmallVec<[Idx; 4]> = args.iter().map(|_| param).collect();
    converts(pool, args, &params)
        .then(|| CtorOverload::new(ty, params, CtorKind::Construct, eval))
}

impl IntrinsicTable<'_> {
    fn target_name(&self, pool: &mut Pool, target: CtorTarget) -> String {
        match target {
            CtorTarget::Scalar(ty) => pool.display(ty, self.interner),
            CtorTarget::Vector { width, elem: None } => format!("vec{width}"),
            CtorTarget::Matrix {
                columns,
                rows,
                elem: None,
            } => format!("mat{columns}x{rows}"),
            CtorTarget::Vector {
                width,
                elem: Some(elem),
            } => {
                let ty = pool.vector(elem, width);
                pool.display(ty, self.interner)
            }
            CtorTarget::Matrix {
                columns,
                rows,
                elem: Some(elem),
            } => {
                let ty = pool.matrix(elem, columns, rows);
                pool.display(ty, self.interner)
            }
        }
    }

    /// Constructor or conversion of `target` from `args`.
    pub fn ctor_or_conv(
        &self,
        pool: &mut Pool,
        target: CtorTarget,
        args: &[Idx],
    ) -> Result<CtorOverload, NoMatch> {
        let (found, candidates) = match target {
            CtorTarget::Scalar(ty) => (scalar(pool, ty, args), 3),
            CtorTarget::Vector { width, elem } => (vector(pool, width, elem, args), 5),
            CtorTarget::Matrix {
                columns,
                rows,
                elem,
            } => (matrix(pool, columns, rows, elem, args), 4),
        };
        match found {
            Some(overload) => Ok(overload),
            None => Err(NoMatch {
                message: format!(
                    "no matching constructor for {}({})",
                    self.target_name(pool, target),
                    self.type_list(pool, args)
                ),
                candidates,
                noun: "constructors",
            }),
        }
    }
}
