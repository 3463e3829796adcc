//! Constant evaluation of builtin function calls.

use lumen_sem::{BuiltinFn, ConstValue, Constant, Idx, Scalar};

use super::{dot, ops, ConstEval, EvalError};

/// Scalars of the leaves handed to a `zip_map` callback.
fn scalars(parts: &[&Constant]) -> Result<Vec<Scalar>, EvalError> {
    parts
        .iter()
        .map(|p| {
            p.as_scalar()
                .ok_or_else(|| EvalError::Unsupported("numeric builtin on non-number".to_string()))
        })
        .collect()
}

impl ConstEval<'_> {
    /// Value of a call to `builtin` returning `ty`, or `None` for builtins
    /// that have no constant evaluator.
    pub fn builtin(
        &self,
        builtin: BuiltinFn,
        ty: Idx,
        args: &[Constant],
    ) -> Result<Option<Constant>, EvalError> {
        let refs: Vec<&Constant> = args.iter().collect();
        let value = match builtin {
            BuiltinFn::Abs => self.zip_map(ty, &refs, &mut |el, parts| {
                Ok(Constant::scalar(el, ops::abs(scalars(parts)?[0])?))
            })?,
            BuiltinFn::Min => self.zip_map(ty, &refs, &mut |el, parts| {
                let s = scalars(parts)?;
                Ok(Constant::scalar(el, ops::min(s[0], s[1])))
            })?,
            BuiltinFn::Max => self.zip_map(ty, &refs, &mut |el, parts| {
                let s = scalars(parts)?;
                Ok(Constant::scalar(el, ops::max(s[0], s[1])))
            })?,
            BuiltinFn::Clamp => self.zip_map(ty, &refs, &mut |el, parts| {
                let s = scalars(parts)?;
                Ok(Constant::scalar(el, ops::min(ops::max(s[0], s[1]), s[2])))
            })?,
            BuiltinFn::Dot => {
                let (Some(a), Some(b)) = (args.first(), args.get(1)) else {
                    return Ok(None);
                };
                let pairs = a
                    .elements()
                    .iter()
                    .zip(b.elements())
                    .map(|(x, y)| x.as_scalar().zip(y.as_scalar()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| EvalError::Unsupported("dot of non-vectors".to_string()))?;
                Constant::scalar(ty, dot(&pairs)?)
            }
            BuiltinFn::Select => {
                let [f, t, cond] = args else {
                    return Ok(None);
                };
                match cond.value {
                    ConstValue::Bool(c) => {
                        if c {
                            t.clone()
                        } else {
                            f.clone()
                        }
                    }
                    _ => self.zip_map(ty, &refs, &mut |_, parts| {
                        let picked = match parts[2].as_bool() {
                            Some(true) => parts[1],
                            _ => parts[0],
                        };
                        Ok(picked.clone())
                    })?,
                }
            }
            BuiltinFn::All | BuiltinFn::Any => {
                let Some(arg) = args.first() else {
                    return Ok(None);
                };
                let leaves: Vec<bool> = match &arg.value {
                    ConstValue::Bool(v) => vec![*v],
                    _ => arg.elements().iter().filter_map(Constant::as_bool).collect(),
                };
                let result = if builtin == BuiltinFn::All {
                    leaves.iter().all(|v| *v)
                } else {
                    leaves.iter().any(|v| *v)
                };
                Constant::bool(result)
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}
