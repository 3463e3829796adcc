//! Builtin function overloads.
//!
//! Numeric builtins use the pattern tables. Texture, atomic and
//! `arrayLength` overloads depend on the shape of handle and pointer types,
//! so they are matched directly.

use lumen_ir::{Access, SamplerKind, StorageClass, TexelKind, TextureDimension};
use lumen_sem::{ArrayCount, BuiltinFn, CallParam, Idx, ParamUsage, Pool, TypeKind};
use smallvec::{smallvec, SmallVec};

use super::{
    best_match, ov, IntrinsicTable, NoMatch, Overload, Pat, FLOAT, F32_ONLY, NO_TEMPLATE,
    NUMERIC, SCALAR,
};

/// A resolved builtin call signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinOverload {
    pub params: SmallVec<[CallParam; 4]>,
    pub return_type: Idx,
    /// Has a constant evaluator.
    pub is_const: bool,
}

const ABS: &[Overload] = &[
    ov(NUMERIC, &[Pat::T], Pat::T),
    ov(NUMERIC, &[Pat::VecT], Pat::VecT),
];

const MIN_MAX: &[Overload] = &[
    ov(NUMERIC, &[Pat::T, Pat::T], Pat::T),
    ov(NUMERIC, &[Pat::VecT, Pat::VecT], Pat::VecT),
];

const CLAMP: &[Overload] = &[
    ov(NUMERIC, &[Pat::T, Pat::T, Pat::T], Pat::T),
    ov(NUMERIC, &[Pat::VecT, Pat::VecT, Pat::VecT], Pat::VecT),
];

const DOT: &[Overload] = &[ov(NUMERIC, &[Pat::VecT, Pat::VecT], Pat::T)];

const SELECT: &[Overload] = &[
    ov(SCALAR, &[Pat::T, Pat::T, Pat::Bool], Pat::T),
    ov(SCALAR, &[Pat::VecT, Pat::VecT, Pat::Bool], Pat::VecT),
    ov(SCALAR, &[Pat::VecT, Pat::VecT, Pat::VecBool], Pat::VecT),
];

const ALL_ANY: &[Overload] = &[
    ov(NO_TEMPLATE, &[Pat::Bool], Pat::Bool),
    ov(NO_TEMPLATE, &[Pat::VecBool], Pat::Bool),
];

const LENGTH: &[Overload] = &[
    ov(FLOAT, &[Pat::T], Pat::T),
    ov(FLOAT, &[Pat::VecT], Pat::T),
];

const DPDX: &[Overload] = &[
    ov(F32_ONLY, &[Pat::T], Pat::T),
    ov(F32_ONLY, &[Pat::VecT], Pat::VecT),
];

const IS_NAN: &[Overload] = &[
    ov(FLOAT, &[Pat::T], Pat::Bool),
    ov(FLOAT, &[Pat::VecT], Pat::VecBool),
];

const BARRIER: &[Overload] = &[ov(NO_TEMPLATE, &[], Pat::Void)];

fn pattern_table(builtin: BuiltinFn) -> Option<&'static [Overload]> {
    Some(match builtin {
        BuiltinFn::Abs => ABS,
        BuiltinFn::Min | BuiltinFn::Max => MIN_MAX,
        BuiltinFn::Clamp => CLAMP,
        BuiltinFn::Dot => DOT,
        BuiltinFn::Select => SELECT,
        BuiltinFn::All | BuiltinFn::Any => ALL_ANY,
        BuiltinFn::Length => LENGTH,
        BuiltinFn::Dpdx => DPDX,
        BuiltinFn::IsNan => IS_NAN,
        BuiltinFn::WorkgroupBarrier | BuiltinFn::StorageBarrier => BARRIER,
        _ => return None,
    })
}

/// Number of overloads matched outside the pattern tables.
fn shaped_candidate_count(builtin: BuiltinFn) -> usize {
    match builtin {
        BuiltinFn::TextureSample => 2,
        BuiltinFn::TextureLoad => 5,
        BuiltinFn::TextureDimensions => 2,
        BuiltinFn::TextureStore | BuiltinFn::ArrayLength => 1,
        BuiltinFn::AtomicLoad | BuiltinFn::AtomicStore | BuiltinFn::AtomicAdd => 2,
        _ => 0,
    }
}

fn param(ty: Idx) -> CallParam {
    CallParam {
        ty,
        usage: ParamUsage::None,
    }
}

/// Accept `params` if every argument converts to its parameter.
fn accept(
    pool: &Pool,
    params: SmallVec<[CallParam; 4]>,
    return_type: Idx,
    args: &[Idx],
) -> Option<BuiltinOverload> {
    if params.len() != args.len() {
        return None;
    }
    for (p, &arg) in params.iter().zip(args) {
        pool.conversion_rank(arg, p.ty)?;
    }
    Some(BuiltinOverload {
        params,
        return_type,
        is_const: false,
    })
}

// ============================================================================
// Textures
// ============================================================================

fn coord_width(dim: TextureDimension) -> u32 {
    match dim {
        TextureDimension::D1 => 1,
        TextureDimension::D2 | TextureDimension::D2Array => 2,
        TextureDimension::D3 | TextureDimension::Cube | TextureDimension::CubeArray => 3,
    }
}

fn is_arrayed(dim: TextureDimension) -> bool {
    matches!(dim, TextureDimension::D2Array | TextureDimension::CubeArray)
}

fn scalar_or_vector(pool: &mut Pool, elem: Idx, width: u32) -> Idx {
    if width == 1 {
        elem
    } else {
        pool.vector(elem, width)
    }
}

fn texel_type(kind: TexelKind) -> Idx {
    match kind {
        TexelKind::Float => Idx::F32,
        TexelKind::Sint => Idx::I32,
        TexelKind::Uint => Idx::U32,
    }
}

fn texture_param(ty: Idx) -> CallParam {
    CallParam {
        ty,
        usage: ParamUsage::Texture,
    }
}

fn texture_sample(pool: &mut Pool, args: &[Idx]) -> Option<BuiltinOverload> {
    let (&texture, _) = args.split_first()?;
    let (dim, result) = match pool.kind(texture) {
        TypeKind::SampledTexture { dim, elem } if elem == Idx::F32 => {
            (dim, pool.vector(Idx::F32, 4))
        }
        TypeKind::DepthTexture { dim } => (dim, Idx::F32),
        _ => return None,
    };
    let coords = scalar_or_vector(pool, Idx::F32, coord_width(dim));
    let mut params: SmallVec<[CallParam; 4]> = smallvec![
        texture_param(texture),
        CallParam {
            ty: pool.sampler(SamplerKind::Sampler),
            usage: ParamUsage::Sampler,
        },
        param(coords),
    ];
    if is_arrayed(dim) {
        params.push(param(Idx::I32));
    }
    accept(pool, params, result, args)
}

fn texture_load(pool: &mut Pool, args: &[Idx]) -> Option<BuiltinOverload> {
    let (&texture, _) = args.split_first()?;
    let coords_for = |pool: &mut Pool, dim| scalar_or_vector(pool, Idx::I32, coord_width(dim));
    let mut params: SmallVec<[CallParam; 4]> = smallvec![texture_param(texture)];
    let result = match pool.kind(texture) {
        TypeKind::SampledTexture { dim, elem } => {
            if matches!(dim, TextureDimension::Cube | TextureDimension::CubeArray) {
                return None;
            }
            params.push(param(coords_for(pool, dim)));
            if is_arrayed(dim) {
                params.push(param(Idx::I32));
            }
            params.push(param(Idx::I32));
            pool.vector(elem, 4)
        }
        TypeKind::MultisampledTexture { dim, elem } => {
            params.push(param(coords_for(pool, dim)));
            params.push(param(Idx::I32));
            pool.vector(elem, 4)
        }
        TypeKind::DepthTexture { dim } | TypeKind::DepthMultisampledTexture { dim } => {
            params.push(param(coords_for(pool, dim)));
            if is_arrayed(dim) {
                params.push(param(Idx::I32));
            }
            params.push(param(Idx::I32));
            Idx::F32
        }
        TypeKind::StorageTexture {
            dim,
            format,
            access: Access::Read,
        } => {
            params.push(param(coords_for(pool, dim)));
            if is_arrayed(dim) {
                params.push(param(Idx::I32));
            }
            pool.vector(texel_type(format.kind()), 4)
        }
        TypeKind::ExternalTexture => {
            params.push(param(coords_for(pool, TextureDimension::D2)));
            pool.vector(Idx::F32, 4)
        }
        _ => return None,
    };
    accept(pool, params, result, args)
}

fn texture_dimensions(pool: &mut Pool, args: &[Idx]) -> Option<BuiltinOverload> {
    let (&texture, rest) = args.split_first()?;
    let (dim, has_levels) = match pool.kind(texture) {
        TypeKind::SampledTexture { dim, .. } | TypeKind::DepthTexture { dim } => (dim, true),
        TypeKind::MultisampledTexture { dim, .. }
        | TypeKind::DepthMultisampledTexture { dim }
        | TypeKind::StorageTexture { dim, .. } => (dim, false),
        TypeKind::ExternalTexture => (TextureDimension::D2, false),
        _ => return None,
    };
    let width = match dim {
        TextureDimension::D1 => 1,
        TextureDimension::D3 => 3,
        _ => 2,
    };
    let result = scalar_or_vector(pool, Idx::U32, width);
    let mut params: SmallVec<[CallParam; 4]> = smallvec![texture_param(texture)];
    if has_levels && !rest.is_empty() {
        params.push(param(Idx::I32));
    }
    accept(pool, params, result, args)
}

fn texture_store(pool: &mut Pool, args: &[Idx]) -> Option<BuiltinOverload> {
    let (&texture, _) = args.split_first()?;
    let TypeKind::StorageTexture {
        dim,
        format,
        access: Access::Write,
    } = pool.kind(texture)
    else {
        return None;
    };
    let coords = scalar_or_vector(pool, Idx::I32, coord_width(dim));
    let mut params: SmallVec<[CallParam; 4]> = smallvec![texture_param(texture), param(coords)];
    if is_arrayed(dim) {
        params.push(param(Idx::I32));
    }
    params.push(param(pool.vector(texel_type(format.kind()), 4)));
    accept(pool, params, Idx::VOID, args)
}

// ============================================================================
// Memory
// ============================================================================

fn array_length(pool: &Pool, args: &[Idx]) -> Option<BuiltinOverload> {
    let [ptr] = args else {
        return None;
    };
    let TypeKind::Pointer {
        store,
        storage_class: StorageClass::Storage,
        ..
    } = pool.kind(*ptr)
    else {
        return None;
    };
    matches!(
        pool.kind(store),
        TypeKind::Array {
            count: ArrayCount::Runtime,
            ..
        }
    )
    .then(|| BuiltinOverload {
        params: smallvec![param(*ptr)],
        return_type: Idx::U32,
        is_const: false,
    })
}

fn atomic(pool: &Pool, builtin: BuiltinFn, args: &[Idx]) -> Option<BuiltinOverload> {
    let (&ptr, _) = args.split_first()?;
    let TypeKind::Pointer {
        store,
        storage_class: StorageClass::Storage | StorageClass::Workgroup,
        access: Access::ReadWrite,
    } = pool.kind(ptr)
    else {
        return None;
    };
    let TypeKind::Atomic { elem } = pool.kind(store) else {
        return None;
    };
    if elem != Idx::I32 && elem != Idx::U32 {
        return None;
    }
    let (params, result): (SmallVec<[CallParam; 4]>, Idx) = match builtin {
        BuiltinFn::AtomicLoad => (smallvec![param(ptr)], elem),
        BuiltinFn::AtomicStore => (smallvec![param(ptr), param(elem)], Idx::VOID),
        _ => (smallvec![param(ptr), param(elem)], elem),
    };
    accept(pool, params, result, args)
}

impl IntrinsicTable<'_> {
    /// Signature of a call to `builtin` with the given argument types.
    pub fn builtin(
        &self,
        pool: &mut Pool,
        builtin: BuiltinFn,
        args: &[Idx],
    ) -> Result<BuiltinOverload, NoMatch> {
        let table = pattern_table(builtin);
        let found = match table {
            Some(table) => best_match(pool, table, args).map(|m| BuiltinOverload {
                params: m.params.into_iter().map(param).collect(),
                return_type: m.ret,
                is_const: builtin.is_const(),
            }),
            None => match builtin {
                BuiltinFn::TextureSample => texture_sample(pool, args),
                BuiltinFn::TextureLoad => texture_load(pool, args),
                BuiltinFn::TextureDimensions => texture_dimensions(pool, args),
                BuiltinFn::TextureStore => texture_store(pool, args),
                BuiltinFn::ArrayLength => array_length(pool, args),
                _ => atomic(pool, builtin, args),
            },
        };
        found.ok_or_else(|| NoMatch {
            message: format!(
                "no matching call to {}({})",
                builtin.name(),
                self.type_list(pool, args)
            ),
            candidates: table.map_or(0, <[Overload]>::len) + shaped_candidate_count(builtin),
            noun: "functions",
        })
    }
}
