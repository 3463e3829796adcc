//! Dense index types for the syntax arenas.
//!
//! Every syntax node lives in a per-category arena and is referenced by a
//! 32-bit index. In addition, every node carries a [`NodeId`] that is unique
//! across all categories, so a single bitset can track which nodes the
//! resolver has visited.

/// Macro to define arena index types.
///
/// Each generated type has:
/// - an `INVALID` sentinel
/// - `new()`, `index()`, `raw()`, `is_valid()` methods
/// - a `Debug` implementation showing `TypeName(n)`
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Invalid index (sentinel value).
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    )* };
}

define_id!(
    /// Program-wide node identity, dense over every syntax node.
    NodeId,
    /// Index into the expression arena.
    ExprId,
    /// Index into the statement arena.
    StmtId,
    /// Index into the type-expression arena.
    TypeExprId,
    /// Index into the attribute arena.
    AttrId,
    /// Index into the variable arena (`var`, `let`, `const`, `override`).
    VariableId,
    /// Index into the function arena.
    FunctionId,
    /// Index into the parameter arena.
    ParamId,
    /// Index into the struct declaration arena.
    StructDeclId,
    /// Index into the struct member arena.
    MemberId,
    /// Index into the alias arena.
    AliasId,
    /// Index into the `enable` directive arena.
    EnableId,
    /// Index into the switch case arena.
    CaseId,
    /// Index into the call-target identifier arena.
    IdentId,
);
