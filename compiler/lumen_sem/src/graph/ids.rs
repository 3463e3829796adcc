//! Dense index types for the semantic arenas.

macro_rules! define_sem_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    )* };
}

define_sem_id!(
    /// A semantic variable: global, local or parameter.
    SemVarId,
    /// A semantic function.
    SemFnId,
    /// A semantic expression.
    SemExprId,
    /// A semantic statement, block or case clause.
    SemStmtId,
    /// An interned call target.
    CallTargetId,
);
