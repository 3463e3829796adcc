//! Control-flow behavior sets.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// The ways a statement, expression or function can hand control on.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct Behaviors: u8 {
        /// Falls through to the next statement.
        const NEXT = 1 << 0;
        const RETURN = 1 << 1;
        const BREAK = 1 << 2;
        const CONTINUE = 1 << 3;
        const FALLTHROUGH = 1 << 4;
        const DISCARD = 1 << 5;
    }
}

impl Behaviors {
    /// Sequence `self` then `next`: `(self - Next) | next`.
    #[must_use]
    pub fn then(self, next: Behaviors) -> Behaviors {
        self.difference(Behaviors::NEXT) | next
    }

    /// Remove `remove`, then add `add`.
    #[must_use]
    pub fn replace(self, remove: Behaviors, add: Behaviors) -> Behaviors {
        self.difference(remove) | add
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Behaviors::NEXT, "Next"),
            (Behaviors::RETURN, "Return"),
            (Behaviors::BREAK, "Break"),
            (Behaviors::CONTINUE, "Continue"),
            (Behaviors::FALLTHROUGH, "Fallthrough"),
            (Behaviors::DISCARD, "Discard"),
        ];
        f.write_str("{")?;
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests;
