//! Storage classes and access modes.

use std::fmt;

/// Memory space a variable lives in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum StorageClass {
    /// No storage class: `let`, `const`, `override` and parameters.
    None,
    Function,
    Private,
    Workgroup,
    Uniform,
    Storage,
    PushConstant,
    /// Textures and samplers.
    Handle,
}

impl StorageClass {
    /// Storage classes whose contents are laid out identically on host and device.
    pub const fn is_host_shareable(self) -> bool {
        matches!(
            self,
            StorageClass::Uniform | StorageClass::Storage | StorageClass::PushConstant
        )
    }

    /// Access mode used when a declaration does not spell one out.
    pub const fn default_access(self) -> Access {
        match self {
            StorageClass::Storage | StorageClass::Uniform | StorageClass::Handle => Access::Read,
            _ => Access::ReadWrite,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StorageClass::None => "none",
            StorageClass::Function => "function",
            StorageClass::Private => "private",
            StorageClass::Workgroup => "workgroup",
            StorageClass::Uniform => "uniform",
            StorageClass::Storage => "storage",
            StorageClass::PushConstant => "push_constant",
            StorageClass::Handle => "handle",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access mode of a reference or pointer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Access {
    /// Not applicable (value declarations).
    Undefined,
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub const fn can_read(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub const fn can_write(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Access::Undefined => "undefined",
            Access::Read => "read",
            Access::Write => "write",
            Access::ReadWrite => "read_write",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_access() {
        assert_eq!(StorageClass::Storage.default_access(), Access::Read);
        assert_eq!(StorageClass::Uniform.default_access(), Access::Read);
        assert_eq!(StorageClass::Handle.default_access(), Access::Read);
        assert_eq!(StorageClass::Function.default_access(), Access::ReadWrite);
        assert_eq!(StorageClass::Workgroup.default_access(), Access::ReadWrite);
    }

    #[test]
    fn test_host_shareable() {
        assert!(StorageClass::Uniform.is_host_shareable());
        assert!(StorageClass::PushConstant.is_host_shareable());
        assert!(!StorageClass::Private.is_host_shareable());
    }
}
