//! Language extensions enabled with `enable` directives.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Extension {
    /// The `f16` scalar type.
    F16,
    /// The `push_constant` storage class.
    ChromiumExperimentalPushConstant,
    /// Turns off uniformity analysis.
    ChromiumDisableUniformityAnalysis,
}

impl Extension {
    pub const fn as_str(self) -> &'static str {
        match self {
            Extension::F16 => "f16",
            Extension::ChromiumExperimentalPushConstant => "chromium_experimental_push_constant",
            Extension::ChromiumDisableUniformityAnalysis => "chromium_disable_uniformity_analysis",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
