//! Resolver configuration.

/// What to do with uniformity violations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum UniformityPolicy {
    /// Skip the analysis.
    Off,
    /// Report violations as warnings.
    #[default]
    Warn,
    /// Report violations as errors.
    Reject,
}

/// Options for a single [`resolve`](crate::resolve) call.
#[derive(Clone, Debug)]
pub struct ResolverOptions {
    pub uniformity: UniformityPolicy,
    /// Deepest expression nesting accepted before resolution gives up.
    pub max_expression_depth: usize,
    /// Emit "code is unreachable" warnings.
    pub allow_unreachable_warnings: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            uniformity: UniformityPolicy::default(),
            max_expression_depth: 512,
            allow_unreachable_warnings: true,
        }
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_uniformity(mut self, policy: UniformityPolicy) -> Self {
        self.uniformity = policy;
        self
    }

    #[must_use]
    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }

    #[must_use]
    pub fn with_unreachable_warnings(mut self, enabled: bool) -> Self {
        self.allow_unreachable_warnings = enabled;
        self
    }
}
