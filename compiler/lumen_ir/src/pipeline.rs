//! Pipeline stages and builtin shader values.

use std::fmt;

/// Pipeline stage an entry point runs in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PipelineStage {
    Vertex,
    Fragment,
    Compute,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStage::Vertex => "vertex",
            PipelineStage::Fragment => "fragment",
            PipelineStage::Compute => "compute",
        })
    }
}

/// Values supplied by the pipeline through `@builtin(...)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinValue {
    Position,
    VertexIndex,
    InstanceIndex,
    FrontFacing,
    FragDepth,
    LocalInvocationId,
    LocalInvocationIndex,
    GlobalInvocationId,
    WorkgroupId,
    NumWorkgroups,
    SampleIndex,
    SampleMask,
}

impl BuiltinValue {
    /// Whether every invocation in a workgroup observes the same value.
    pub const fn is_uniform(self) -> bool {
        matches!(self, BuiltinValue::WorkgroupId | BuiltinValue::NumWorkgroups)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BuiltinValue::Position => "position",
            BuiltinValue::VertexIndex => "vertex_index",
            BuiltinValue::InstanceIndex => "instance_index",
            BuiltinValue::FrontFacing => "front_facing",
            BuiltinValue::FragDepth => "frag_depth",
            BuiltinValue::LocalInvocationId => "local_invocation_id",
            BuiltinValue::LocalInvocationIndex => "local_invocation_index",
            BuiltinValue::GlobalInvocationId => "global_invocation_id",
            BuiltinValue::WorkgroupId => "workgroup_id",
            BuiltinValue::NumWorkgroups => "num_workgroups",
            BuiltinValue::SampleIndex => "sample_index",
            BuiltinValue::SampleMask => "sample_mask",
        }
    }
}

impl fmt::Display for BuiltinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
