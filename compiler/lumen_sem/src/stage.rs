//! Evaluation stages.

use std::fmt;

/// The earliest point at which an expression's value is known.
///
/// Ordered so that `max` gives the latest of several stages: a runtime
/// operand makes the whole expression runtime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
pub enum EvaluationStage {
    /// Shader-creation time.
    #[default]
    Constant,
    /// Pipeline-creation time.
    Override,
    /// Shader execution.
    Runtime,
}

impl EvaluationStage {
    /// The latest stage among `stages`; `Constant` when empty.
    pub fn earliest_available<I: IntoIterator<Item = EvaluationStage>>(stages: I) -> Self {
        stages
            .into_iter()
            .max()
            .unwrap_or(EvaluationStage::Constant)
    }
}

impl fmt::Display for EvaluationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationStage::Constant => "constant",
            EvaluationStage::Override => "override",
            EvaluationStage::Runtime => "runtime",
        })
    }
}

#[cfg(test)]
mod tests;
