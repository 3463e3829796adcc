use super::*;

#[test]
fn runtime_dominates() {
    use EvaluationStage::{Constant, Override, Runtime};
    assert_eq!(EvaluationStage::earliest_available([Constant, Override]), Override);
    assert_eq!(EvaluationStage::earliest_available([Runtime, Constant]), Runtime);
    assert_eq!(EvaluationStage::earliest_available([]), Constant);
}

#[test]
fn display() {
    assert_eq!(EvaluationStage::Override.to_string(), "override");
}
