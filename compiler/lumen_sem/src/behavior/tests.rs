use pretty_assertions::assert_eq;

use super::*;

#[test]
fn sequence_drops_next() {
    let a = Behaviors::NEXT | Behaviors::BREAK;
    assert_eq!(a.then(Behaviors::RETURN), Behaviors::BREAK | Behaviors::RETURN);
    assert_eq!(Behaviors::NEXT.then(Behaviors::NEXT), Behaviors::NEXT);
}

#[test]
fn replace_removes_then_adds() {
    let loop_body = Behaviors::BREAK | Behaviors::CONTINUE | Behaviors::RETURN;
    assert_eq!(
        loop_body.replace(Behaviors::BREAK | Behaviors::CONTINUE, Behaviors::NEXT),
        Behaviors::RETURN | Behaviors::NEXT
    );
}

#[test]
fn debug_lists_members() {
    assert_eq!(format!("{:?}", Behaviors::empty()), "{}");
    assert_eq!(
        format!("{:?}", Behaviors::NEXT | Behaviors::DISCARD),
        "{Next, Discard}"
    );
}
