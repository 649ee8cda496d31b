mod common;
use common::*;

#[test]
fn test_state_functions() {
    insta::assert_snapshot!(
        snapshot_expr("states('sensor.temperature', with_unit=true)"),
        @r#"(call states "sensor.temperature" with_unit=true)"#
    );
    insta::assert_snapshot!(
        snapshot_expr("state_attr('light.kitchen', 'brightness')"),
        @r#"(call state_attr "light.kitchen" "brightness")"#
    );
}

#[test]
fn test_binary_text_in_conditional() {
    insta::assert_snapshot!(
        snapshot_expr("'Open' if is_state('cover.garage', 'open') else self_binary_text('On', 'Off')"),
        @r#"(if (call is_state "cover.garage" "open") "Open" (call self_binary_text "On" "Off"))"#
    );
}

#[test]
fn test_filter_chain() {
    insta::assert_snapshot!(
        snapshot_expr("self_states() | float | round(1)"),
        @"(filter round (filter float (call self_states)) 1)"
    );
}

#[test]
fn test_logical_operators() {
    insta::assert_snapshot!(
        snapshot_expr("a or b and not c"),
        @"(or a (and b (not c)))"
    );
}

#[test]
fn test_concat_and_arithmetic() {
    insta::assert_snapshot!(
        snapshot_expr("'T: ' ~ x * 2 + 1"),
        @r#"(~ "T: " (+ (* x 2) 1))"#
    );
}

#[test]
fn test_membership_list() {
    insta::assert_snapshot!(
        snapshot_expr("self_states() in ['on', 'home',]"),
        @r#"(in (call self_states) (list "on" "home"))"#
    );
}

#[test]
fn test_literals() {
    insta::assert_snapshot!(
        snapshot_expr("[1, 21.5, 'x', True, none]"),
        @r#"(list 1 21.5 "x" true none)"#
    );
}

#[test]
fn test_unclosed_call_error() {
    insta::assert_snapshot!(
        snapshot_expr("states('sensor.x'"),
        @"error: expected ')', found end of expression at offset 17"
    );
}

#[test]
fn test_unknown_character_error() {
    insta::assert_snapshot!(
        snapshot_expr("a ? b"),
        @"error: unexpected unrecognized character at offset 2"
    );
}
