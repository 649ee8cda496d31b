mod common;
use common::*;

#[test]
fn test_text_with_output() {
    insta::assert_snapshot!(
        snapshot_template("Temp: {{ states('sensor.t') }} C"),
        @r#"
    (text "Temp: ")
    (output (call states "sensor.t"))
    (text " C")
    "#
    );
}

#[test]
fn test_if_elif_else() {
    insta::assert_snapshot!(
        snapshot_template("{% if self_is_state('on') %}On{% elif self_is_state('off') %}Off{% else %}?{% endif %}"),
        @r#"(if-block (when (call self_is_state "on") (text "On")) (when (call self_is_state "off") (text "Off")) (else (text "?")))"#
    );
}

#[test]
fn test_nested_if() {
    insta::assert_snapshot!(
        snapshot_template("{% if a %}{% if b %}ab{% endif %}{% endif %}"),
        @r#"(if-block (when a (if-block (when b (text "ab")))))"#
    );
}

#[test]
fn test_comment_and_trim() {
    insta::assert_snapshot!(
        snapshot_template("{# label #}  {{- name -}}  !"),
        @r#"
    (output name)
    (text "!")
    "#
    );
}

#[test]
fn test_else_after_else_error() {
    insta::assert_snapshot!(
        snapshot_template("{% if a %}1{% else %}2{% else %}3{% endif %}"),
        @"error: unexpected 'else' block tag at offset 24"
    );
}

#[test]
fn test_unknown_tag_error() {
    insta::assert_snapshot!(
        snapshot_template("{% for x in y %}{% endfor %}"),
        @"error: unknown block tag 'for' at offset 3"
    );
}

#[test]
fn test_bad_expression_offset_points_into_template() {
    insta::assert_snapshot!(
        snapshot_template("Name: {{ 1 + }}"),
        @"error: expected expression, found end of expression at offset 13"
    );
}
