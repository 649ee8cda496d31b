mod common;
use common::*;

const DECK: &str = r#"
buttons_per_page = 4

[pages.home]
buttons = [
  { name = "Lights", tap_action = { action = "$page.go_to", data = { page = "lights" } } },
  { name = "Scene", tap_action = { action = "scene.turn_on", data = { entity_id = "scene.movie" } } },
  { name = "Idle" },
]

[pages.lights]
buttons = [
  { entity_id = "light.kitchen", tap_action = "light.toggle" },
  { name = "L1" },
  { name = "L2" },
  { name = "L3" },
]
"#;

#[test]
fn test_go_to_renders_sub_page_with_back_button() {
    let config = config(DECK);
    let snapshot = home_snapshot("off");
    let mut stack = PageStack::new("home");
    let mut services = ServiceLog::default();

    let home = render_current(&config, &snapshot, &mut stack);
    assert_eq!(labels(&home), vec!["Lights", "Scene", "Idle", "-"]);

    assert!(press(&home, 0, &mut stack, &mut services));
    assert_eq!(stack.current().page_id, "lights");

    let lights = render_current(&config, &snapshot, &mut stack);
    assert_eq!(lights.page_count, 2);
    assert_eq!(
        labels(&lights),
        vec!["mdi:arrow-left", "Kitchen", "L1", "mdi:chevron-right"]
    );

    assert!(press(&lights, 0, &mut stack, &mut services));
    assert_eq!(stack.current().page_id, "home");
    assert!(services.calls.is_empty());
}

#[test]
fn test_next_and_previous_walk_pages() {
    let config = config(DECK);
    let snapshot = home_snapshot("off");
    let mut stack = PageStack::new("home");
    let mut services = ServiceLog::default();
    stack.go_to("lights");

    let first = render_current(&config, &snapshot, &mut stack);
    assert!(press(&first, 3, &mut stack, &mut services));
    assert_eq!(stack.request().page_number, 2);

    let second = render_current(&config, &snapshot, &mut stack);
    assert_eq!(labels(&second), vec!["mdi:chevron-left", "L2", "L3", "-"]);
    assert_eq!(changed(&second), vec![0, 1, 2, 3]);

    assert!(press(&second, 0, &mut stack, &mut services));
    assert_eq!(stack.request().page_number, 1);
}

#[test]
fn test_service_actions_reach_caller() {
    let config = config(DECK);
    let snapshot = home_snapshot("off");
    let mut stack = PageStack::new("home");
    let mut services = ServiceLog::default();

    let home = render_current(&config, &snapshot, &mut stack);
    assert!(press(&home, 1, &mut stack, &mut services));
    assert!(!press(&home, 2, &mut stack, &mut services));
    assert!(!press(&home, 3, &mut stack, &mut services));
    assert_eq!(services.calls, vec!["scene.turn_on"]);
    assert_eq!(stack.depth(), 1);
}
