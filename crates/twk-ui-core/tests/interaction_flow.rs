use chrono::{Duration, TimeZone, Utc};
use twk_ui_core::timer::{DayClock, DayProgress};
use twk_ui_core::{
    ControlKind, DurableStore, KeyCombo, KeyPress, MemoryElement, MemoryPage, MemoryStore, Page,
    PanelKind, UiAction, UiConfig, UiController,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn task_page() -> MemoryPage {
    MemoryPage::new()
        .with_element("cmd-inp", MemoryElement::new(ControlKind::SingleLineText))
        .with_element("theme-switcher", MemoryElement::default())
        .with_element("tags_map_drawer", MemoryElement::default().hidden())
        .with_element(
            "tag-inp",
            MemoryElement::new(ControlKind::SingleLineText).with_parent("tags_map_drawer"),
        )
        .with_element("querys_map_drawer", MemoryElement::default().hidden())
        .with_element(
            "query-inp",
            MemoryElement::new(ControlKind::SingleLineText).with_parent("querys_map_drawer"),
        )
        .with_element("tags_wk", MemoryElement::default())
        .with_element("task-list", MemoryElement::default())
        .with_element(
            "active-timer",
            MemoryElement::default()
                .with_attribute("data-task-start", "20250501T035408Z")
                .with_descendant("timer-duration", "00:00:00"),
        )
        .with_element("time_of_the_day", MemoryElement::default())
}

fn key(raw: &str) -> KeyCombo {
    raw.parse().expect("valid combination")
}

#[test]
fn stored_theme_then_cycle_back_to_default() {
    init_tracing();
    let mut page = task_page();
    page.set_root_attribute("data-theme", Some("taskwarrior-dark"));
    let store = MemoryStore::new().with_entry("TWK_THEME", "taskwarrior-light");
    let mut ui = UiController::new(&UiConfig::embedded(), page, store);

    assert_eq!(ui.startup().as_deref(), Some("taskwarrior-light"));
    assert_eq!(
        ui.page().element("theme-switcher").map(|e| e.text.as_str()),
        Some("🌣")
    );

    assert_eq!(ui.toggle_theme(), None);
    assert_eq!(ui.page().root_attribute("data-theme"), None);
    assert_eq!(ui.store().get("TWK_THEME"), None);

    assert_eq!(ui.toggle_theme().as_deref(), Some("taskwarrior-dark"));
    assert_eq!(ui.toggle_theme().as_deref(), Some("taskwarrior-light"));
}

#[test]
fn tag_panel_keyboard_flow() {
    init_tracing();
    let mut ui = UiController::new(&UiConfig::embedded(), task_page(), MemoryStore::new());

    let mut elsewhere = KeyPress::new(key("t")).on("task-list", ControlKind::Other);
    let untouched = ui.page().clone();
    assert_eq!(ui.handle_key(&mut elsewhere), None);
    assert_eq!(ui.page(), &untouched);

    let mut open = KeyPress::new(key("t")).on("cmd-inp", ControlKind::SingleLineText);
    assert_eq!(
        ui.handle_key(&mut open),
        Some(UiAction::TogglePanel(PanelKind::Tag))
    );
    assert!(open.default_prevented);
    assert!(ui.page().is_visible("tags_map_drawer"));
    assert_eq!(ui.page().focused(), Some("tag-inp"));

    ui.page_mut().set_value("tag-inp", "w");
    assert_eq!(ui.process_panel_shortcut(PanelKind::Tag, None), None);
    ui.page_mut().set_value("tag-inp", "wk");
    assert_eq!(
        ui.process_panel_shortcut(PanelKind::Tag, None),
        Some("tags_wk".to_string())
    );
    assert_eq!(ui.page().element("tags_wk").map(|e| e.clicks), Some(1));

    let mut close = KeyPress::new(key("esc")).on("tag-inp", ControlKind::SingleLineText);
    assert_eq!(
        ui.handle_key(&mut close),
        Some(UiAction::CloseFocusedPanel)
    );
    assert!(!ui.page().is_visible("tags_map_drawer"));
    assert!(!ui.page().is_visible("tag-inp"));
    assert_eq!(ui.page().focused(), Some("cmd-inp"));

    let mut reopen = KeyPress::new(key("t")).on("cmd-inp", ControlKind::SingleLineText);
    ui.handle_key(&mut reopen);
    assert_eq!(ui.page().focused(), Some("tag-inp"));
    ui.page_mut().focus("cmd-inp");
    assert!(!ui.toggle_panel(PanelKind::Tag));
    assert_eq!(ui.page().focused(), Some("cmd-inp"));
}

#[test]
fn focus_shortcut_works_from_anywhere() {
    init_tracing();
    let mut ui = UiController::new(&UiConfig::embedded(), task_page(), MemoryStore::new());

    let mut press = KeyPress::new(key("ctrl+shift+k")).on("task-list", ControlKind::Other);
    assert_eq!(ui.handle_key(&mut press), Some(UiAction::FocusMainInput));
    assert!(press.default_prevented);
    assert_eq!(ui.page().focused(), Some("cmd-inp"));
}

#[test]
fn ticks_recompute_timer_and_day_progress() {
    init_tracing();
    let mut ui = UiController::new(&UiConfig::embedded(), task_page(), MemoryStore::new())
        .with_day_progress(
            DayProgress::new(&UiConfig::embedded().day_progress)
                .with_clock(DayClock::Zone(chrono_tz::UTC)),
        );
    let anchor = Utc
        .with_ymd_and_hms(2025, 5, 1, 3, 54, 8)
        .single()
        .expect("valid anchor");

    ui.tick(anchor + Duration::seconds(52));
    ui.tick(anchor + Duration::seconds(3661));

    let timer = ui.page().element("active-timer").expect("timer element");
    assert_eq!(
        timer.descendants.get("timer-duration").map(String::as_str),
        Some("01:01:01")
    );

    let progress = ui.page().element("time_of_the_day").expect("progress element");
    assert_eq!(progress.text, "20h");
    assert!(progress.width_percent.is_some());
}

#[test]
fn tick_without_timer_changes_nothing() {
    init_tracing();
    let page = MemoryPage::new().with_element("cmd-inp", MemoryElement::default());
    let mut ui = UiController::new(&UiConfig::embedded(), page, MemoryStore::new());
    let before = ui.page().clone();

    ui.tick(Utc::now());

    assert_eq!(ui.page(), &before);
}
