use chrono::{
  DateTime,
  Utc
};
use tracing::{
  debug,
  info,
  warn
};

use crate::config::{
  ShortcutConfig,
  UiConfig
};
use crate::page::{
  DurableStore,
  Page
};
use crate::panel::{
  PanelKind,
  PanelToggler
};
use crate::shortcut::{
  FocusScope,
  KeyCombo,
  KeyPress,
  ScopeGuard,
  ShortcutDispatcher,
  TargetGuard
};
use crate::theme::ThemeController;
use crate::timer::{
  DayProgress,
  ElapsedTimer
};

/// What a shortcut can do.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum UiAction {
  FocusMainInput,
  CloseFocusedPanel,
  TogglePanel(PanelKind),
  ToggleTheme
}

/// Where a pointer click landed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClickTarget<'a> {
  /// The page root itself, outside any element.
  Root,
  Element(&'a str),
  Unidentified
}

/// Wires the theme, timer, shortcut and panel components to
/// one page and one durable store.
pub struct UiController<P, S> {
  page:              P,
  store:             S,
  theme:             ThemeController,
  timer:             ElapsedTimer,
  day_progress:      DayProgress,
  panels:            PanelToggler,
  shortcuts:         ShortcutDispatcher<UiAction>,
  command_input:     String,
  task_detail_input: String,
  theme_switch:      String,
  tick_ms:           u32
}

impl<P: Page, S: DurableStore> UiController<P, S> {
  pub fn new(
    config: &UiConfig,
    page: P,
    store: S
  ) -> Self {
    let shortcuts =
      build_dispatcher(config);
    info!(
      bindings = shortcuts.bindings().len(),
      themes = config.theme.themes.len(),
      "interaction controller ready"
    );
    Self {
      page,
      store,
      theme: ThemeController::new(
        &config.theme
      ),
      timer: ElapsedTimer::new(&config.timer),
      day_progress: DayProgress::new(
        &config.day_progress
      ),
      panels: PanelToggler::new(
        &config.elements
      ),
      shortcuts,
      command_input: config
        .elements
        .command_input
        .clone(),
      task_detail_input: config
        .elements
        .task_detail_input
        .clone(),
      theme_switch: config.theme.switch.clone(),
      tick_ms: config.timer.tick_ms
    }
  }

  pub fn with_day_progress(
    mut self,
    day_progress: DayProgress
  ) -> Self {
    self.day_progress = day_progress;
    self
  }

  pub fn page(&self) -> &P {
    &self.page
  }

  pub fn page_mut(&mut self) -> &mut P {
    &mut self.page
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn tick_ms(&self) -> u32 {
    self.tick_ms
  }

  pub fn shortcuts(
    &self
  ) -> &ShortcutDispatcher<UiAction> {
    &self.shortcuts
  }

  /// Runs once the page is ready.
  #[tracing::instrument(skip_all)]
  pub fn startup(&mut self) -> Option<String> {
    self
      .theme
      .initialize(&mut self.page, &mut self.store)
  }

  pub fn active_theme(&self) -> Option<String> {
    self
      .theme
      .resolve_active_theme(&self.page, &self.store)
  }

  pub fn toggle_theme(&mut self) -> Option<String> {
    self
      .theme
      .toggle_theme(&mut self.page, &mut self.store)
  }

  pub fn toggle_panel(
    &mut self,
    kind: PanelKind
  ) -> bool {
    self.panels.toggle_panel(&mut self.page, kind)
  }

  /// `typed` is the value of the input that raised the
  /// event; without one the panel's own filter input is
  /// read.
  pub fn process_panel_shortcut(
    &mut self,
    kind: PanelKind,
    typed: Option<&str>
  ) -> Option<String> {
    let typed = match typed {
      | Some(typed) => typed.to_string(),
      | None => {
        self.page.value(&kind.input_id())?
      }
    };
    self.panels.process_panel_shortcut(
      &mut self.page,
      kind,
      &typed
    )
  }

  pub fn handle_task_annotations(
    &mut self,
    target: Option<&str>
  ) -> bool {
    self
      .panels
      .handle_task_annotations(&mut self.page, target)
  }

  pub fn process_annotation_shortcut(
    &mut self,
    typed: &str
  ) -> Option<String> {
    self
      .panels
      .process_annotation_shortcut(&mut self.page, typed)
  }

  /// Focuses the task detail input when one is open, the
  /// command input otherwise.
  pub fn focus_main_input(&mut self) -> bool {
    if self.page.contains(&self.task_detail_input)
    {
      return self
        .page
        .focus(&self.task_detail_input);
    }
    let focused =
      self.page.focus(&self.command_input);
    if !focused {
      debug!(
        input = %self.command_input,
        "command input not on page"
      );
    }
    focused
  }

  /// Dispatches a key press and performs the bound action.
  pub fn handle_key(
    &mut self,
    event: &mut KeyPress
  ) -> Option<UiAction> {
    let action = self.shortcuts.dispatch(event)?;
    self.perform(action, event.target.as_deref());
    Some(action)
  }

  pub fn perform(
    &mut self,
    action: UiAction,
    target: Option<&str>
  ) {
    match action {
      | UiAction::FocusMainInput => {
        self.focus_main_input();
      }
      | UiAction::CloseFocusedPanel => {
        self.panels.close_focused_panel(
          &mut self.page,
          target
        );
      }
      | UiAction::TogglePanel(kind) => {
        self.toggle_panel(kind);
      }
      | UiAction::ToggleTheme => {
        self.toggle_theme();
      }
    }
  }

  /// Handles a pointer click. Returns whether the native
  /// behavior should be suppressed.
  pub fn handle_click(
    &mut self,
    target: ClickTarget<'_>
  ) -> bool {
    match target {
      | ClickTarget::Root => {
        self.focus_main_input();
        false
      }
      | ClickTarget::Element(id)
        if id == self.theme_switch =>
      {
        self.toggle_theme();
        true
      }
      | ClickTarget::Element(_)
      | ClickTarget::Unidentified => false
    }
  }

  /// One timer tick: the elapsed timer and the day
  /// progress indicator.
  pub fn tick(&mut self, now: DateTime<Utc>) {
    self.timer.tick(&mut self.page, now);
    self.day_progress.tick(&mut self.page, now);
  }
}

fn build_dispatcher(
  config: &UiConfig
) -> ShortcutDispatcher<UiAction> {
  let ShortcutConfig {
    focus_main,
    close_panel,
    open_tag_panel,
    open_query_panel,
    toggle_theme
  } = &config.shortcuts;
  let command_input = TargetGuard::element(
    &config.elements.command_input
  );
  let filter_inputs = TargetGuard::any_of(
    PanelKind::all().map(PanelKind::input_id)
  );

  // Theme toggling has no target to gate on, so a plain
  // key must not fire while the user is typing.
  let entries = [
    (
      focus_main,
      UiAction::FocusMainInput,
      ScopeGuard::Any,
      TargetGuard::Any
    ),
    (
      close_panel,
      UiAction::CloseFocusedPanel,
      ScopeGuard::Any,
      filter_inputs
    ),
    (
      open_tag_panel,
      UiAction::TogglePanel(PanelKind::Tag),
      ScopeGuard::Any,
      command_input.clone()
    ),
    (
      open_query_panel,
      UiAction::TogglePanel(PanelKind::Query),
      ScopeGuard::Any,
      command_input
    ),
    (
      toggle_theme,
      UiAction::ToggleTheme,
      ScopeGuard::Only(FocusScope::Other),
      TargetGuard::Any
    )
  ];

  let mut dispatcher = ShortcutDispatcher::new();
  for (raw, action, scope, target) in entries {
    let Some(raw) = raw else {
      debug!(?action, "shortcut unbound");
      continue;
    };
    match raw.parse::<KeyCombo>() {
      | Ok(combo) => {
        dispatcher.register_scoped_binding(
          combo, scope, target, action
        );
      }
      | Err(error) => {
        warn!(
          %error,
          ?action,
          "skipping invalid shortcut"
        );
      }
    }
  }
  dispatcher
}
