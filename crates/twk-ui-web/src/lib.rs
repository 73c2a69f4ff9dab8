//! Browser binding for the taskwarrior web UI interactions.
//!
//! The page loads the module and calls `boot()` once; the
//! returned [`UiHandlers`] is what inline markup handlers
//! call into.

mod dom;
mod events;
mod storage;
mod ticker;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use twk_ui_core::{
  PanelKind,
  ReadyState,
  TimerHandle,
  UiConfig,
  UiController
};
use wasm_bindgen::prelude::*;
use web_sys::Event;

use crate::dom::{
  DomPage,
  event_target_id,
  event_target_value
};
use crate::storage::LocalStore;
use crate::ticker::Ticker;

/// Id of the optional inline TOML config element.
const CONFIG_ELEMENT_ID: &str = "twk-ui-config";

pub(crate) type SharedUi =
  Rc<RefCell<UiController<DomPage, LocalStore>>>;

#[wasm_bindgen(start)]
pub fn start() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting taskwarrior web interactions"
  );
}

/// Wires the interactions to the current document.
#[wasm_bindgen]
pub fn boot() -> Result<UiHandlers, JsValue> {
  let page =
    DomPage::from_window().ok_or_else(|| {
      js_sys::Error::new(
        "no document to attach to"
      )
    })?;
  let config = UiConfig::load(
    page
      .inline_text(CONFIG_ELEMENT_ID)
      .as_deref()
  );
  let document = page.document().clone();
  let ui: SharedUi =
    Rc::new(RefCell::new(UiController::new(
      &config,
      page,
      LocalStore::from_window()
    )));
  let timer =
    Rc::new(RefCell::new(TimerHandle::idle()));

  let mut listeners =
    events::attach(&document, &ui);
  let ready = ReadyState::from_document_state(
    &document.ready_state()
  );
  if ready.defers_startup() {
    let ui = ui.clone();
    let timer = timer.clone();
    listeners.push(EventListener::once(
      &document,
      "DOMContentLoaded",
      move |_| on_ready(&ui, &timer)
    ));
  } else {
    on_ready(&ui, &timer);
  }

  Ok(UiHandlers {
    ui,
    timer,
    listeners
  })
}

fn on_ready(
  ui: &SharedUi,
  timer: &RefCell<TimerHandle<Ticker>>
) {
  let tick_ms = match ui.try_borrow_mut() {
    | Ok(mut controller) => {
      let theme = controller.startup();
      tracing::info!(theme = ?theme, "page ready");
      controller.tick_ms()
    }
    | Err(_) => {
      tracing::warn!(
        "ui busy at page ready; skipping \
         startup"
      );
      return;
    }
  };
  ticker::restart(timer, tick_ms, ui);
}

/// Handlers the rendering layer calls from markup.
#[wasm_bindgen]
pub struct UiHandlers {
  ui:        SharedUi,
  timer:     Rc<RefCell<TimerHandle<Ticker>>>,
  listeners: Vec<EventListener>
}

impl UiHandlers {
  fn with_ui<R>(
    &self,
    action: &str,
    f: impl FnOnce(
      &mut UiController<DomPage, LocalStore>
    ) -> R
  ) -> Option<R> {
    match self.ui.try_borrow_mut() {
      | Ok(mut ui) => Some(f(&mut ui)),
      | Err(_) => {
        tracing::debug!(
          action,
          "ui busy; ignoring handler call"
        );
        None
      }
    }
  }
}

fn parse_kind(raw: &str) -> Option<PanelKind> {
  match raw.parse::<PanelKind>() {
    | Ok(kind) => Some(kind),
    | Err(error) => {
      tracing::warn!(%error, "ignoring panel request");
      None
    }
  }
}

#[wasm_bindgen]
impl UiHandlers {
  /// Shows or hides the `tag` or `query` panel. Returns
  /// whether it is visible afterwards.
  #[wasm_bindgen(js_name = togglePanel)]
  pub fn toggle_panel(&self, kind: &str) -> bool {
    parse_kind(kind)
      .and_then(|kind| {
        self.with_ui("toggle_panel", |ui| {
          ui.toggle_panel(kind)
        })
      })
      .unwrap_or(false)
  }

  #[wasm_bindgen(js_name = processPanelShortcut)]
  pub fn process_panel_shortcut(
    &self,
    event: &Event,
    kind: &str
  ) {
    let Some(kind) = parse_kind(kind) else {
      return;
    };
    let typed = event_target_value(event);
    self.with_ui(
      "process_panel_shortcut",
      |ui| {
        ui.process_panel_shortcut(
          kind,
          typed.as_deref()
        )
      }
    );
  }

  #[wasm_bindgen(js_name = handleTaskAnnotations)]
  pub fn handle_task_annotations(
    &self,
    event: &Event
  ) -> bool {
    let target = event_target_id(event);
    let handled = self
      .with_ui("handle_task_annotations", |ui| {
        ui.handle_task_annotations(
          target.as_deref()
        )
      })
      .unwrap_or(false);
    if handled {
      event.prevent_default();
    }
    handled
  }

  #[wasm_bindgen(js_name = processAnnotationShortcut)]
  pub fn process_annotation_shortcut(
    &self,
    event: &Event
  ) {
    event.prevent_default();
    let Some(typed) = event_target_value(event)
    else {
      return;
    };
    self.with_ui(
      "process_annotation_shortcut",
      |ui| ui.process_annotation_shortcut(&typed)
    );
  }

  #[wasm_bindgen(js_name = toggleTheme)]
  pub fn toggle_theme(&self) -> Option<String> {
    self
      .with_ui("toggle_theme", |ui| {
        ui.toggle_theme()
      })
      .flatten()
  }

  #[wasm_bindgen(js_name = timerRunning)]
  pub fn timer_running(&self) -> bool {
    self.timer.borrow().is_running()
  }

  /// Stops the timer and detaches every listener. Safe to
  /// call more than once.
  pub fn shutdown(&mut self) {
    self.timer.borrow_mut().stop();
    let detached = self.listeners.len();
    self.listeners.clear();
    if detached > 0 {
      tracing::info!(
        detached,
        "interactions shut down"
      );
    }
  }
}
