use gloo::events::{
  EventListener,
  EventListenerOptions
};
use twk_ui_core::{
  ClickTarget,
  Key,
  KeyCombo,
  KeyPress,
  Modifiers,
  Page
};
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Event,
  KeyboardEvent
};

use crate::SharedUi;
use crate::dom::{
  event_target_element,
  event_target_id
};

/// Listens for shortcuts and clicks on the whole document.
/// Dropping the listeners detaches them.
pub fn attach(
  document: &Document,
  ui: &SharedUi
) -> Vec<EventListener> {
  let keydown = {
    let ui = ui.clone();
    EventListener::new_with_options(
      document,
      "keydown",
      EventListenerOptions::enable_prevent_default(),
      move |event| on_keydown(&ui, event)
    )
  };

  let click = {
    let ui = ui.clone();
    let page = document.clone();
    EventListener::new_with_options(
      document,
      "click",
      EventListenerOptions::enable_prevent_default(),
      move |event| on_click(&ui, &page, event)
    )
  };

  vec![keydown, click]
}

fn key_press(
  event: &KeyboardEvent
) -> Option<KeyPress> {
  let key = Key::from_event_key(&event.key())?;
  let modifiers = Modifiers {
    ctrl:  event.ctrl_key(),
    shift: event.shift_key(),
    alt:   event.alt_key(),
    meta:  event.meta_key()
  };
  Some(KeyPress::new(KeyCombo::new(
    key, modifiers
  )))
}

fn on_keydown(ui: &SharedUi, event: &Event) {
  let Some(keyboard) =
    event.dyn_ref::<KeyboardEvent>()
  else {
    return;
  };
  let Some(mut press) = key_press(keyboard)
  else {
    return;
  };

  let Ok(mut ui) = ui.try_borrow_mut() else {
    tracing::debug!(
      "ui busy; dropping key press"
    );
    return;
  };
  press.target = event_target_id(event);
  press.focused = ui.page().focused_control();

  if ui.handle_key(&mut press).is_some()
    && press.default_prevented
  {
    event.prevent_default();
  }
}

fn on_click(
  ui: &SharedUi,
  document: &Document,
  event: &Event
) {
  let element = event_target_element(event);
  let root = document.document_element();
  let id = event_target_id(event);
  let target = match (&element, &root) {
    | (Some(element), Some(root))
      if element == root =>
    {
      ClickTarget::Root
    }
    | _ => {
      match id.as_deref() {
        | Some(id) => ClickTarget::Element(id),
        | None => ClickTarget::Unidentified
      }
    }
  };

  let Ok(mut ui) = ui.try_borrow_mut() else {
    tracing::trace!(
      "ui busy; ignoring nested click"
    );
    return;
  };
  if ui.handle_click(target) {
    event.prevent_default();
  }
}
