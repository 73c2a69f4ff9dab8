use twk_ui_core::page::HIDDEN_CLASS;
use twk_ui_core::{
  ControlKind,
  Page
};
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  Event,
  HtmlElement,
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};

/// Input types that take no typed text.
const NON_TEXT_INPUT_TYPES: [&str; 10] = [
  "button", "checkbox", "color", "file",
  "hidden", "image", "radio", "range",
  "reset", "submit"
];

/// The live browser document.
#[derive(Clone)]
pub struct DomPage {
  document: Document
}

impl DomPage {
  pub fn new(document: Document) -> Self {
    Self { document }
  }

  pub fn from_window() -> Option<Self> {
    web_sys::window()
      .and_then(|window| window.document())
      .map(Self::new)
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  /// Text of an inline element, used for page-provided
  /// configuration.
  pub fn inline_text(
    &self,
    id: &str
  ) -> Option<String> {
    self
      .element(id)
      .and_then(|element| {
        element.text_content()
      })
  }

  fn element(
    &self,
    id: &str
  ) -> Option<Element> {
    self.document.get_element_by_id(id)
  }

  fn html_element(
    &self,
    id: &str
  ) -> Option<HtmlElement> {
    self
      .element(id)?
      .dyn_into::<HtmlElement>()
      .ok()
  }

  fn toggle_marker(element: &Element) -> bool {
    match element
      .class_list()
      .toggle(HIDDEN_CLASS)
    {
      | Ok(_) => true,
      | Err(error) => {
        tracing::warn!(
          id = %element.id(),
          error = ?error,
          "failed toggling hidden marker"
        );
        false
      }
    }
  }
}

/// Classifies an element by what it accepts from the
/// keyboard.
pub fn control_kind(
  element: &Element
) -> ControlKind {
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    let kind =
      input.type_().to_ascii_lowercase();
    return if NON_TEXT_INPUT_TYPES
      .contains(&kind.as_str())
    {
      ControlKind::Other
    } else {
      ControlKind::SingleLineText
    };
  }
  if element
    .dyn_ref::<HtmlTextAreaElement>()
    .is_some()
  {
    return ControlKind::MultiLineText;
  }
  if element
    .dyn_ref::<HtmlSelectElement>()
    .is_some()
  {
    return ControlKind::Selection;
  }
  match element.dyn_ref::<HtmlElement>() {
    | Some(html)
      if html.is_content_editable() =>
    {
      ControlKind::MultiLineText
    }
    | _ => ControlKind::Other
  }
}

/// The element an event was dispatched to.
pub fn event_target_element(
  event: &Event
) -> Option<Element> {
  event
    .target()?
    .dyn_into::<Element>()
    .ok()
}

/// Id of the event target; empty ids count as none.
pub fn event_target_id(
  event: &Event
) -> Option<String> {
  event_target_element(event)
    .map(|element| element.id())
    .filter(|id| !id.is_empty())
}

/// Current value of the control that raised the event.
pub fn event_target_value(
  event: &Event
) -> Option<String> {
  event_target_element(event)
    .and_then(|element| {
      control_value(&element)
    })
}

fn control_value(
  element: &Element
) -> Option<String> {
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    return Some(input.value());
  }
  if let Some(area) =
    element.dyn_ref::<HtmlTextAreaElement>()
  {
    return Some(area.value());
  }
  element
    .dyn_ref::<HtmlSelectElement>()
    .map(HtmlSelectElement::value)
}

impl Page for DomPage {
  fn root_attribute(
    &self,
    name: &str
  ) -> Option<String> {
    self
      .document
      .document_element()?
      .get_attribute(name)
  }

  fn set_root_attribute(
    &mut self,
    name: &str,
    value: Option<&str>
  ) {
    let Some(root) =
      self.document.document_element()
    else {
      return;
    };
    let result = match value {
      | Some(value) => {
        root.set_attribute(name, value)
      }
      | None => root.remove_attribute(name)
    };
    if let Err(error) = result {
      tracing::warn!(
        attribute = name,
        error = ?error,
        "failed writing root attribute"
      );
    }
  }

  fn contains(&self, id: &str) -> bool {
    self.element(id).is_some()
  }

  fn attribute(
    &self,
    id: &str,
    name: &str
  ) -> Option<String> {
    self.element(id)?.get_attribute(name)
  }

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> bool {
    match self.html_element(id) {
      | Some(element) => {
        element.set_inner_text(text);
        true
      }
      | None => false
    }
  }

  fn has_descendant(
    &self,
    id: &str,
    class: &str
  ) -> bool {
    self
      .element(id)
      .and_then(|element| {
        element
          .query_selector(&format!(".{class}"))
          .ok()
          .flatten()
      })
      .is_some()
  }

  fn set_descendant_text(
    &mut self,
    id: &str,
    class: &str,
    text: &str
  ) -> bool {
    match self.element(id).and_then(
      |element| {
        element
          .query_selector(&format!(".{class}"))
          .ok()
          .flatten()
      }
    ) {
      | Some(target) => {
        target.set_text_content(Some(text));
        true
      }
      | None => false
    }
  }

  fn set_progress(
    &mut self,
    id: &str,
    percent: f64,
    label: &str
  ) -> bool {
    let Some(bar) = self.html_element(id)
    else {
      return false;
    };

    if let Err(error) = bar
      .style()
      .set_property(
        "width",
        &format!("{percent}%")
      )
    {
      tracing::warn!(
        id,
        error = ?error,
        "failed setting progress width"
      );
    }

    match bar
      .first_element_child()
      .and_then(|child| {
        child.first_element_child()
      }) {
      | Some(slot) => {
        slot.set_text_content(Some(label))
      }
      | None => {
        tracing::debug!(
          id,
          "progress bar has no label slot"
        )
      }
    }
    true
  }

  fn toggle_hidden(
    &mut self,
    id: &str
  ) -> bool {
    self
      .element(id)
      .is_some_and(|element| {
        Self::toggle_marker(&element)
      })
  }

  fn toggle_hidden_by_class(
    &mut self,
    class: &str
  ) -> usize {
    let members = self
      .document
      .get_elements_by_class_name(class);
    (0..members.length())
      .filter_map(|index| members.item(index))
      .filter(|element| {
        Self::toggle_marker(element)
      })
      .count()
  }

  fn is_visible(&self, id: &str) -> bool {
    self.element(id).is_some_and(
      |element| {
        !element
          .class_list()
          .contains(HIDDEN_CLASS)
          && element
            .get_client_rects()
            .length()
            > 0
      }
    )
  }

  fn focus(&mut self, id: &str) -> bool {
    match self.html_element(id) {
      | Some(element) => {
        match element.focus() {
          | Ok(()) => true,
          | Err(error) => {
            tracing::warn!(
              id,
              error = ?error,
              "focus failed"
            );
            false
          }
        }
      }
      | None => false
    }
  }

  fn value(
    &self,
    id: &str
  ) -> Option<String> {
    control_value(&self.element(id)?)
  }

  fn click(&mut self, id: &str) -> bool {
    match self.html_element(id) {
      | Some(element) => {
        element.click();
        true
      }
      | None => false
    }
  }

  fn focused_control(
    &self
  ) -> Option<ControlKind> {
    self
      .document
      .active_element()
      .map(|element| control_kind(&element))
  }
}
