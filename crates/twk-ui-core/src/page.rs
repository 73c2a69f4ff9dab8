//! The rendered page and the durable store, as seen by the
//! interaction components.
//!
//! Elements are addressed by id. Every accessor tolerates
//! absent elements: reads return `None`/`false` and writes
//! report whether anything was touched.

use std::collections::{
  BTreeMap,
  BTreeSet
};

/// The class used as the hidden marker on toggled
/// containers.
pub const HIDDEN_CLASS: &str = "hidden";

/// What kind of control an element is, as far as keyboard
/// input is concerned.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum ControlKind {
  SingleLineText,
  MultiLineText,
  Selection,
  #[default]
  Other
}

impl ControlKind {
  /// Whether typing into this control produces text, so
  /// plain keys belong to the control rather than to
  /// shortcuts.
  pub fn accepts_text_entry(
    self
  ) -> bool {
    match self {
      | Self::SingleLineText
      | Self::MultiLineText
      | Self::Selection => true,
      | Self::Other => false
    }
  }
}

/// Parsing progress reported by `document.readyState`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ReadyState {
  Loading,
  Interactive,
  Complete
}

impl ReadyState {
  /// Unknown values count as parsed, so startup is never
  /// postponed forever.
  pub fn from_document_state(
    raw: &str
  ) -> Self {
    match raw {
      | "loading" => Self::Loading,
      | "interactive" => Self::Interactive,
      | _ => Self::Complete
    }
  }

  /// Whether startup has to wait for `DOMContentLoaded`.
  pub fn defers_startup(self) -> bool {
    self == Self::Loading
  }
}

pub trait Page {
  fn root_attribute(
    &self,
    name: &str
  ) -> Option<String>;

  /// `None` removes the attribute.
  fn set_root_attribute(
    &mut self,
    name: &str,
    value: Option<&str>
  );

  fn contains(&self, id: &str) -> bool;

  fn attribute(
    &self,
    id: &str,
    name: &str
  ) -> Option<String>;

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> bool;

  fn has_descendant(
    &self,
    id: &str,
    class: &str
  ) -> bool;

  /// Writes the text of the first descendant of `id`
  /// carrying `class`.
  fn set_descendant_text(
    &mut self,
    id: &str,
    class: &str,
    text: &str
  ) -> bool;

  /// Sets the width of a progress bar and the text of its
  /// label.
  fn set_progress(
    &mut self,
    id: &str,
    percent: f64,
    label: &str
  ) -> bool;

  /// Flips the hidden marker. Returns `false` when the
  /// element is absent.
  fn toggle_hidden(
    &mut self,
    id: &str
  ) -> bool;

  /// Flips the hidden marker on every element carrying
  /// `class`, returning how many were flipped.
  fn toggle_hidden_by_class(
    &mut self,
    class: &str
  ) -> usize;

  /// Whether the element is actually rendered. Layout can
  /// hide an element that has no hidden marker.
  fn is_visible(&self, id: &str) -> bool;

  fn focus(&mut self, id: &str) -> bool;

  fn value(
    &self,
    id: &str
  ) -> Option<String>;

  /// Activates the element as a pointer click would.
  fn click(&mut self, id: &str) -> bool;

  /// The kind of the focused control, `None` when nothing
  /// holds focus.
  fn focused_control(
    &self
  ) -> Option<ControlKind>;
}

/// Key-value storage that survives reloads.
pub trait DurableStore {
  fn get(
    &self,
    key: &str
  ) -> Option<String>;

  fn set(
    &mut self,
    key: &str,
    value: &str
  );

  fn remove(&mut self, key: &str);
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MemoryStore {
  entries: BTreeMap<String, String>
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_entry(
    mut self,
    key: &str,
    value: &str
  ) -> Self {
    self.set(key, value);
    self
  }
}

impl DurableStore for MemoryStore {
  fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.entries.get(key).cloned()
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) {
    self.entries.insert(
      key.to_string(),
      value.to_string()
    );
  }

  fn remove(&mut self, key: &str) {
    self.entries.remove(key);
  }
}

#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct MemoryElement {
  pub control:       ControlKind,
  pub text:          String,
  pub value:         String,
  pub classes:       BTreeSet<String>,
  pub attributes:
    BTreeMap<String, String>,
  /// Text of descendants, keyed by their class.
  pub descendants:
    BTreeMap<String, String>,
  /// Hidden by layout even without the hidden marker.
  pub layout_hidden: bool,
  /// Id of the containing element.
  pub parent:        Option<String>,
  pub width_percent: Option<f64>,
  pub clicks:        u32
}

impl MemoryElement {
  pub fn new(control: ControlKind) -> Self {
    Self {
      control,
      ..Self::default()
    }
  }

  pub fn hidden(mut self) -> Self {
    self
      .classes
      .insert(HIDDEN_CLASS.to_string());
    self
  }

  pub fn with_class(
    mut self,
    class: &str
  ) -> Self {
    self.classes.insert(class.to_string());
    self
  }

  pub fn with_attribute(
    mut self,
    name: &str,
    value: &str
  ) -> Self {
    self.attributes.insert(
      name.to_string(),
      value.to_string()
    );
    self
  }

  pub fn with_descendant(
    mut self,
    class: &str,
    text: &str
  ) -> Self {
    self.descendants.insert(
      class.to_string(),
      text.to_string()
    );
    self
  }

  pub fn with_value(
    mut self,
    value: &str
  ) -> Self {
    self.value = value.to_string();
    self
  }

  pub fn with_parent(
    mut self,
    id: &str
  ) -> Self {
    self.parent = Some(id.to_string());
    self
  }

  pub fn is_marked_hidden(&self) -> bool {
    self.classes.contains(HIDDEN_CLASS)
  }

  fn toggle_marker(&mut self) {
    if !self.classes.remove(HIDDEN_CLASS)
    {
      self
        .classes
        .insert(HIDDEN_CLASS.to_string());
    }
  }
}

/// A page held entirely in memory, for headless use and
/// tests.
#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct MemoryPage {
  root_attributes:
    BTreeMap<String, String>,
  elements: BTreeMap<String, MemoryElement>,
  focused:  Option<String>
}

impl MemoryPage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_element(
    mut self,
    id: &str,
    element: MemoryElement
  ) -> Self {
    self.insert(id, element);
    self
  }

  pub fn insert(
    &mut self,
    id: &str,
    element: MemoryElement
  ) {
    self
      .elements
      .insert(id.to_string(), element);
  }

  pub fn element(
    &self,
    id: &str
  ) -> Option<&MemoryElement> {
    self.elements.get(id)
  }

  pub fn element_mut(
    &mut self,
    id: &str
  ) -> Option<&mut MemoryElement> {
    self.elements.get_mut(id)
  }

  pub fn focused(&self) -> Option<&str> {
    self.focused.as_deref()
  }

  pub fn set_value(
    &mut self,
    id: &str,
    value: &str
  ) {
    if let Some(element) =
      self.elements.get_mut(id)
    {
      element.value = value.to_string();
    }
  }
}

impl Page for MemoryPage {
  fn root_attribute(
    &self,
    name: &str
  ) -> Option<String> {
    self.root_attributes.get(name).cloned()
  }

  fn set_root_attribute(
    &mut self,
    name: &str,
    value: Option<&str>
  ) {
    match value {
      | Some(value) => {
        self.root_attributes.insert(
          name.to_string(),
          value.to_string()
        );
      }
      | None => {
        self.root_attributes.remove(name);
      }
    }
  }

  fn contains(&self, id: &str) -> bool {
    self.elements.contains_key(id)
  }

  fn attribute(
    &self,
    id: &str,
    name: &str
  ) -> Option<String> {
    self
      .elements
      .get(id)?
      .attributes
      .get(name)
      .cloned()
  }

  fn set_text(
    &mut self,
    id: &str,
    text: &str
  ) -> bool {
    match self.elements.get_mut(id) {
      | Some(element) => {
        element.text = text.to_string();
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
    self.elements.get(id).is_some_and(
      |element| {
        element
          .descendants
          .contains_key(class)
      }
    )
  }

  fn set_descendant_text(
    &mut self,
    id: &str,
    class: &str,
    text: &str
  ) -> bool {
    match self
      .elements
      .get_mut(id)
      .and_then(|element| {
        element.descendants.get_mut(class)
      }) {
      | Some(slot) => {
        *slot = text.to_string();
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
    match self.elements.get_mut(id) {
      | Some(element) => {
        element.width_percent =
          Some(percent);
        element.text = label.to_string();
        true
      }
      | None => false
    }
  }

  fn toggle_hidden(
    &mut self,
    id: &str
  ) -> bool {
    match self.elements.get_mut(id) {
      | Some(element) => {
        element.toggle_marker();
        true
      }
      | None => false
    }
  }

  fn toggle_hidden_by_class(
    &mut self,
    class: &str
  ) -> usize {
    let mut flipped = 0;
    for element in self
      .elements
      .values_mut()
      .filter(|element| {
        element.classes.contains(class)
      })
    {
      element.toggle_marker();
      flipped += 1;
    }
    flipped
  }

  /// An element renders only when it and every ancestor
  /// do.
  fn is_visible(&self, id: &str) -> bool {
    let mut current = Some(id);
    // Bounded so a parent cycle cannot loop forever.
    for _ in 0..=self.elements.len() {
      let Some(id) = current else {
        return true;
      };
      let Some(element) = self.elements.get(id)
      else {
        // Detached from the page.
        return false;
      };
      if element.is_marked_hidden()
        || element.layout_hidden
      {
        return false;
      }
      current = element.parent.as_deref();
    }
    false
  }

  fn focus(&mut self, id: &str) -> bool {
    if self.elements.contains_key(id) {
      self.focused = Some(id.to_string());
      true
    } else {
      false
    }
  }

  fn value(
    &self,
    id: &str
  ) -> Option<String> {
    self
      .elements
      .get(id)
      .map(|element| element.value.clone())
  }

  fn click(&mut self, id: &str) -> bool {
    match self.elements.get_mut(id) {
      | Some(element) => {
        element.clicks =
          element.clicks.saturating_add(1);
        true
      }
      | None => false
    }
  }

  fn focused_control(
    &self
  ) -> Option<ControlKind> {
    self
      .focused
      .as_deref()
      .and_then(|id| self.elements.get(id))
      .map(|element| element.control)
  }
}
