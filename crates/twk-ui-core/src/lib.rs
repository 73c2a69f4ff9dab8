//! Client-side interaction logic for the taskwarrior web UI:
//! theme persistence, the running-task timer, keyboard
//! shortcuts and the filter panels.
//!
//! Everything here works against the [`page::Page`] and
//! [`page::DurableStore`] seams, so it runs the same in the
//! browser and in headless tests.

pub mod config;
pub mod controller;
pub mod page;
pub mod panel;
pub mod shortcut;
pub mod theme;
pub mod timer;

pub use config::UiConfig;
pub use controller::{
  ClickTarget,
  UiAction,
  UiController
};
pub use page::{
  ControlKind,
  DurableStore,
  MemoryElement,
  MemoryPage,
  MemoryStore,
  Page,
  ReadyState
};
pub use panel::PanelKind;
pub use shortcut::{
  FocusScope,
  Key,
  KeyCombo,
  KeyPress,
  Modifiers
};
pub use timer::{
  Cancel,
  TimerHandle
};
