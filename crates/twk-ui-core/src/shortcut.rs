//! Keyboard shortcut matching and focus-scope gating.
//!
//! Combinations use the `[modifiers+]key` form, e.g.
//! `ctrl+shift+k`, `esc` or `t`. Modifier names are case
//! insensitive and a binding only matches an event with the
//! same set of modifiers held.

use std::fmt;
use std::str::FromStr;

use anyhow::{
  anyhow,
  bail
};
use tracing::{
  debug,
  trace
};

use crate::page::ControlKind;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
)]
pub struct Modifiers {
  pub ctrl:  bool,
  pub shift: bool,
  pub alt:   bool,
  pub meta:  bool
}

impl Modifiers {
  pub const NONE: Self = Self {
    ctrl:  false,
    shift: false,
    alt:   false,
    meta:  false
  };
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum Key {
  Escape,
  Enter,
  Tab,
  Space,
  Backspace,
  Delete,
  ArrowUp,
  ArrowDown,
  ArrowLeft,
  ArrowRight,
  Function(u8),
  /// A printable character, stored lowercase.
  Char(char)
}

impl Key {
  /// Parses a key name as written in a combination.
  fn parse_name(name: &str) -> Option<Self> {
    let mut chars = name.chars();
    if let (Some(ch), None) =
      (chars.next(), chars.next())
    {
      return Some(Self::Char(
        ch.to_ascii_lowercase()
      ));
    }

    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
      | "esc" | "escape" => {
        Some(Self::Escape)
      }
      | "enter" | "return" => {
        Some(Self::Enter)
      }
      | "tab" => Some(Self::Tab),
      | "space" | "spacebar" => {
        Some(Self::Space)
      }
      | "backspace" => {
        Some(Self::Backspace)
      }
      | "delete" | "del" => {
        Some(Self::Delete)
      }
      | "up" | "arrowup" => {
        Some(Self::ArrowUp)
      }
      | "down" | "arrowdown" => {
        Some(Self::ArrowDown)
      }
      | "left" | "arrowleft" => {
        Some(Self::ArrowLeft)
      }
      | "right" | "arrowright" => {
        Some(Self::ArrowRight)
      }
      | other => {
        let number = other
          .strip_prefix('f')?
          .parse::<u8>()
          .ok()?;
        (1..=12)
          .contains(&number)
          .then_some(Self::Function(number))
      }
    }
  }

  /// Maps a browser `KeyboardEvent.key` value. Unknown
  /// named keys (`Shift`, `CapsLock`, ...) map to `None`.
  pub fn from_event_key(
    raw: &str
  ) -> Option<Self> {
    match raw {
      | " " => Some(Self::Space),
      | "Esc" => Some(Self::Escape),
      | "Del" => Some(Self::Delete),
      | "Up" => Some(Self::ArrowUp),
      | "Down" => Some(Self::ArrowDown),
      | "Left" => Some(Self::ArrowLeft),
      | "Right" => Some(Self::ArrowRight),
      | other => Self::parse_name(other)
    }
  }
}

impl fmt::Display for Key {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::Escape => f.write_str("esc"),
      | Self::Enter => f.write_str("enter"),
      | Self::Tab => f.write_str("tab"),
      | Self::Space => f.write_str("space"),
      | Self::Backspace => {
        f.write_str("backspace")
      }
      | Self::Delete => {
        f.write_str("delete")
      }
      | Self::ArrowUp => f.write_str("up"),
      | Self::ArrowDown => {
        f.write_str("down")
      }
      | Self::ArrowLeft => {
        f.write_str("left")
      }
      | Self::ArrowRight => {
        f.write_str("right")
      }
      | Self::Function(number) => {
        write!(f, "f{number}")
      }
      | Self::Char(ch) => write!(f, "{ch}")
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub struct KeyCombo {
  pub key:       Key,
  pub modifiers: Modifiers
}

impl KeyCombo {
  pub fn new(
    key: Key,
    modifiers: Modifiers
  ) -> Self {
    Self { key, modifiers }
  }
}

impl FromStr for KeyCombo {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.is_empty() {
      bail!("empty key combination");
    }

    let mut modifiers = Modifiers::NONE;
    let mut key = None;
    for part in s.split('+') {
      let part = part.trim();
      match part
        .to_ascii_lowercase()
        .as_str()
      {
        | "ctrl" | "control" => {
          modifiers.ctrl = true
        }
        | "shift" => modifiers.shift = true,
        | "alt" | "option" => {
          modifiers.alt = true
        }
        | "meta" | "cmd" | "command" => {
          modifiers.meta = true
        }
        | _ => {
          if key.is_some() {
            bail!(
              "more than one key in \
               combination: {s}"
            );
          }
          key = Some(
            Key::parse_name(part).ok_or_else(
              || {
                anyhow!(
                  "unknown key {part:?} in \
                   combination: {s}"
                )
              }
            )?
          );
        }
      }
    }

    let key = key.ok_or_else(|| {
      anyhow!(
        "combination has no key: {s}"
      )
    })?;
    Ok(Self::new(key, modifiers))
  }
}

impl fmt::Display for KeyCombo {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    let held = [
      (self.modifiers.ctrl, "ctrl"),
      (self.modifiers.shift, "shift"),
      (self.modifiers.alt, "alt"),
      (self.modifiers.meta, "meta")
    ];
    for (on, name) in held {
      if on {
        write!(f, "{name}+")?;
      }
    }
    write!(f, "{}", self.key)
  }
}

/// Where keyboard focus currently sits.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum FocusScope {
  /// A text-entry capable control holds focus.
  Input,
  Other
}

impl FocusScope {
  pub fn classify(
    focused: Option<ControlKind>
  ) -> Self {
    match focused {
      | Some(kind)
        if kind.accepts_text_entry() =>
      {
        Self::Input
      }
      | _ => Self::Other
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ScopeGuard {
  Any,
  Only(FocusScope)
}

impl ScopeGuard {
  fn admits(self, scope: FocusScope) -> bool {
    match self {
      | Self::Any => true,
      | Self::Only(required) => {
        required == scope
      }
    }
  }
}

/// The element an event must target for a binding to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetGuard {
  Any,
  Element(String),
  AnyOf(Vec<String>)
}

impl TargetGuard {
  pub fn element(id: &str) -> Self {
    Self::Element(id.to_string())
  }

  pub fn any_of<I, T>(ids: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>
  {
    Self::AnyOf(
      ids.into_iter().map(Into::into).collect()
    )
  }

  fn admits(
    &self,
    target: Option<&str>
  ) -> bool {
    match self {
      | Self::Any => true,
      | Self::Element(id) => {
        target == Some(id.as_str())
      }
      | Self::AnyOf(ids) => {
        target.is_some_and(|target| {
          ids.iter().any(|id| id == target)
        })
      }
    }
  }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
  pub combo:             KeyCombo,
  /// Id of the element the event targets.
  pub target:            Option<String>,
  pub focused:           Option<ControlKind>,
  pub default_prevented: bool
}

impl KeyPress {
  pub fn new(combo: KeyCombo) -> Self {
    Self {
      combo,
      target: None,
      focused: None,
      default_prevented: false
    }
  }

  pub fn on(
    mut self,
    target: &str,
    focused: ControlKind
  ) -> Self {
    self.target = Some(target.to_string());
    self.focused = Some(focused);
    self
  }

  pub fn prevent_default(&mut self) {
    self.default_prevented = true;
  }

  pub fn scope(&self) -> FocusScope {
    FocusScope::classify(self.focused)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding<A> {
  pub combo:  KeyCombo,
  pub scope:  ScopeGuard,
  pub target: TargetGuard,
  pub action: A
}

/// Routes key presses to bound actions.
///
/// Bindings are tried in registration order and the first
/// one whose combination, scope and target all match fires.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutDispatcher<A> {
  bindings: Vec<Binding<A>>
}

impl<A> Default for ShortcutDispatcher<A> {
  fn default() -> Self {
    Self {
      bindings: Vec::new()
    }
  }
}

impl<A: Clone + fmt::Debug>
  ShortcutDispatcher<A>
{
  pub fn new() -> Self {
    Self::default()
  }

  pub fn bindings(&self) -> &[Binding<A>] {
    &self.bindings
  }

  pub fn register_binding(
    &mut self,
    combo: KeyCombo,
    action: A,
    target: TargetGuard
  ) -> &mut Self {
    self.register_scoped_binding(
      combo,
      ScopeGuard::Any,
      target,
      action
    )
  }

  pub fn register_scoped_binding(
    &mut self,
    combo: KeyCombo,
    scope: ScopeGuard,
    target: TargetGuard,
    action: A
  ) -> &mut Self {
    debug!(
      combo = %combo,
      ?scope,
      ?target,
      ?action,
      "registered shortcut"
    );
    self.bindings.push(Binding {
      combo,
      scope,
      target,
      action
    });
    self
  }

  /// Fires the first matching binding. The event's native
  /// behavior is suppressed before the action is returned.
  pub fn dispatch(
    &self,
    event: &mut KeyPress
  ) -> Option<A> {
    let scope = event.scope();
    let binding =
      self.bindings.iter().find(|binding| {
        binding.combo == event.combo
          && binding.scope.admits(scope)
          && binding
            .target
            .admits(event.target.as_deref())
      });

    match binding {
      | Some(binding) => {
        event.prevent_default();
        debug!(
          combo = %event.combo,
          ?scope,
          action = ?binding.action,
          "shortcut fired"
        );
        Some(binding.action.clone())
      }
      | None => {
        trace!(
          combo = %event.combo,
          ?scope,
          target = ?event.target,
          "no shortcut for key press"
        );
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn combo(raw: &str) -> KeyCombo {
    raw.parse().expect("valid combination")
  }

  #[test]
  fn parses_modifiers_and_aliases() {
    let parsed = combo("Ctrl+Shift+K");
    assert_eq!(parsed.key, Key::Char('k'));
    assert!(parsed.modifiers.ctrl);
    assert!(parsed.modifiers.shift);
    assert!(!parsed.modifiers.alt);
    assert_eq!(parsed, combo("control+shift+k"));
    assert_eq!(combo("esc"), combo("Escape"));
    assert_eq!(
      combo("cmd+f5").to_string(),
      "meta+f5"
    );
  }

  #[test]
  fn rejects_malformed_combinations() {
    assert!("".parse::<KeyCombo>().is_err());
    assert!(
      "ctrl+shift".parse::<KeyCombo>().is_err()
    );
    assert!(
      "ctrl+a+b".parse::<KeyCombo>().is_err()
    );
    assert!(
      "hyper+x".parse::<KeyCombo>().is_err()
    );
    assert!("f13".parse::<KeyCombo>().is_err());
  }

  #[test]
  fn maps_browser_key_values() {
    assert_eq!(
      Key::from_event_key("Escape"),
      Some(Key::Escape)
    );
    assert_eq!(
      Key::from_event_key("K"),
      Some(Key::Char('k'))
    );
    assert_eq!(
      Key::from_event_key(" "),
      Some(Key::Space)
    );
    assert_eq!(Key::from_event_key("Shift"), None);
  }

  #[test]
  fn classifies_focus_by_capability() {
    assert_eq!(
      FocusScope::classify(Some(
        ControlKind::SingleLineText
      )),
      FocusScope::Input
    );
    assert_eq!(
      FocusScope::classify(Some(
        ControlKind::Selection
      )),
      FocusScope::Input
    );
    assert_eq!(
      FocusScope::classify(Some(
        ControlKind::Other
      )),
      FocusScope::Other
    );
    assert_eq!(
      FocusScope::classify(None),
      FocusScope::Other
    );
  }

  #[test]
  fn target_guard_gates_binding() {
    let mut dispatcher = ShortcutDispatcher::new();
    dispatcher.register_binding(
      combo("t"),
      "open-tags",
      TargetGuard::element("cmd-inp")
    );

    let mut on_command = KeyPress::new(
      combo("t")
    )
    .on("cmd-inp", ControlKind::SingleLineText);
    assert_eq!(
      dispatcher.dispatch(&mut on_command),
      Some("open-tags")
    );
    assert!(on_command.default_prevented);

    let mut elsewhere = KeyPress::new(
      combo("t")
    )
    .on("notes", ControlKind::MultiLineText);
    assert_eq!(
      dispatcher.dispatch(&mut elsewhere),
      None
    );
    assert!(!elsewhere.default_prevented);
  }

  #[test]
  fn modifiers_must_match_exactly() {
    let mut dispatcher = ShortcutDispatcher::new();
    dispatcher.register_binding(
      combo("ctrl+shift+k"),
      "focus",
      TargetGuard::Any
    );

    let mut plain =
      KeyPress::new(combo("k"));
    assert_eq!(dispatcher.dispatch(&mut plain), None);

    let mut extra =
      KeyPress::new(combo("ctrl+shift+alt+k"));
    assert_eq!(dispatcher.dispatch(&mut extra), None);

    let mut exact =
      KeyPress::new(combo("ctrl+shift+K"));
    assert_eq!(
      dispatcher.dispatch(&mut exact),
      Some("focus")
    );
  }

  #[test]
  fn scope_guard_keeps_letters_out_of_inputs(
  ) {
    let mut dispatcher = ShortcutDispatcher::new();
    dispatcher.register_scoped_binding(
      combo("g"),
      ScopeGuard::Only(FocusScope::Other),
      TargetGuard::Any,
      "go"
    );

    let mut typing = KeyPress::new(combo("g"))
      .on("cmd-inp", ControlKind::SingleLineText);
    assert_eq!(
      dispatcher.dispatch(&mut typing),
      None
    );

    let mut browsing = KeyPress::new(combo("g"))
      .on("task-row", ControlKind::Other);
    assert_eq!(
      dispatcher.dispatch(&mut browsing),
      Some("go")
    );
  }

  #[test]
  fn any_of_target_guard() {
    let mut dispatcher = ShortcutDispatcher::new();
    dispatcher.register_binding(
      combo("esc"),
      "close",
      TargetGuard::any_of(["tag-inp", "query-inp"])
    );

    let mut on_query = KeyPress::new(combo("esc"))
      .on("query-inp", ControlKind::SingleLineText);
    assert_eq!(
      dispatcher.dispatch(&mut on_query),
      Some("close")
    );

    let mut untargeted =
      KeyPress::new(combo("esc"));
    assert_eq!(
      dispatcher.dispatch(&mut untargeted),
      None
    );
  }
}
