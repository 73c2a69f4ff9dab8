use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use tracing::{
  debug,
  info
};

use crate::config::ElementsConfig;
use crate::page::Page;

/// Typed shortcut values shorter than this never activate
/// an entry.
pub const MIN_SHORTCUT_LEN: usize = 2;

/// The auxiliary selection panels next to the command
/// input.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum PanelKind {
  Tag,
  Query
}

impl PanelKind {
  pub fn all() -> [Self; 2] {
    [Self::Tag, Self::Query]
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Tag => "tag",
      | Self::Query => "query"
    }
  }

  /// The container toggled by the hidden marker.
  pub fn drawer_id(self) -> String {
    format!("{}s_map_drawer", self.as_key())
  }

  /// The filter input inside the panel.
  pub fn input_id(self) -> String {
    format!("{}-inp", self.as_key())
  }

  /// The list entry a typed shortcut selects.
  pub fn entry_id(
    self,
    shortcut: &str
  ) -> String {
    format!("{}s_{shortcut}", self.as_key())
  }

  /// The panel whose filter input has this id.
  pub fn from_input_id(
    id: &str
  ) -> Option<Self> {
    Self::all()
      .into_iter()
      .find(|kind| kind.input_id() == id)
  }
}

impl fmt::Display for PanelKind {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for PanelKind {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim() {
      | "tag" => Ok(Self::Tag),
      | "query" => Ok(Self::Query),
      | other => {
        Err(anyhow!(
          "unknown panel kind: {other}"
        ))
      }
    }
  }
}

/// Shows and hides the tag and query panels and the task
/// annotation editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelToggler {
  command_input:           String,
  annotation_input:        String,
  annotation_trigger:      String,
  annotation_class:        String,
  annotation_entry_prefix: String
}

impl PanelToggler {
  pub fn new(
    config: &ElementsConfig
  ) -> Self {
    Self {
      command_input:           config
        .command_input
        .clone(),
      annotation_input:        config
        .annotation_input
        .clone(),
      annotation_trigger:      config
        .annotation_trigger
        .clone(),
      annotation_class:        config
        .annotation_class
        .clone(),
      annotation_entry_prefix: config
        .annotation_entry_prefix
        .clone()
    }
  }

  /// Flips the panel and, when it ends up rendered, moves
  /// focus into its filter input. Returns whether the
  /// panel is visible afterwards.
  #[tracing::instrument(skip(self, page))]
  pub fn toggle_panel<P: Page>(
    &self,
    page: &mut P,
    kind: PanelKind
  ) -> bool {
    let drawer = kind.drawer_id();
    if !page.toggle_hidden(&drawer) {
      debug!(drawer = %drawer, "panel drawer not on page");
      return false;
    }

    let input = kind.input_id();
    let visible = page.is_visible(&input);
    if visible {
      page.focus(&input);
    }
    info!(%kind, visible, "toggled panel");
    visible
  }

  /// Closes the panel whose filter input is `target` and
  /// hands focus back to the command input.
  pub fn close_focused_panel<P: Page>(
    &self,
    page: &mut P,
    target: Option<&str>
  ) -> Option<PanelKind> {
    let kind = target
      .and_then(PanelKind::from_input_id)?;
    page.toggle_hidden(&kind.drawer_id());
    if page.is_visible(&self.command_input)
    {
      page.focus(&self.command_input);
    }
    debug!(%kind, "closed focused panel");
    Some(kind)
  }

  /// Activates the entry named by a typed shortcut once at
  /// least two characters are in. Returns the activated
  /// id.
  pub fn process_panel_shortcut<P: Page>(
    &self,
    page: &mut P,
    kind: PanelKind,
    typed: &str
  ) -> Option<String> {
    activate_entry(
      page,
      kind.entry_id(typed),
      typed
    )
  }

  /// Shows or hides the annotation input together with
  /// every annotation row. Only the annotation trigger may
  /// do this; returns whether the event was handled.
  pub fn handle_task_annotations<P: Page>(
    &self,
    page: &mut P,
    target: Option<&str>
  ) -> bool {
    if target
      != Some(self.annotation_trigger.as_str())
    {
      debug!(
        ?target,
        "not the annotation trigger; \
         ignoring"
      );
      return false;
    }

    page.toggle_hidden(&self.annotation_input);
    let rows = page.toggle_hidden_by_class(
      &self.annotation_class
    );
    let visible =
      page.is_visible(&self.annotation_input);
    if visible {
      page.focus(&self.annotation_input);
    }
    debug!(rows, visible, "toggled annotations");
    true
  }

  /// Activates the annotation delete entry named by a typed
  /// shortcut.
  pub fn process_annotation_shortcut<
    P: Page
  >(
    &self,
    page: &mut P,
    typed: &str
  ) -> Option<String> {
    activate_entry(
      page,
      format!(
        "{}{typed}",
        self.annotation_entry_prefix
      ),
      typed
    )
  }
}

fn activate_entry<P: Page>(
  page: &mut P,
  id: String,
  typed: &str
) -> Option<String> {
  if typed.chars().count() < MIN_SHORTCUT_LEN
  {
    return None;
  }

  if page.click(&id) {
    info!(entry = %id, "activated entry from shortcut");
    Some(id)
  } else {
    debug!(entry = %id, "no entry for shortcut");
    None
  }
}
