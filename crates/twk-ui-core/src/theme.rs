use tracing::{
  debug,
  info
};

use crate::config::ThemeConfig;
use crate::page::{
  DurableStore,
  Page
};

/// Resolves, cycles and persists the visual theme.
///
/// The theme lives in two places: the durable store and a
/// live attribute on the page root. The live attribute wins
/// once set; the store only wins at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeController {
  themes:         Vec<String>,
  icons:          Vec<String>,
  storage_key:    String,
  root_attribute: String,
  switch:         String
}

impl ThemeController {
  pub fn new(config: &ThemeConfig) -> Self {
    Self {
      themes:         config.themes.clone(),
      icons:          config.icons.clone(),
      storage_key:    config
        .storage_key
        .clone(),
      root_attribute: config
        .root_attribute
        .clone(),
      switch:         config.switch.clone()
    }
  }

  pub fn themes(&self) -> &[String] {
    &self.themes
  }

  pub fn index_of(
    &self,
    theme: &str
  ) -> Option<usize> {
    self
      .themes
      .iter()
      .position(|known| known == theme)
  }

  /// The glyph for a theme. No theme and unknown themes
  /// share the first glyph.
  pub fn icon_for(
    &self,
    theme: Option<&str>
  ) -> &str {
    let icon_index = theme
      .and_then(|theme| {
        self.index_of(theme)
      })
      .map_or(0, |index| index + 1);
    self
      .icons
      .get(icon_index)
      .or_else(|| self.icons.first())
      .map_or("", String::as_str)
  }

  pub fn resolve_active_theme<P, S>(
    &self,
    page: &P,
    store: &S
  ) -> Option<String>
  where
    P: Page,
    S: DurableStore
  {
    page
      .root_attribute(&self.root_attribute)
      .or_else(|| {
        store.get(&self.storage_key)
      })
  }

  /// Applies the stored theme, overriding the live
  /// attribute. Without a stored theme only the icon is
  /// brought in line with the live attribute.
  #[tracing::instrument(skip_all)]
  pub fn initialize<P, S>(
    &self,
    page: &mut P,
    store: &mut S
  ) -> Option<String>
  where
    P: Page,
    S: DurableStore
  {
    if let Some(stored) =
      store.get(&self.storage_key)
    {
      info!(theme = %stored, "applying stored theme");
      self.apply(
        page,
        store,
        Some(stored.as_str()),
        true
      );
      return Some(stored);
    }

    let live = page
      .root_attribute(&self.root_attribute);
    debug!(theme = ?live, "no stored theme; refreshing icon only");
    self.refresh_icon(page, live.as_deref());
    live
  }

  /// Advances to the next theme, wrapping through "no
  /// theme" after the last one.
  #[tracing::instrument(skip_all)]
  pub fn toggle_theme<P, S>(
    &self,
    page: &mut P,
    store: &mut S
  ) -> Option<String>
  where
    P: Page,
    S: DurableStore
  {
    let current =
      self.resolve_active_theme(page, store);
    let next = self.next_after(
      current.as_deref()
    );
    info!(from = ?current, to = ?next, "switching theme");
    self.apply(
      page,
      store,
      next.as_deref(),
      true
    );
    next
  }

  fn next_after(
    &self,
    current: Option<&str>
  ) -> Option<String> {
    let next_index = match current
      .and_then(|theme| self.index_of(theme))
    {
      | Some(index) => index + 1,
      | None => 0
    };
    self.themes.get(next_index).cloned()
  }

  fn apply<P, S>(
    &self,
    page: &mut P,
    store: &mut S,
    theme: Option<&str>,
    persist: bool
  ) where
    P: Page,
    S: DurableStore
  {
    if persist {
      match theme {
        | Some(theme) => {
          store.set(&self.storage_key, theme)
        }
        | None => {
          store.remove(&self.storage_key)
        }
      }
    }
    page.set_root_attribute(
      &self.root_attribute,
      theme
    );
    self.refresh_icon(page, theme);
  }

  fn refresh_icon<P: Page>(
    &self,
    page: &mut P,
    theme: Option<&str>
  ) {
    let icon = self.icon_for(theme);
    if !page.set_text(&self.switch, icon) {
      debug!(
        switch = %self.switch,
        "theme switch not on page"
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::page::{
    MemoryElement,
    MemoryPage,
    MemoryStore
  };

  fn fixture()
  -> (ThemeController, MemoryPage, MemoryStore)
  {
    let controller = ThemeController::new(
      &ThemeConfig::default()
    );
    let page = MemoryPage::new()
      .with_element(
        "theme-switcher",
        MemoryElement::default()
      );
    (controller, page, MemoryStore::new())
  }

  fn switch_text(page: &MemoryPage) -> &str {
    page
      .element("theme-switcher")
      .map_or("", |element| {
        element.text.as_str()
      })
  }

  #[test]
  fn cycles_through_every_theme_and_back() {
    let (controller, mut page, mut store) =
      fixture();
    let themes =
      controller.themes().to_vec();

    for (index, theme) in
      themes.iter().enumerate()
    {
      let (_, mut page, mut store) =
        fixture();
      let mut last = None;
      for _ in 0..=index {
        last = controller
          .toggle_theme(&mut page, &mut store);
      }
      assert_eq!(
        last.as_deref(),
        Some(theme.as_str())
      );
    }

    for _ in 0..=themes.len() {
      controller
        .toggle_theme(&mut page, &mut store);
    }
    assert_eq!(
      controller
        .resolve_active_theme(&page, &store),
      None
    );
    assert_eq!(
      store.get("TWK_THEME"),
      None
    );
    assert_eq!(switch_text(&page), "⚹");
  }

  #[test]
  fn toggle_writes_attribute_store_and_icon(
  ) {
    let (controller, mut page, mut store) =
      fixture();

    controller
      .toggle_theme(&mut page, &mut store);

    assert_eq!(
      page
        .root_attribute("data-theme")
        .as_deref(),
      Some("taskwarrior-dark")
    );
    assert_eq!(
      store.get("TWK_THEME").as_deref(),
      Some("taskwarrior-dark")
    );
    assert_eq!(switch_text(&page), "☽");
  }

  #[test]
  fn stored_theme_overrides_live_attribute(
  ) {
    let (controller, mut page, _) =
      fixture();
    let mut store = MemoryStore::new()
      .with_entry(
        "TWK_THEME",
        "taskwarrior-light"
      );
    page.set_root_attribute(
      "data-theme",
      Some("taskwarrior-dark")
    );

    controller
      .initialize(&mut page, &mut store);

    assert_eq!(
      controller
        .resolve_active_theme(&page, &store)
        .as_deref(),
      Some("taskwarrior-light")
    );
    assert_eq!(switch_text(&page), "🌣");
  }

  #[test]
  fn empty_store_only_refreshes_icon() {
    let (controller, mut page, mut store) =
      fixture();
    page.set_root_attribute(
      "data-theme",
      Some("taskwarrior-light")
    );

    let resolved = controller
      .initialize(&mut page, &mut store);

    assert_eq!(
      resolved.as_deref(),
      Some("taskwarrior-light")
    );
    assert_eq!(store.get("TWK_THEME"), None);
    assert_eq!(switch_text(&page), "🌣");
  }

  #[test]
  fn live_attribute_wins_after_initialization(
  ) {
    let (controller, mut page, _) =
      fixture();
    let store = MemoryStore::new()
      .with_entry(
        "TWK_THEME",
        "taskwarrior-light"
      );
    page.set_root_attribute(
      "data-theme",
      Some("taskwarrior-dark")
    );

    assert_eq!(
      controller
        .resolve_active_theme(&page, &store)
        .as_deref(),
      Some("taskwarrior-dark")
    );
  }

  #[test]
  fn icons_follow_theme_index() {
    let (controller, ..) = fixture();

    assert_eq!(controller.icon_for(None), "⚹");
    assert_eq!(
      controller
        .icon_for(Some("taskwarrior-dark")),
      "☽"
    );
    assert_eq!(
      controller
        .icon_for(Some("taskwarrior-light")),
      "🌣"
    );
    assert_eq!(
      controller.icon_for(Some("solarized")),
      "⚹"
    );
  }

  #[test]
  fn unknown_live_theme_restarts_cycle() {
    let (controller, mut page, mut store) =
      fixture();
    page.set_root_attribute(
      "data-theme",
      Some("retired-theme")
    );

    let next = controller
      .toggle_theme(&mut page, &mut store);

    assert_eq!(
      next.as_deref(),
      Some("taskwarrior-dark")
    );
  }

  #[test]
  fn missing_switch_is_tolerated() {
    let controller = ThemeController::new(
      &ThemeConfig::default()
    );
    let mut page = MemoryPage::new();
    let mut store = MemoryStore::new();

    let next = controller
      .toggle_theme(&mut page, &mut store);

    assert_eq!(
      next.as_deref(),
      Some("taskwarrior-dark")
    );
  }
}
