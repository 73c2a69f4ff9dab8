use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

pub const DEFAULT_CONFIG_TOML: &str =
  include_str!("../assets/ui.toml");

const DEFAULT_TICK_MS: u32 = 1000;
const FALLBACK_ICON: &str = "⚹";

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct UiConfig {
  #[serde(default = "default_version")]
  pub version:      u32,
  #[serde(default)]
  pub theme:        ThemeConfig,
  #[serde(default)]
  pub timer:        TimerConfig,
  #[serde(default)]
  pub day_progress: DayProgressConfig,
  #[serde(default)]
  pub elements:     ElementsConfig,
  #[serde(default)]
  pub shortcuts:    ShortcutConfig
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ThemeConfig {
  pub themes:         Vec<String>,
  pub icons:          Vec<String>,
  pub storage_key:    String,
  pub root_attribute: String,
  pub switch:         String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct TimerConfig {
  pub tick_ms:          u32,
  pub container:        String,
  pub duration_class:   String,
  pub anchor_attribute: String
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct DayProgressConfig {
  pub element:  String,
  pub timezone: Option<String>
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ElementsConfig {
  pub command_input:           String,
  pub task_detail_input:       String,
  pub annotation_input:        String,
  pub annotation_trigger:      String,
  pub annotation_class:        String,
  pub annotation_entry_prefix: String
}

/// Key combinations per action. `None` leaves the action
/// unbound.
#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ShortcutConfig {
  pub focus_main:       Option<String>,
  pub close_panel:      Option<String>,
  pub open_tag_panel:   Option<String>,
  pub open_query_panel: Option<String>,
  pub toggle_theme:     Option<String>
}

fn default_version() -> u32 {
  1
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      version:      default_version(),
      theme:        ThemeConfig::default(),
      timer:        TimerConfig::default(),
      day_progress:
        DayProgressConfig::default(),
      elements:     ElementsConfig::default(
      ),
      shortcuts:    ShortcutConfig::default(
      )
    }
  }
}

impl Default for ThemeConfig {
  fn default() -> Self {
    Self {
      themes:         vec![
        "taskwarrior-dark".to_string(),
        "taskwarrior-light".to_string(),
      ],
      icons:          vec![
        FALLBACK_ICON.to_string(),
        "☽".to_string(),
        "🌣".to_string(),
      ],
      storage_key:    "TWK_THEME"
        .to_string(),
      root_attribute: "data-theme"
        .to_string(),
      switch:         "theme-switcher"
        .to_string()
    }
  }
}

impl Default for TimerConfig {
  fn default() -> Self {
    Self {
      tick_ms:          DEFAULT_TICK_MS,
      container:        "active-timer"
        .to_string(),
      duration_class:   "timer-duration"
        .to_string(),
      anchor_attribute: "data-task-start"
        .to_string()
    }
  }
}

impl Default for DayProgressConfig {
  fn default() -> Self {
    Self {
      element:  "time_of_the_day"
        .to_string(),
      timezone: None
    }
  }
}

impl Default for ElementsConfig {
  fn default() -> Self {
    Self {
      command_input:           "cmd-inp"
        .to_string(),
      task_detail_input:
        "task-details-inp".to_string(),
      annotation_input:        "anno-inp"
        .to_string(),
      annotation_trigger:
        "btn-denotate-task".to_string(),
      annotation_class:
        "is-a-annotation".to_string(),
      annotation_entry_prefix:
        "anno_dlt_".to_string()
    }
  }
}

impl Default for ShortcutConfig {
  fn default() -> Self {
    Self {
      focus_main:       Some(
        "ctrl+shift+k".to_string()
      ),
      close_panel:      Some(
        "esc".to_string()
      ),
      open_tag_panel:   Some(
        "t".to_string()
      ),
      open_query_panel: Some(
        "q".to_string()
      ),
      toggle_theme:     None
    }
  }
}

impl UiConfig {
  /// Parses a TOML document. Missing sections and fields
  /// take their defaults.
  pub fn from_toml(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<UiConfig>(raw)
        .context(
          "failed to parse ui config"
        )?;
    config.sanitize();
    Ok(config)
  }

  /// The configuration embedded in the crate.
  pub fn embedded() -> Self {
    match Self::from_toml(
      DEFAULT_CONFIG_TOML
    ) {
      | Ok(config) => config,
      | Err(error) => {
        tracing::error!(%error, "failed parsing embedded ui config; using defaults");
        Self::default()
      }
    }
  }

  /// Resolves the effective configuration: the page
  /// override when it parses, the embedded one otherwise.
  #[tracing::instrument(skip_all)]
  pub fn load(
    page_override: Option<&str>
  ) -> Self {
    let Some(raw) = page_override
      .map(str::trim)
      .filter(|raw| !raw.is_empty())
    else {
      debug!(
        "no page config override; \
         using embedded config"
      );
      return Self::embedded();
    };

    match Self::from_toml(raw) {
      | Ok(config) => {
        info!(
          version = config.version,
          themes = config.theme.themes.len(),
          tick_ms = config.timer.tick_ms,
          "loaded page ui config"
        );
        config
      }
      | Err(error) => {
        tracing::error!(error = ?error, "invalid page ui config; using embedded config");
        Self::embedded()
      }
    }
  }

  fn sanitize(&mut self) {
    let before = self.theme.themes.len();
    self.theme.themes.retain(|theme| {
      !theme.trim().is_empty()
    });
    if self.theme.themes.len() != before
    {
      warn!(
        dropped = before
          - self.theme.themes.len(),
        "dropped empty theme ids"
      );
    }

    let wanted =
      self.theme.themes.len() + 1;
    if self.theme.icons.len() != wanted
    {
      warn!(
        icons = self.theme.icons.len(),
        wanted,
        "icon list does not match theme \
         list; adjusting"
      );
      let filler = self
        .theme
        .icons
        .first()
        .cloned()
        .unwrap_or_else(|| {
          FALLBACK_ICON.to_string()
        });
      self
        .theme
        .icons
        .resize(wanted, filler);
    }

    if self.timer.tick_ms == 0 {
      warn!(
        "timer tick of 0ms is invalid; \
         using {DEFAULT_TICK_MS}ms"
      );
      self.timer.tick_ms =
        DEFAULT_TICK_MS;
    }
  }
}

impl DayProgressConfig {
  /// The configured zone, if any and valid. `None` means
  /// the local wall clock.
  pub fn resolve_timezone(
    &self
  ) -> Option<Tz> {
    let raw = self.timezone.as_ref()?;
    parse_timezone(raw, "day_progress")
  }
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %error,
        "invalid timezone id; using local clock"
      );
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_config_matches_defaults()
  {
    let embedded = UiConfig::embedded();
    assert_eq!(
      embedded,
      UiConfig::default()
    );
  }

  #[test]
  fn partial_override_keeps_defaults() {
    let config = UiConfig::from_toml(
      r#"
      [timer]
      tick_ms = 500

      [shortcuts]
      toggle_theme = "alt+t"
      "#
    )
    .expect("parse override");

    assert_eq!(config.timer.tick_ms, 500);
    assert_eq!(
      config.timer.container,
      "active-timer"
    );
    assert_eq!(
      config.shortcuts.toggle_theme,
      Some("alt+t".to_string())
    );
    assert_eq!(
      config.shortcuts.close_panel,
      Some("esc".to_string())
    );
    assert_eq!(
      config.theme.storage_key,
      "TWK_THEME"
    );
  }

  #[test]
  fn sanitize_pads_icons_and_resets_tick(
  ) {
    let config = UiConfig::from_toml(
      r#"
      [theme]
      themes = ["nord", "", "solarized", "paper"]
      icons = ["*", "N"]

      [timer]
      tick_ms = 0
      "#
    )
    .expect("parse override");

    assert_eq!(
      config.theme.themes,
      vec!["nord", "solarized", "paper"]
    );
    assert_eq!(
      config.theme.icons,
      vec!["*", "N", "*", "*"]
    );
    assert_eq!(
      config.timer.tick_ms,
      DEFAULT_TICK_MS
    );
  }

  #[test]
  fn invalid_override_falls_back() {
    let config =
      UiConfig::load(Some("[timer"));
    assert_eq!(
      config,
      UiConfig::embedded()
    );

    let blank = UiConfig::load(Some(
      "   "
    ));
    assert_eq!(
      blank,
      UiConfig::embedded()
    );
  }

  #[test]
  fn resolves_day_progress_timezone() {
    let mut config =
      DayProgressConfig::default();
    assert_eq!(
      config.resolve_timezone(),
      None
    );

    config.timezone =
      Some("Europe/Berlin".to_string());
    assert_eq!(
      config.resolve_timezone(),
      Some(chrono_tz::Europe::Berlin)
    );

    config.timezone =
      Some("Mars/Olympus".to_string());
    assert_eq!(
      config.resolve_timezone(),
      None
    );
  }
}
