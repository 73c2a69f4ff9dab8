use twk_ui_core::DurableStore;
use web_sys::Storage;

/// `localStorage`, when the browser grants it. Without it
/// reads find nothing and writes are dropped.
pub struct LocalStore {
  storage: Option<Storage>
}

impl LocalStore {
  pub fn from_window() -> Self {
    let storage = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });
    if storage.is_none() {
      tracing::warn!(
        "local storage unavailable; theme \
         will not persist"
      );
    }
    Self { storage }
  }
}

impl DurableStore for LocalStore {
  fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self
      .storage
      .as_ref()?
      .get_item(key)
      .ok()
      .flatten()
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) {
    if let Some(storage) = &self.storage
      && let Err(error) =
        storage.set_item(key, value)
    {
      tracing::warn!(
        key,
        error = ?error,
        "failed writing local storage"
      );
    }
  }

  fn remove(&mut self, key: &str) {
    if let Some(storage) = &self.storage
      && let Err(error) =
        storage.remove_item(key)
    {
      tracing::warn!(
        key,
        error = ?error,
        "failed clearing local storage"
      );
    }
  }
}
