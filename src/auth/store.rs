//! Durable and in-memory credential storage

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::credential::Credential;

/// Observer invoked synchronously on every [`SessionStore`] mutation.
///
/// Receives the new credential, or `None` when the session was cleared.
pub type SessionObserver = Arc<dyn Fn(Option<&Credential>) + Send + Sync>;

/// One named durable slot holding the current credential as a string.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    storage_path: PathBuf,
}

impl Default for CredentialFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialFile {
    /// Create a slot at the default path (platform-specific config directory)
    #[must_use]
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("streamcast");

        Self {
            storage_path: config_dir.join("credential"),
        }
    }

    /// Create a slot at a custom path
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { storage_path: path }
    }

    /// Get the slot path
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.storage_path
    }

    /// Load the stored credential, if the slot holds a usable one.
    ///
    /// A missing slot and an unparsable slot both read as `None`; a stale
    /// slot is not worth failing session setup over.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the slot exists but cannot be read.
    pub fn load(&self) -> std::io::Result<Option<Credential>> {
        if !self.storage_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.storage_path)?;
        Ok(Credential::from_header_value(content.trim()).ok())
    }

    /// Persist a credential to the slot.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the slot cannot be written.
    pub fn save(&self, credential: &Credential) -> std::io::Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.storage_path, credential.as_str())?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.storage_path, perms)?;
        }

        Ok(())
    }

    /// Remove the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the slot exists but cannot be deleted.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.storage_path.exists() {
            std::fs::remove_file(&self.storage_path)?;
        }
        Ok(())
    }
}

/// Holder of the current session credential.
///
/// Keeps an in-memory copy hydrated from the durable slot at construction,
/// writes every change back to the slot, and synchronously notifies the
/// single registered observer. When the durable slot is unavailable the
/// store degrades to memory-only operation instead of failing the session.
pub struct SessionStore {
    slot: CredentialFile,
    current: Mutex<Option<Credential>>,
    observer: Option<SessionObserver>,
}

impl SessionStore {
    /// Create a store over the given slot, hydrating the in-memory copy.
    pub fn new(slot: CredentialFile, observer: Option<SessionObserver>) -> Self {
        let current = match slot.load() {
            Ok(credential) => credential,
            Err(error) => {
                tracing::warn!(%error, path = %slot.path().display(),
                    "credential slot unreadable, starting without a session");
                None
            }
        };

        Self {
            slot,
            current: Mutex::new(current),
            observer,
        }
    }

    /// Current credential, if any
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        self.current
            .lock()
            .expect("session store lock poisoned")
            .clone()
    }

    /// Whether a credential is currently held
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.get().is_some()
    }

    /// Replace the current credential (or clear it with `None`).
    ///
    /// Persists to the durable slot, updates the in-memory copy, and invokes
    /// the observer with the new value. Slot I/O failure degrades to
    /// memory-only state with a warning.
    pub fn set(&self, credential: Option<Credential>) {
        let persisted = match &credential {
            Some(value) => self.slot.save(value),
            None => self.slot.clear(),
        };
        if let Err(error) = persisted {
            tracing::warn!(%error, path = %self.slot.path().display(),
                "credential slot unwritable, keeping session in memory only");
        }

        *self
            .current
            .lock()
            .expect("session store lock poisoned") = credential.clone();

        tracing::debug!(present = credential.is_some(), "session credential updated");

        if let Some(observer) = &self.observer {
            observer(credential.as_ref());
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("slot", &self.slot)
            .field("has_credential", &self.has_credential())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn slot_in(dir: &TempDir) -> CredentialFile {
        CredentialFile::with_path(dir.path().join("credential"))
    }

    #[test]
    fn slot_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let slot = slot_in(&dir);

        assert!(slot.load().unwrap().is_none());

        let credential = Credential::from_header_value("tok1").unwrap();
        slot.save(&credential).unwrap();
        assert_eq!(slot.load().unwrap(), Some(credential));

        slot.clear().unwrap();
        assert!(slot.load().unwrap().is_none());
    }

    #[test]
    fn stale_slot_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let slot = slot_in(&dir);
        std::fs::write(slot.path(), "null").unwrap();

        assert!(slot.load().unwrap().is_none());
    }

    #[test]
    fn store_hydrates_from_slot() {
        let dir = TempDir::new().unwrap();
        let slot = slot_in(&dir);
        slot.save(&Credential::from_header_value("tok1").unwrap())
            .unwrap();

        let store = SessionStore::new(slot, None);
        assert_eq!(store.get().unwrap().as_str(), "tok1");
    }

    #[test]
    fn set_persists_and_notifies_observer() {
        let dir = TempDir::new().unwrap();
        let slot = slot_in(&dir);

        let calls = Arc::new(AtomicUsize::new(0));
        let cleared = Arc::new(AtomicUsize::new(0));
        let observer: SessionObserver = {
            let calls = calls.clone();
            let cleared = cleared.clone();
            Arc::new(move |credential| {
                calls.fetch_add(1, Ordering::SeqCst);
                if credential.is_none() {
                    cleared.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let store = SessionStore::new(slot.clone(), Some(observer));
        store.set(Some(Credential::from_header_value("tok2").unwrap()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.load().unwrap().unwrap().as_str(), "tok2");

        store.set(None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cleared.load(Ordering::SeqCst), 1);
        assert!(store.get().is_none());
        assert!(slot.load().unwrap().is_none());
    }

    #[test]
    fn set_degrades_to_memory_when_slot_unwritable() {
        let dir = TempDir::new().unwrap();
        // A regular file where the slot expects its parent directory makes
        // every save fail, independent of process privileges.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let slot = CredentialFile::with_path(blocker.join("credential"));

        let calls = Arc::new(AtomicUsize::new(0));
        let observer: SessionObserver = {
            let calls = calls.clone();
            Arc::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let store = SessionStore::new(slot, Some(observer));
        store.set(Some(Credential::from_header_value("tok3").unwrap()));

        assert_eq!(store.get().unwrap().as_str(), "tok3");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
