use log::warn;
use web_sys::Storage;

/// Boolean flags that live for one browser session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionFlags {
    fn is_set(&self, key: &str) -> bool;
    fn set(&self, key: &str);
}

/// `window.sessionStorage`. Storage that is unavailable or throws (private
/// mode, quota) reads as unset and drops writes.
pub struct BrowserSession {
    storage: Option<Storage>,
}

impl BrowserSession {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| match w.session_storage() {
            Ok(storage) => storage,
            Err(e) => {
                warn!("session storage unavailable: {:?}", e);
                None
            }
        });
        Self { storage }
    }
}

impl SessionFlags for BrowserSession {
    fn is_set(&self, key: &str) -> bool {
        let Some(storage) = &self.storage else {
            return false;
        };
        matches!(storage.get_item(key), Ok(Some(_)))
    }

    fn set(&self, key: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, "true") {
                warn!("failed to persist session flag {}: {:?}", key, e);
            }
        }
    }
}

#[cfg(test)]
pub struct MemorySession {
    flags: std::cell::RefCell<std::collections::HashSet<String>>,
}

#[cfg(test)]
impl MemorySession {
    pub fn new() -> Self {
        Self {
            flags: Default::default(),
        }
    }
}

#[cfg(test)]
impl SessionFlags for MemorySession {
    fn is_set(&self, key: &str) -> bool {
        self.flags.borrow().contains(key)
    }

    fn set(&self, key: &str) {
        self.flags.borrow_mut().insert(key.to_string());
    }
}
