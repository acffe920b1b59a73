//! Application registry
//!
//! A [`Registry`] maps application names to live applications and enforces
//! name uniqueness. Registration and lookup are serialized by a single
//! mutex so the check-and-insert is one atomic unit across threads.
//!
//! Most programs use the process-wide handle returned by
//! [`Registry::global`]; tests construct their own instances with
//! [`Registry::new`] to stay isolated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::application::Application;
use crate::error::{Error, Result};

/// A name-to-application registry.
pub struct Registry {
    applications: Mutex<HashMap<String, Arc<Application>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Registry {
            applications: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry used by
    /// [`Application::new`](crate::application::Application::new).
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Registers an application under its name.
    ///
    /// Fails with [`Error::ApplicationAlreadyExists`] when the name is
    /// taken; the error names where the existing application was created.
    /// The registry is left unchanged in that case.
    pub fn register(&self, application: &Arc<Application>) -> Result<()> {
        let mut applications = self
            .applications
            .lock()
            .expect("application registry lock poisoned");

        if let Some(existing) = applications.get(application.name()) {
            return Err(Error::ApplicationAlreadyExists {
                name: application.name().to_string(),
                existing_location: existing.creation_location().to_string(),
            });
        }

        applications.insert(application.name().to_string(), Arc::clone(application));
        Ok(())
    }

    /// Looks up an application by name.
    pub fn find(&self, name: &str) -> Option<Arc<Application>> {
        self.applications
            .lock()
            .expect("application registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Removes and returns the application registered under `name`.
    pub fn unregister(&self, name: &str) -> Option<Arc<Application>> {
        self.applications
            .lock()
            .expect("application registry lock poisoned")
            .remove(name)
    }

    /// The registered names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.applications
            .lock()
            .expect("application registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered applications.
    pub fn len(&self) -> usize {
        self.applications
            .lock()
            .expect("application registry lock poisoned")
            .len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every registration. Intended for test teardown only.
    pub fn clear(&self) {
        self.applications
            .lock()
            .expect("application registry lock poisoned")
            .clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_find() {
        let registry = Registry::new();
        let app = Application::with_registry("web", &registry).unwrap();
        let found = registry.find("web").unwrap();
        assert!(Arc::ptr_eq(&app, &found));
        assert_eq!(registry.names(), vec!["web".to_string()]);
    }

    #[test]
    fn test_duplicate_name_fails_and_keeps_first() {
        let registry = Registry::new();
        let first = Application::with_registry("dup", &registry).unwrap();

        let err = Application::with_registry("dup", &registry).unwrap_err();
        match err {
            Error::ApplicationAlreadyExists {
                name,
                existing_location,
            } => {
                assert_eq!(name, "dup");
                assert_eq!(existing_location, first.creation_location());
                assert!(existing_location.contains("registry.rs"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.find("dup").unwrap(), &first));
    }

    #[test]
    fn test_unregister_and_clear() {
        let registry = Registry::new();
        Application::with_registry("a", &registry).unwrap();
        Application::with_registry("b", &registry).unwrap();
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_registration_admits_one_winner() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    Application::with_registry("contended", &registry).is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(registry.len(), 1);
    }
}
