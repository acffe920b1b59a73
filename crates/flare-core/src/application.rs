//! Applications and report dispatch
//!
//! An [`Application`] is a named reporting context: it owns a [`Config`],
//! an ordered list of child routes, and implements the `report` dispatch
//! algorithm: rejecter gating, matcher gating, reporter invocation, and
//! recursion into routes.
//!
//! Routes form a tree: a parent owns its children (`Arc` in the `routes`
//! list), children hold a non-owning back-reference (`Weak`) used only for
//! inherited-pipeline lookups, so the hierarchy never cycles.

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{CapturedError, Event};
use crate::logger::Logger;
use crate::pipeline::{Key, Pipeline};
use crate::ports::{DataExtension, Filter, Integrator};
use crate::registry::Registry;

/// What `report` did with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The event passed gating and every reporter ran
    Reported,
    /// A rejecter matched; nothing was invoked or mutated
    Rejected {
        /// The pipeline key of the matching rejecter
        key: Key,
    },
    /// Matchers were configured and none matched
    Unmatched,
}

/// A named reporting context.
///
/// Applications are always handled through `Arc`: constructors return
/// `Arc<Application>` so routes can hold weak back-references and events
/// can share the application across reporters.
pub struct Application {
    name: String,
    creation_location: &'static Location<'static>,
    parent: Weak<Application>,
    self_weak: Weak<Application>,
    config: RwLock<Config>,
    routes: RwLock<Vec<Arc<Application>>>,
    last_reported: Mutex<Option<String>>,
    panic_hook_installed: AtomicBool,
}

impl Application {
    /// Creates an application and registers it in the process-wide
    /// registry.
    ///
    /// Fails with [`Error::ApplicationAlreadyExists`] if the name is
    /// already registered.
    #[track_caller]
    pub fn new(name: impl Into<String>) -> Result<Arc<Self>> {
        let app = Self::build(name.into(), Weak::new(), Location::caller());
        Registry::global().register(&app)?;
        Ok(app)
    }

    /// Creates an application registered in an explicit registry.
    #[track_caller]
    pub fn with_registry(name: impl Into<String>, registry: &Registry) -> Result<Arc<Self>> {
        let app = Self::build(name.into(), Weak::new(), Location::caller());
        registry.register(&app)?;
        Ok(app)
    }

    /// Creates an application without registering it anywhere.
    #[track_caller]
    pub fn detached(name: impl Into<String>) -> Arc<Self> {
        Self::build(name.into(), Weak::new(), Location::caller())
    }

    fn build(
        name: String,
        parent: Weak<Application>,
        creation_location: &'static Location<'static>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_weak| Application {
            name,
            creation_location,
            parent,
            self_weak: self_weak.clone(),
            config: RwLock::new(Config::new()),
            routes: RwLock::new(Vec::new()),
            last_reported: Mutex::new(None),
            panic_hook_installed: AtomicBool::new(false),
        })
    }

    /// The application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this application was created, as `file:line:column`.
    pub fn creation_location(&self) -> String {
        self.creation_location.to_string()
    }

    /// The owning parent, when this application is a route.
    pub fn parent(&self) -> Option<Arc<Application>> {
        self.parent.upgrade()
    }

    /// Mutates the configuration under the config lock.
    ///
    /// ```
    /// use flare_core::{Application, Event};
    ///
    /// let app = Application::detached("docs");
    /// app.configure(|config| {
    ///     config.reporter("null", |_: &Event| anyhow::Ok(()));
    /// });
    /// ```
    pub fn configure<R>(&self, f: impl FnOnce(&mut Config) -> R) -> R {
        let mut config = self.config.write().expect("application config lock poisoned");
        f(&mut config)
    }

    /// Reads the configuration under the config lock.
    pub fn with_config<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
        let config = self.config.read().expect("application config lock poisoned");
        f(&config)
    }

    /// Creates a child route: an unregistered application that receives
    /// `report` whenever this one does, with independent matcher/rejecter
    /// gating and inherited data extensions and filters.
    #[track_caller]
    pub fn route(&self, name: impl Into<String>) -> Arc<Application> {
        let child = Self::build(name.into(), self.self_weak.clone(), Location::caller());
        self.routes
            .write()
            .expect("application routes lock poisoned")
            .push(Arc::clone(&child));
        child
    }

    /// The child routes, in creation order.
    pub fn routes(&self) -> Vec<Arc<Application>> {
        self.routes
            .read()
            .expect("application routes lock poisoned")
            .clone()
    }

    /// This application's data extensions merged with its ancestors',
    /// own entries first.
    pub fn inherited_data_extensions(&self) -> Pipeline<Arc<dyn DataExtension>> {
        let own = self.with_config(|config| config.data_extensions.clone());
        match self.parent.upgrade() {
            Some(parent) => own.merge(&parent.inherited_data_extensions()),
            None => own,
        }
    }

    /// This application's filters merged with its ancestors', own entries
    /// first.
    pub fn inherited_filters(&self) -> Pipeline<Arc<dyn Filter>> {
        let own = self.with_config(|config| config.filters.clone());
        match self.parent.upgrade() {
            Some(parent) => own.merge(&parent.inherited_filters()),
            None => own,
        }
    }

    /// A diagnostic logger writing to this application's configured log
    /// location. Resolved from the current configuration on each call, so
    /// a changed `log_location` takes effect immediately.
    pub fn logger(&self) -> Logger {
        Logger::for_application(self)
    }

    /// The fingerprint of the most recently reported error, used by the
    /// panic hook to avoid double-reporting.
    pub fn last_reported(&self) -> Option<String> {
        self.last_reported
            .lock()
            .expect("application last_reported lock poisoned")
            .clone()
    }

    /// Reports a captured error.
    ///
    /// Dispatch runs synchronously on the caller's stack:
    ///
    /// 1. Build an [`Event`] from this application, the error, and `extra`.
    /// 2. If any rejecter matches, stop; nothing is invoked or mutated.
    /// 3. If matchers are configured and none matches, stop.
    /// 4. Record the error's fingerprint as `last_reported`.
    /// 5. Invoke every reporter in pipeline order with the same event.
    ///    The first reporter error propagates as [`Error::Reporter`],
    ///    aborting the remaining reporters and the routes below.
    /// 6. Recurse into child routes in creation order; each route gates
    ///    against its own matchers and rejecters.
    pub fn report(
        &self,
        error: &CapturedError,
        extra: Option<Map<String, Value>>,
    ) -> Result<ReportOutcome> {
        let application = self
            .self_weak
            .upgrade()
            .expect("application dropped while reporting");
        let event = Event::new(application, error.clone(), extra.clone());

        let (rejecters, matchers, reporters) = self.with_config(|config| {
            (
                config.rejecters.clone(),
                config.matchers.clone(),
                config.reporters.clone(),
            )
        });

        for (key, rejecter) in rejecters.iter() {
            if rejecter.matches(&event) {
                tracing::debug!(
                    application = %self.name,
                    rejecter = %key,
                    klass = %error.klass(),
                    "event rejected"
                );
                return Ok(ReportOutcome::Rejected { key: key.clone() });
            }
        }

        if !matchers.is_empty() && !matchers.iter().any(|(_, m)| m.matches(&event)) {
            tracing::debug!(
                application = %self.name,
                klass = %error.klass(),
                "no matcher matched, event dropped"
            );
            return Ok(ReportOutcome::Unmatched);
        }

        *self
            .last_reported
            .lock()
            .expect("application last_reported lock poisoned") =
            Some(event.uniqueness_hash().to_string());

        for (key, reporter) in reporters.iter() {
            tracing::trace!(application = %self.name, reporter = %key, "dispatching event");
            reporter.report(&event).map_err(|source| Error::Reporter {
                key: key.as_str().to_string(),
                source,
            })?;
        }

        for route in self.routes() {
            route.report(error, extra.clone())?;
        }

        Ok(ReportOutcome::Reported)
    }

    /// Captures and reports a concrete error value.
    pub fn report_error<E: std::error::Error>(&self, error: &E) -> Result<ReportOutcome> {
        self.report(&CapturedError::from_error(error), None)
    }

    /// Installs a panic hook that reports panics through this application.
    ///
    /// The previous hook is chained and still runs. A panic whose
    /// fingerprint equals `last_reported` is skipped, so an error reported
    /// manually just before unwinding is not reported twice. Calling this
    /// more than once on the same application installs a single hook.
    pub fn rescue_panics(&self) {
        if self.panic_hook_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let weak = self.self_weak.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Some(app) = weak.upgrade() {
                let error = CapturedError::from_panic(info);
                let fingerprint = error.uniqueness_hash();
                let already_reported = app.last_reported().as_deref() == Some(&fingerprint);
                if !already_reported {
                    if let Err(err) = app.report(&error, None) {
                        tracing::error!(
                            application = %app.name,
                            error = %err,
                            "failed to report panic"
                        );
                    }
                }
            }
            previous(info);
        }));
    }

    /// Dispatches to an integrator. All integration logic lives in the
    /// integrator itself.
    pub fn integrate(&self, integrator: &dyn Integrator) -> anyhow::Result<()> {
        let application = self
            .self_weak
            .upgrade()
            .expect("application dropped while integrating");
        integrator.integrate(&application)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("creation_location", &self.creation_location())
            .field("routes", &self.routes().len())
            .finish()
    }
}
