//! Integrator contract (host framework hook)

use std::sync::Arc;

use crate::application::Application;

/// A hook that wires an application into a host framework or runtime.
///
/// Concrete integrations (HTTP middleware, job runners) live outside the
/// core; [`Application::integrate`](crate::application::Application::integrate)
/// is a pure dispatch to this trait.
pub trait Integrator {
    /// Performs the integration against the given application.
    fn integrate(&self, application: &Arc<Application>) -> anyhow::Result<()>;
}
