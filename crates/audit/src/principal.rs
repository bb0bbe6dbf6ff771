/// Actor recorded when no principal is authenticated.
pub const SYSTEM_ACTOR: &str = "system";

/// Resolves the principal responsible for the current call.
///
/// The resolver is an injected collaborator, not ambient global state:
/// whoever hosts the core (an HTTP layer, a batch job) decides what a
/// "current principal" means and passes a resolver in. Implementations
/// return `None` when nobody is authenticated — including anonymous
/// sentinel principals — and the audit trail then attributes the mutation
/// to [`SYSTEM_ACTOR`].
pub trait PrincipalResolver: Send + Sync {
    /// Returns the authenticated principal's name, if any.
    fn current_actor(&self) -> Option<String>;
}

/// Resolver for unauthenticated or background contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPrincipal;

impl PrincipalResolver for SystemPrincipal {
    fn current_actor(&self) -> Option<String> {
        None
    }
}

/// Resolver pinned to a known principal name.
///
/// Suited to request-scoped wiring where the caller already authenticated
/// the principal.
#[derive(Debug, Clone)]
pub struct StaticPrincipal {
    name: String,
}

impl StaticPrincipal {
    /// Creates a resolver that always reports the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PrincipalResolver for StaticPrincipal {
    fn current_actor(&self) -> Option<String> {
        Some(self.name.clone())
    }
}
