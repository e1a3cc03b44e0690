//! Pre-request hooks and their resolution.
//!
//! A single hook is active for one execution. It comes from, first match wins:
//! 1. a hook assigned on the call with [`RestCall::set_preprocess_hook`],
//! 2. a [`HookDeclaration`] of the last applied descriptor declaring one,
//! 3. the instance retained by the [`ExecutionContext`](super::ExecutionContext),
//! 4. the `preprocess.class` name of the global settings, looked up in the
//!    [`HookRegistry`] of the client.
//!
//! When the source asks for instance reuse, the hook is kept in the execution context
//! and handed back to later calls of the same context.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::RestCall;
use super::context::{HookSlot, HookSource};

/// Mutates a call right before its URL and body are composed.
///
/// Typical hooks inject authentication headers or placeholders.
pub trait PreprocessHook: Send + Sync {
    /// Mutates the call.
    fn preprocess(&self, call: &mut RestCall);
}

impl<F> PreprocessHook for F
where
    F: Fn(&mut RestCall) + Send + Sync,
{
    fn preprocess(&self, call: &mut RestCall) {
        self(call);
    }
}

/// Builds a new hook instance.
pub type HookFactory = Arc<dyn Fn() -> Arc<dyn PreprocessHook> + Send + Sync>;

/// Creates a [`HookFactory`] from a constructor function.
///
/// ```rust
/// use restcall_core::{RestCall, PreprocessHook, hook_factory};
///
/// struct Auth;
///
/// impl PreprocessHook for Auth {
///     fn preprocess(&self, call: &mut RestCall) {
///         call.add_http_header("Authorization", "Bearer token");
///     }
/// }
///
/// let factory = hook_factory(|| Auth);
/// # let _ = factory;
/// ```
pub fn hook_factory<H, F>(constructor: F) -> HookFactory
where
    H: PreprocessHook + 'static,
    F: Fn() -> H + Send + Sync + 'static,
{
    Arc::new(move || Arc::new(constructor()) as Arc<dyn PreprocessHook>)
}

/// A hook declared by a resource descriptor.
///
/// The name identifies the source: a reused instance is only handed back to a
/// declaration with the same name.
#[derive(Clone)]
pub struct HookDeclaration {
    name: String,
    factory: HookFactory,
    reuse_instance: bool,
}

impl HookDeclaration {
    /// Declares a hook.
    pub fn new(name: impl Into<String>, factory: HookFactory, reuse_instance: bool) -> Self {
        Self {
            name: name.into(),
            factory,
            reuse_instance,
        }
    }

    /// The source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether one instance is kept across calls.
    pub fn reuse_instance(&self) -> bool {
        self.reuse_instance
    }
}

impl fmt::Debug for HookDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDeclaration")
            .field("name", &self.name)
            .field("reuse_instance", &self.reuse_instance)
            .finish_non_exhaustive()
    }
}

/// A hook assigned directly on a call.
#[derive(Clone)]
pub(in crate::client) struct AssignedHook {
    pub(in crate::client) hook: Arc<dyn PreprocessHook>,
    pub(in crate::client) reuse_instance: bool,
}

impl fmt::Debug for AssignedHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignedHook")
            .field("reuse_instance", &self.reuse_instance)
            .finish_non_exhaustive()
    }
}

/// Named hook factories, used to resolve the `preprocess.class` setting.
///
/// An unknown name resolves to no hook.
#[derive(Clone, Default)]
pub struct HookRegistry {
    factories: IndexMap<String, HookFactory>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing a previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: HookFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// The factory registered under this name.
    pub fn get(&self, name: &str) -> Option<&HookFactory> {
        self.factories.get(name)
    }

    /// Returns `true` if a factory is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// Every candidate source of a hook for one execution.
pub(in crate::client) struct HookCandidates<'a> {
    pub(in crate::client) assigned: Option<&'a AssignedHook>,
    pub(in crate::client) declared: Option<&'a HookDeclaration>,
    pub(in crate::client) configured: Option<(&'a str, bool)>,
    pub(in crate::client) registry: &'a HookRegistry,
}

impl HookCandidates<'_> {
    /// Picks the active hook, updating the reuse slot when required.
    pub(in crate::client) fn resolve(self, slot: &mut HookSlot) -> Option<Arc<dyn PreprocessHook>> {
        if let Some(assigned) = self.assigned {
            debug!(reuse = assigned.reuse_instance, "using assigned hook");
            if assigned.reuse_instance {
                slot.store(HookSource::Assigned, Arc::clone(&assigned.hook));
            }
            return Some(Arc::clone(&assigned.hook));
        }

        if let Some(declared) = self.declared {
            return Some(Self::instantiate(
                declared.name(),
                &declared.factory,
                declared.reuse_instance,
                slot,
            ));
        }

        if let Some(hook) = slot.hook() {
            debug!(source = ?slot.source(), "reusing hook of the execution context");
            return Some(hook);
        }

        let (name, reuse_instance) = self.configured?;
        let Some(factory) = self.registry.get(name) else {
            warn!(name, "no preprocess hook registered under this name, ignoring it");
            return None;
        };
        Some(Self::instantiate(name, factory, reuse_instance, slot))
    }

    fn instantiate(
        name: &str,
        factory: &HookFactory,
        reuse_instance: bool,
        slot: &mut HookSlot,
    ) -> Arc<dyn PreprocessHook> {
        if !reuse_instance {
            debug!(name, "creating hook");
            return factory();
        }

        let source = HookSource::Named(name.to_string());
        if let Some(hook) = slot.hook_from(&source) {
            debug!(name, "reusing hook");
            return hook;
        }

        debug!(name, "creating reusable hook");
        let hook = factory();
        slot.store(source, Arc::clone(&hook));
        hook
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter {
        created: AtomicUsize,
    }

    struct Noop;

    impl PreprocessHook for Noop {
        fn preprocess(&self, _call: &mut RestCall) {}
    }

    fn counting_factory(counter: &Arc<Counter>) -> HookFactory {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.created.fetch_add(1, Ordering::SeqCst);
            Arc::new(Noop) as Arc<dyn PreprocessHook>
        })
    }

    fn resolve(
        declared: Option<&HookDeclaration>,
        configured: Option<(&str, bool)>,
        registry: &HookRegistry,
        slot: &mut HookSlot,
    ) -> Option<Arc<dyn PreprocessHook>> {
        HookCandidates {
            assigned: None,
            declared,
            configured,
            registry,
        }
        .resolve(slot)
    }

    #[test]
    fn test_no_source_no_hook() {
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();

        assert!(resolve(None, None, &registry, &mut slot).is_none());
    }

    #[test]
    fn test_declared_without_reuse_creates_each_time() {
        let counter = Arc::new(Counter::default());
        let declaration = HookDeclaration::new("token", counting_factory(&counter), false);
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();

        let first = resolve(Some(&declaration), None, &registry, &mut slot);
        let second = resolve(Some(&declaration), None, &registry, &mut slot);

        assert!(first.is_some() && second.is_some());
        assert_eq!(counter.created.load(Ordering::SeqCst), 2);
        assert!(!slot.is_set());
    }

    #[test]
    fn test_declared_with_reuse_creates_once() {
        let counter = Arc::new(Counter::default());
        let declaration = HookDeclaration::new("token", counting_factory(&counter), true);
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();

        let first = resolve(Some(&declaration), None, &registry, &mut slot);
        let second = resolve(Some(&declaration), None, &registry, &mut slot);

        let (Some(first), Some(second)) = (first, second) else {
            panic!("a hook should be resolved");
        };
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_declaration_replaces_reused_hook() {
        let counter = Arc::new(Counter::default());
        let token = HookDeclaration::new("token", counting_factory(&counter), true);
        let other = HookDeclaration::new("other", counting_factory(&counter), true);
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();

        resolve(Some(&token), None, &registry, &mut slot);
        resolve(Some(&other), None, &registry, &mut slot);

        assert_eq!(counter.created.load(Ordering::SeqCst), 2);
        assert_eq!(slot.source(), Some(&HookSource::Named("other".to_string())));
    }

    #[test]
    fn test_reused_hook_wins_over_configured_one() {
        let counter = Arc::new(Counter::default());
        let declaration = HookDeclaration::new("token", counting_factory(&counter), true);
        let mut registry = HookRegistry::new();
        registry.register("configured", counting_factory(&counter));
        let mut slot = HookSlot::default();

        let declared = resolve(Some(&declaration), None, &registry, &mut slot);
        let later = resolve(None, Some(("configured", false)), &registry, &mut slot);

        let (Some(declared), Some(later)) = (declared, later) else {
            panic!("a hook should be resolved");
        };
        assert!(Arc::ptr_eq(&declared, &later));
        assert_eq!(counter.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_configured_hook_from_registry() {
        let counter = Arc::new(Counter::default());
        let mut registry = HookRegistry::new();
        registry.register("configured", counting_factory(&counter));
        let mut slot = HookSlot::default();

        let hook = resolve(None, Some(("configured", true)), &registry, &mut slot);

        assert!(hook.is_some());
        assert!(slot.is_set());
        assert_eq!(counter.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_configured_name_is_no_hook() {
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();

        let hook = resolve(None, Some(("com.example.Missing", true)), &registry, &mut slot);

        assert!(hook.is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn test_assigned_hook_with_reuse_replaces_slot() {
        let counter = Arc::new(Counter::default());
        let declaration = HookDeclaration::new("token", counting_factory(&counter), true);
        let registry = HookRegistry::new();
        let mut slot = HookSlot::default();
        resolve(Some(&declaration), None, &registry, &mut slot);

        let assigned = AssignedHook {
            hook: Arc::new(Noop),
            reuse_instance: true,
        };
        let hook = HookCandidates {
            assigned: Some(&assigned),
            declared: Some(&declaration),
            configured: None,
            registry: &registry,
        }
        .resolve(&mut slot);

        let Some(hook) = hook else {
            panic!("a hook should be resolved");
        };
        assert!(Arc::ptr_eq(&hook, &assigned.hook));
        assert_eq!(slot.source(), Some(&HookSource::Assigned));
    }

    #[test]
    fn test_registry_debug_lists_names() {
        let mut registry = HookRegistry::new();
        registry.register("a", hook_factory(|| Noop));
        registry.register("b", hook_factory(|| Noop));

        assert_eq!(format!("{registry:?}"), r#"["a", "b"]"#);
        assert!(registry.contains("a"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
