//! Post-call validators contributed by resource descriptors.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::RestCall;
use super::descriptor::{DescriptorId, ResourceDescriptor};
use super::error::RestCallError;

/// A validator rejected the response of a call.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Asserts properties of an executed call.
///
/// The call is received read-only: the resolved request (action name, URL parts,
/// method, headers, placeholders, body) and the response accessors are available.
///
/// Functions and closures with the matching signature are validators:
///
/// ```rust
/// use restcall_core::{ResourceDescriptor, RestCall, ValidationError};
///
/// fn is_ok(call: &RestCall) -> Result<(), ValidationError> {
///     let status = call
///         .response_status_code()
///         .map_err(|err| ValidationError::new(err.to_string()))?;
///     if status == 200 {
///         Ok(())
///     } else {
///         Err(ValidationError::new(format!("unexpected status {status}")))
///     }
/// }
///
/// let descriptor = ResourceDescriptor::new("posts").with_validator(is_ok);
/// # let _ = descriptor;
/// ```
pub trait Validator: Send + Sync {
    /// Validates the executed call.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the call does not satisfy the validator.
    fn validate(&self, call: &RestCall) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&RestCall) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, call: &RestCall) -> Result<(), ValidationError> {
        self(call)
    }
}

/// A validator registered by a descriptor, with its activation state.
#[derive(Clone)]
struct ValidatorEntry {
    descriptor: DescriptorId,
    validator: Arc<dyn Validator>,
    marker_disabled: bool,
    explicit: Option<bool>,
}

impl ValidatorEntry {
    fn is_active(&self, globally_enabled: bool) -> bool {
        self.explicit
            .unwrap_or(globally_enabled && !self.marker_disabled)
    }
}

impl fmt::Debug for ValidatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorEntry")
            .field("descriptor", &self.descriptor)
            .field("marker_disabled", &self.marker_disabled)
            .field("explicit", &self.explicit)
            .finish_non_exhaustive()
    }
}

/// Ordered list of validators with their enable/disable state.
///
/// Whether a validator runs is decided per entry, first match wins:
/// 1. an explicit per-descriptor enable/disable,
/// 2. the descriptor "disable default validation" marker,
/// 3. the global flag.
///
/// So an explicit enable of one descriptor runs its validator even when the global
/// flag is off, without affecting any other entry.
#[derive(Debug, Clone)]
pub struct ValidationDispatcher {
    enabled: bool,
    entries: Vec<ValidatorEntry>,
}

impl Default for ValidationDispatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ValidationDispatcher {
    /// Creates an empty dispatcher with the given global flag.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: vec![],
        }
    }

    /// The global flag.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Changes the global flag. Explicit per-descriptor settings are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Registers the validator of a descriptor, if it has one.
    ///
    /// A descriptor is registered at most once, registering it again keeps the existing
    /// entry and its position.
    pub fn register(&mut self, descriptor: &ResourceDescriptor) {
        self.register_entry(descriptor, None);
    }

    /// Registers the validator of a descriptor with an explicit enable/disable.
    ///
    /// When the descriptor is already registered only its explicit setting is updated.
    pub fn register_with(&mut self, descriptor: &ResourceDescriptor, enabled: bool) {
        self.register_entry(descriptor, Some(enabled));
    }

    fn register_entry(&mut self, descriptor: &ResourceDescriptor, explicit: Option<bool>) {
        if let Some(entry) = self.find_mut(descriptor.id()) {
            if explicit.is_some() {
                entry.explicit = explicit;
            }
            return;
        }

        let Some(validator) = descriptor.validator() else {
            trace!(descriptor = %descriptor.id(), "descriptor without validator");
            return;
        };
        self.entries.push(ValidatorEntry {
            descriptor: descriptor.id().clone(),
            validator: Arc::clone(validator),
            marker_disabled: descriptor.disable_default_validation(),
            explicit,
        });
    }

    /// Explicitly enables or disables the validator of a registered descriptor.
    ///
    /// Returns `false` if no validator is registered for this descriptor.
    pub fn set_enabled_for(&mut self, descriptor: &DescriptorId, enabled: bool) -> bool {
        let Some(entry) = self.find_mut(descriptor) else {
            return false;
        };
        entry.explicit = Some(enabled);
        true
    }

    /// Removes the first validator registered for this descriptor.
    ///
    /// Returns `false` if there was none.
    pub fn remove(&mut self, descriptor: &DescriptorId) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| &entry.descriptor == descriptor)
        else {
            return false;
        };
        self.entries.remove(index);
        true
    }

    /// Removes every validator.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns whether the validator of this descriptor would run, `None` if the
    /// descriptor has no registered validator.
    pub fn is_active(&self, descriptor: &DescriptorId) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| &entry.descriptor == descriptor)
            .map(|entry| entry.is_active(self.enabled))
    }

    /// Descriptors with a registered validator, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorId> {
        self.entries.iter().map(|entry| &entry.descriptor)
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no validator is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the active validators in registration order, stopping at the first failure.
    pub(in crate::client) fn run(&self, call: &RestCall) -> Result<(), RestCallError> {
        for entry in &self.entries {
            if !entry.is_active(self.enabled) {
                trace!(descriptor = %entry.descriptor, "validator skipped");
                continue;
            }
            debug!(descriptor = %entry.descriptor, "running validator");
            entry
                .validator
                .validate(call)
                .map_err(|error| RestCallError::Validation {
                    validator: entry.descriptor.to_string(),
                    error,
                })?;
        }
        Ok(())
    }

    fn find_mut(&mut self, descriptor: &DescriptorId) -> Option<&mut ValidatorEntry> {
        self.entries
            .iter_mut()
            .find(|entry| &entry.descriptor == descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_ok(_: &RestCall) -> Result<(), ValidationError> {
        Ok(())
    }

    fn descriptor(name: &str, disabled: bool) -> ResourceDescriptor {
        ResourceDescriptor::new(name)
            .with_validator(always_ok)
            .with_disable_default_validation(disabled)
    }

    #[test]
    fn test_enabled_by_default() {
        let mut dispatcher = ValidationDispatcher::default();
        let posts = descriptor("posts", false);

        dispatcher.register(&posts);

        assert_eq!(dispatcher.is_active(posts.id()), Some(true));
    }

    #[test]
    fn test_marker_disables_only_its_descriptor() {
        let mut dispatcher = ValidationDispatcher::default();
        let posts = descriptor("posts", true);
        let users = descriptor("users", false);

        dispatcher.register(&posts);
        dispatcher.register(&users);

        assert!(dispatcher.is_enabled());
        assert_eq!(dispatcher.is_active(posts.id()), Some(false));
        assert_eq!(dispatcher.is_active(users.id()), Some(true));
    }

    #[test]
    fn test_explicit_enable_overrides_marker() {
        let mut dispatcher = ValidationDispatcher::default();
        let posts = descriptor("posts", true);
        let users = descriptor("users", true);
        dispatcher.register(&posts);
        dispatcher.register(&users);

        let found = dispatcher.set_enabled_for(posts.id(), true);

        assert!(found);
        assert_eq!(dispatcher.is_active(posts.id()), Some(true));
        assert_eq!(dispatcher.is_active(users.id()), Some(false));
    }

    #[test]
    fn test_explicit_enable_overrides_global_flag() {
        let mut dispatcher = ValidationDispatcher::new(false);
        let posts = descriptor("posts", false);
        let users = descriptor("users", false);

        dispatcher.register_with(&posts, true);
        dispatcher.register(&users);

        assert_eq!(dispatcher.is_active(posts.id()), Some(true));
        assert_eq!(dispatcher.is_active(users.id()), Some(false));
    }

    #[test]
    fn test_explicit_disable_overrides_global_flag() {
        let mut dispatcher = ValidationDispatcher::default();
        let posts = descriptor("posts", false);

        dispatcher.register_with(&posts, false);

        assert_eq!(dispatcher.is_active(posts.id()), Some(false));
    }

    #[test]
    fn test_register_twice_keeps_single_entry() {
        let mut dispatcher = ValidationDispatcher::default();
        let posts = descriptor("posts", false);

        dispatcher.register(&posts);
        dispatcher.register(&posts);
        dispatcher.register_with(&posts, false);

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(dispatcher.is_active(posts.id()), Some(false));
    }

    #[test]
    fn test_descriptor_without_validator_is_not_registered() {
        let mut dispatcher = ValidationDispatcher::default();
        let plain = ResourceDescriptor::new("plain");

        dispatcher.register(&plain);

        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.is_active(plain.id()), None);
        assert!(!dispatcher.set_enabled_for(plain.id(), true));
    }

    #[test]
    fn test_remove_keeps_order_of_others() {
        let mut dispatcher = ValidationDispatcher::default();
        for name in ["a", "b", "c"] {
            dispatcher.register(&descriptor(name, false));
        }

        assert!(dispatcher.remove(&DescriptorId::from("b")));
        assert!(!dispatcher.remove(&DescriptorId::from("b")));

        let remaining = dispatcher.descriptors().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(remaining, vec!["a", "c"]);
    }
}
