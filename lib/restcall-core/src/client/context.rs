//! Execution contexts: the logical sessions calls are chained into.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::HttpMethod;
use super::preprocess::PreprocessHook;

/// Identifier of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of an executed call, kept as the previous call of its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Position of the call in its chain, starting at `1`.
    pub sequence: u64,
    /// The action name of the call.
    pub action_name: String,
    /// The HTTP method.
    pub method: HttpMethod,
    /// The composed URL.
    pub url: String,
    /// The response status code.
    pub status_code: u16,
}

/// Where a reused hook instance comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookSource {
    /// Assigned on a call.
    Assigned,
    /// Declared by a descriptor or configured under this name.
    Named(String),
}

/// Holds the hook instance reused across the calls of a context.
#[derive(Clone, Default)]
pub(in crate::client) struct HookSlot {
    reused: Option<(HookSource, Arc<dyn PreprocessHook>)>,
}

impl HookSlot {
    pub(in crate::client) fn store(&mut self, source: HookSource, hook: Arc<dyn PreprocessHook>) {
        self.reused = Some((source, hook));
    }

    pub(in crate::client) fn hook(&self) -> Option<Arc<dyn PreprocessHook>> {
        self.reused.as_ref().map(|(_, hook)| Arc::clone(hook))
    }

    pub(in crate::client) fn hook_from(
        &self,
        source: &HookSource,
    ) -> Option<Arc<dyn PreprocessHook>> {
        self.reused
            .as_ref()
            .filter(|(current, _)| current == source)
            .map(|(_, hook)| Arc::clone(hook))
    }

    pub(in crate::client) fn source(&self) -> Option<&HookSource> {
        self.reused.as_ref().map(|(source, _)| source)
    }

    pub(in crate::client) fn is_set(&self) -> bool {
        self.reused.is_some()
    }

    pub(in crate::client) fn clear(&mut self) {
        self.reused = None;
    }
}

impl fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSlot")
            .field("source", &self.source())
            .finish()
    }
}

/// A logical session, e.g. one simulated user.
///
/// The context chains calls (each execution becomes the previous call of the next one)
/// and retains the reused preprocess hook instance. It is owned by the caller and
/// passed to every execution, so concurrent sessions never share state.
///
/// ```rust
/// use restcall_core::ExecutionContext;
///
/// let mut ctx = ExecutionContext::new();
/// assert!(ctx.previous_call().is_none());
///
/// // start a new chain
/// ctx.set_previous_call(None);
/// assert_eq!(ctx.sequence(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    id: SessionId,
    previous_call: Option<CallRecord>,
    sequence: u64,
    hook_slot: HookSlot,
}

impl ExecutionContext {
    /// Creates a context with a random identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the given identifier.
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// The context identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The last call executed in this context.
    pub fn previous_call(&self) -> Option<&CallRecord> {
        self.previous_call.as_ref()
    }

    /// Replaces the previous call.
    ///
    /// `None` starts a new chain: the next call has sequence `1`.
    pub fn set_previous_call(&mut self, record: Option<CallRecord>) {
        self.sequence = record.as_ref().map_or(0, |it| it.sequence);
        self.previous_call = record;
    }

    /// Number of calls in the current chain.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns `true` if a hook instance is retained.
    pub fn has_reused_hook(&self) -> bool {
        self.hook_slot.is_set()
    }

    /// Source of the retained hook instance.
    pub fn reused_hook_source(&self) -> Option<&HookSource> {
        self.hook_slot.source()
    }

    /// Drops the retained hook instance, the next reusing call creates a new one.
    pub fn clear_reused_hook(&mut self) {
        self.hook_slot.clear();
    }

    /// Starts over: no previous call and no retained hook.
    pub fn reset(&mut self) {
        debug!(session = %self.id, "resetting execution context");
        self.set_previous_call(None);
        self.clear_reused_hook();
    }

    pub(in crate::client) fn hook_slot_mut(&mut self) -> &mut HookSlot {
        &mut self.hook_slot
    }

    /// Chains an executed call, returns the stored record.
    pub(in crate::client) fn record_call(
        &mut self,
        action_name: String,
        method: HttpMethod,
        url: String,
        status_code: u16,
    ) -> &CallRecord {
        self.sequence += 1;
        self.previous_call.insert(CallRecord {
            sequence: self.sequence,
            action_name,
            method,
            url,
            status_code,
        })
    }
}

/// Concurrent map of execution contexts keyed by session.
///
/// Each session is locked while it is in use, sessions never observe each other.
/// The closure given to [`with_session`](Self::with_session) must not access the
/// registry again.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, ExecutionContext>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with the context of a session, creating the context if needed.
    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut ExecutionContext) -> R) -> R {
        let mut ctx = self
            .sessions
            .entry(id)
            .or_insert_with(|| ExecutionContext::with_id(id));
        f(ctx.value_mut())
    }

    /// The previous call of a session.
    pub fn previous_call(&self, id: SessionId) -> Option<CallRecord> {
        self.sessions
            .get(&id)
            .and_then(|ctx| ctx.previous_call().cloned())
    }

    /// Removes a session, returning its context.
    pub fn end_session(&self, id: SessionId) -> Option<ExecutionContext> {
        debug!(session = %id, "ending session");
        self.sessions.remove(&id).map(|(_, ctx)| ctx)
    }

    /// Returns `true` if the session exists.
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there is no session.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
