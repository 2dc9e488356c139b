//! Local State
//!
//! The state repository, the per-invocation hook context handed to every
//! component, and state setters that re-enter the render loop.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Weak;

use crate::component::ComponentId;
use crate::element::Element;
use crate::events::{Event, EventHandler, Propagation};
use crate::path::NodePath;

/// State slot address: invocation path, component, hook order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub path: NodePath,
    pub component: ComponentId,
    pub slot: usize,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}:{}", self.path, self.component.get(), self.slot)
    }
}

/// State errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Hooks are only available to components rendered by a stateful renderer")]
    HookUnavailable,

    #[error("State slot {0} holds a value of another type")]
    TypeMismatch(String),

    #[error("State slot {0} was never seeded")]
    Missing(String),

    #[error("State cannot change while a render pass is building")]
    RenderInProgress,

    #[error("The renderer owning this state was dropped")]
    HostDropped,

    #[error("Re-render after state change failed")]
    Rerender(#[source] anyhow::Error),
}

/// Path-keyed state values plus the force re-evaluation flag
///
/// Entries are seeded lazily and never purged when a component stops
/// rendering at a path.
#[derive(Default)]
pub struct StateRepository {
    slots: HashMap<StateKey, Box<dyn Any>>,
    skip_property_check: bool,
}

impl StateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value at `key`, seeding it first if absent
    pub fn get_or_seed<T: Clone + 'static>(
        &mut self,
        key: &StateKey,
        seed: impl FnOnce() -> T,
    ) -> Result<T, StateError> {
        let slot = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Box::new(seed()));
        slot.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| StateError::TypeMismatch(key.to_string()))
    }

    /// Current value at `key`
    pub fn get<T: Clone + 'static>(&self, key: &StateKey) -> Result<Option<T>, StateError> {
        match self.slots.get(key) {
            None => Ok(None),
            Some(slot) => slot
                .downcast_ref::<T>()
                .cloned()
                .map(Some)
                .ok_or_else(|| StateError::TypeMismatch(key.to_string())),
        }
    }

    /// Store `next(current)` if it differs from the current value.
    /// Returns whether the value changed.
    pub fn replace_with<T: PartialEq + 'static>(
        &mut self,
        key: &StateKey,
        next: impl FnOnce(&T) -> T,
    ) -> Result<bool, StateError> {
        let slot = self
            .slots
            .get_mut(key)
            .ok_or_else(|| StateError::Missing(key.to_string()))?;
        let current = slot
            .downcast_mut::<T>()
            .ok_or_else(|| StateError::TypeMismatch(key.to_string()))?;

        let value = next(current);
        if value == *current {
            return Ok(false);
        }
        *current = value;
        Ok(true)
    }

    /// Force the next pass to re-execute every component
    pub fn set_skip_property_check(&mut self, skip: bool) {
        self.skip_property_check = skip;
    }

    pub fn skip_property_check(&self) -> bool {
        self.skip_property_check
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for StateRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRepository")
            .field("slots", &self.slots.len())
            .field("skip_property_check", &self.skip_property_check)
            .finish()
    }
}

/// Owner of a state repository that can re-render on change
pub trait StateHost {
    /// Run `update` against the repository. Fails with `RenderInProgress`
    /// while a pass is building.
    fn update_states(
        &self,
        update: &mut dyn FnMut(&mut StateRepository) -> Result<bool, StateError>,
    ) -> Result<bool, StateError>;

    /// Re-render from the last root element with property checks skipped
    fn rerender_forced(&self) -> Result<(), StateError>;
}

/// State setter returned by [`Hooks::use_state`]
pub struct SetState<T> {
    key: StateKey,
    host: Weak<dyn StateHost>,
    _value: PhantomData<fn(T)>,
}

impl<T: PartialEq + 'static> SetState<T> {
    fn new(key: StateKey, host: Weak<dyn StateHost>) -> Self {
        Self {
            key,
            host,
            _value: PhantomData,
        }
    }

    /// Store `next` and re-render if it differs from the current value
    pub fn set(&self, next: T) -> Result<bool, StateError> {
        self.update(move |_| next)
    }

    /// Store `f(current)` and re-render if it differs from the current value
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<bool, StateError> {
        let host = self.host.upgrade().ok_or(StateError::HostDropped)?;

        let mut f = Some(f);
        let changed = host.update_states(&mut |states| match f.take() {
            Some(f) => states.replace_with(&self.key, f),
            None => Ok(false),
        })?;

        if changed {
            tracing::debug!("State {} changed, re-rendering", self.key);
            host.rerender_forced()?;
        }
        Ok(changed)
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            host: self.host.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetState").field(&self.key.to_string()).finish()
    }
}

/// Per-invocation component context
///
/// Carries the invocation path explicitly, along with the element children
/// and, under a stateful renderer, access to local state.
pub struct Hooks<'a> {
    path: &'a NodePath,
    component: ComponentId,
    children: &'a [Element],
    slot: usize,
    states: Option<&'a mut StateRepository>,
    host: Option<Weak<dyn StateHost>>,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        path: &'a NodePath,
        component: ComponentId,
        children: &'a [Element],
        states: Option<&'a mut StateRepository>,
        host: Option<Weak<dyn StateHost>>,
    ) -> Self {
        Self {
            path,
            component,
            children,
            slot: 0,
            states,
            host,
        }
    }

    /// Invocation path of the running component
    pub fn path(&self) -> &NodePath {
        self.path
    }

    /// Children given to the component element
    pub fn children(&self) -> &[Element] {
        self.children
    }

    /// Local state, seeded with `initial` on the first call at this slot
    pub fn use_state<T: Clone + PartialEq + 'static>(
        &mut self,
        initial: T,
    ) -> Result<(T, SetState<T>), StateError> {
        let key = self.next_key();
        let states = self.states.as_deref_mut().ok_or(StateError::HookUnavailable)?;
        let host = self.host.clone().ok_or(StateError::HookUnavailable)?;

        let value = states.get_or_seed(&key, || initial)?;
        Ok((value, SetState::new(key, host)))
    }

    /// Event handler created once per slot and reused on later passes
    pub fn use_handler(
        &mut self,
        f: impl Fn(&Event, &mut Propagation) -> anyhow::Result<()> + 'static,
    ) -> Result<EventHandler, StateError> {
        let key = self.next_key();
        let states = self.states.as_deref_mut().ok_or(StateError::HookUnavailable)?;
        states.get_or_seed(&key, || EventHandler::new(f))
    }

    fn next_key(&mut self) -> StateKey {
        let key = StateKey {
            path: self.path.clone(),
            component: self.component,
            slot: self.slot,
        };
        self.slot += 1;
        key
    }
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("path", &self.path.to_string())
            .field("component", &self.component)
            .field("slot", &self.slot)
            .field("stateful", &self.states.is_some())
            .finish()
    }
}
