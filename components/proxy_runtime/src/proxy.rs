//! Proxy objects
//!
//! A proxy forwards its structural operations to a [`ProxyHandler`]. When
//! the handler lacks a trap, the operation falls back to the proxy's default
//! storage, an ordinary object that also carries the prototype link and
//! hidden values. Locking a proxy (`freeze`, `seal`, `prevent_extensions`)
//! replaces its storage with the handler's `fix` result and releases the
//! handler for good.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::descriptor::{DescriptorMap, PropertyDescriptor};
use crate::handler::ProxyHandler;
use crate::object::JsObject;
use crate::observer::{TrapEvent, TrapObserver};
use crate::reflect;
use crate::value::JsValue;
use core_types::{JsError, JsResult, Trap};

/// Integrity level of a proxy. Levels are ordered, so locking to a lower
/// level than the current one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LockState {
    /// Extensible
    Open,
    /// No new properties
    NonExtensible,
    /// No new properties, nothing configurable
    Sealed,
    /// Sealed and data properties read-only
    Frozen,
}

/// Call and construct traps of a callable proxy
#[derive(Debug, Clone)]
pub(crate) struct Invocation {
    pub(crate) call: JsValue,
    pub(crate) construct: Option<JsValue>,
}

struct ProxyData {
    /// `None` once the proxy has stopped trapping
    handler: RefCell<Option<Rc<dyn ProxyHandler>>>,
    storage: JsObject,
    lock: Cell<LockState>,
    invocation: Option<Invocation>,
    observers: RefCell<Vec<Rc<dyn TrapObserver>>>,
}

/// Proxy object
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use core_types::Trap;
/// use proxy_runtime::{HandlerMap, JsValue, ProxyObject};
///
/// let handler = HandlerMap::new().on(Trap::Get, |_, args| {
///     Ok(JsValue::string(format!("<{}>", args[1].to_js_string())))
/// });
/// let proxy = ProxyObject::new(Rc::new(handler), None);
/// assert_eq!(proxy.get("name").unwrap(), JsValue::string("<name>"));
/// ```
#[derive(Clone)]
pub struct ProxyObject {
    data: Rc<ProxyData>,
}

impl ProxyObject {
    /// Create a trapping proxy over `handler`
    pub fn new(handler: Rc<dyn ProxyHandler>, prototype: Option<JsValue>) -> Self {
        ProxyObject::build(Some(handler), JsObject::with_prototype(prototype), None, Vec::new())
    }

    pub(crate) fn with_invocation(
        handler: Rc<dyn ProxyHandler>,
        prototype: Option<JsValue>,
        invocation: Invocation,
    ) -> Self {
        ProxyObject::build(
            Some(handler),
            JsObject::with_prototype(prototype),
            Some(invocation),
            Vec::new(),
        )
    }

    fn build(
        handler: Option<Rc<dyn ProxyHandler>>,
        storage: JsObject,
        invocation: Option<Invocation>,
        observers: Vec<Rc<dyn TrapObserver>>,
    ) -> Self {
        let lock = if storage.is_extensible() {
            LockState::Open
        } else if storage.is_frozen() {
            LockState::Frozen
        } else if storage.is_sealed() {
            LockState::Sealed
        } else {
            LockState::NonExtensible
        };
        ProxyObject {
            data: Rc::new(ProxyData {
                handler: RefCell::new(handler),
                storage,
                lock: Cell::new(lock),
                invocation,
                observers: RefCell::new(observers),
            }),
        }
    }

    /// Plain proxy allocated by construction: shares the handler and
    /// observers, has its own storage
    pub(crate) fn spawn_instance(&self, prototype: Option<JsValue>) -> ProxyObject {
        ProxyObject::build(
            self.data.handler.borrow().clone(),
            JsObject::with_prototype(prototype),
            None,
            self.data.observers.borrow().clone(),
        )
    }

    /// New proxy sharing the handler and prototype, with a copy of the
    /// default storage
    pub fn shallow_clone(&self) -> ProxyObject {
        ProxyObject::build(
            self.data.handler.borrow().clone(),
            self.data.storage.shallow_clone(),
            self.data.invocation.clone(),
            Vec::new(),
        )
    }

    pub(crate) fn invocation(&self) -> Option<&Invocation> {
        self.data.invocation.as_ref()
    }

    /// The proxy as a value
    pub fn to_value(&self) -> JsValue {
        JsValue::Proxy(self.clone())
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ProxyObject) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Whether the proxy has call/construct traps
    pub fn is_callable(&self) -> bool {
        self.data.invocation.is_some()
    }

    /// Attach an observer that sees every trap invocation
    pub fn observe<O: TrapObserver + 'static>(&self, observer: O) {
        self.data.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Run `call` against the handler if the proxy is trapping.
    ///
    /// Returns `None` when the proxy no longer traps or the handler lacks
    /// the trap. Observers are notified only when a trap actually ran.
    fn dispatch<T>(
        &self,
        trap: Trap,
        name: Option<&str>,
        call: impl FnOnce(&dyn ProxyHandler) -> Option<JsResult<T>>,
    ) -> Option<JsResult<T>> {
        // Clone the handler out so traps may re-enter this proxy.
        let handler = self.data.handler.borrow().clone()?;
        let result = call(handler.as_ref())?;
        tracing::trace!(
            trap = %trap,
            name = name.unwrap_or_default(),
            ok = result.is_ok(),
            "proxy trap"
        );
        self.notify(&TrapEvent::new(trap, name));
        Some(result)
    }

    pub(crate) fn notify(&self, event: &TrapEvent) {
        let observers = self.data.observers.borrow().clone();
        for observer in observers {
            observer.on_trap(event);
        }
    }

    /// [[GetOwnProperty]] internal method
    pub fn get_own_property_descriptor(&self, name: &str) -> JsResult<Option<PropertyDescriptor>> {
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::GetOwnPropertyDescriptor, Some(name), |h| {
            h.get_own_property_descriptor(&receiver, name)
        }) {
            return result;
        }
        Ok(self.data.storage.get_own_property(name))
    }

    /// Descriptor for `name` found on the proxy or its prototype chain
    pub fn get_property_descriptor(&self, name: &str) -> JsResult<Option<PropertyDescriptor>> {
        Ok(self.locate_descriptor(name)?.map(|(desc, _)| desc))
    }

    /// Descriptor for `name` and whether it belongs to the proxy itself.
    /// A `getPropertyDescriptor` trap result counts as own.
    fn locate_descriptor(&self, name: &str) -> JsResult<Option<(PropertyDescriptor, bool)>> {
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::GetPropertyDescriptor, Some(name), |h| {
            h.get_property_descriptor(&receiver, name)
        }) {
            return Ok(result?.map(|desc| (desc, true)));
        }
        if let Some(desc) = self.get_own_property_descriptor(name)? {
            return Ok(Some((desc, true)));
        }
        let inherited = match self.prototype() {
            Some(proto) => reflect::get_property_descriptor(&proto, name)?,
            None => None,
        };
        Ok(inherited.map(|desc| (desc, false)))
    }

    /// [[OwnPropertyKeys]] internal method
    pub fn get_own_property_names(&self) -> JsResult<Vec<String>> {
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::GetOwnPropertyNames, None, |h| {
            h.get_own_property_names(&receiver)
        }) {
            return result;
        }
        Ok(self.data.storage.own_property_names())
    }

    /// [[DefineOwnProperty]] internal method
    pub fn define_property(&self, name: &str, desc: PropertyDescriptor) -> JsResult<bool> {
        desc.validate()?;
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::DefineProperty, Some(name), |h| {
            h.define_property(&receiver, name, &desc)
        }) {
            return result;
        }
        self.data.storage.define_own_property(name, desc)
    }

    /// Define each entry in order. The first failure aborts the batch.
    pub fn define_properties(&self, descriptors: DescriptorMap) -> JsResult<()> {
        for (name, desc) in descriptors {
            self.define_property(&name, desc)?;
        }
        Ok(())
    }

    /// [[Delete]] internal method
    pub fn delete(&self, name: &str) -> JsResult<bool> {
        let receiver = self.to_value();
        if let Some(result) =
            self.dispatch(Trap::Delete, Some(name), |h| h.delete(&receiver, name))
        {
            return result;
        }
        // A locked proxy refuses to delete names it does not have.
        let storage = &self.data.storage;
        if !self.is_trapping() && !storage.is_extensible() && !storage.has_own_property(name) {
            return Ok(false);
        }
        Ok(storage.delete_own_property(name))
    }

    /// [[HasProperty]] internal method
    pub fn has(&self, name: &str) -> JsResult<bool> {
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::Has, Some(name), |h| h.has(&receiver, name)) {
            return result;
        }
        if self.has_own(name)? {
            return Ok(true);
        }
        match self.prototype() {
            Some(proto) => reflect::has(&proto, name),
            None => Ok(false),
        }
    }

    /// Own property existence
    pub fn has_own(&self, name: &str) -> JsResult<bool> {
        let receiver = self.to_value();
        if let Some(result) =
            self.dispatch(Trap::HasOwn, Some(name), |h| h.has_own(&receiver, name))
        {
            return result;
        }
        Ok(self.get_own_property_descriptor(name)?.is_some())
    }

    /// [[Get]] with the proxy itself as receiver
    pub fn get(&self, name: &str) -> JsResult<JsValue> {
        self.get_with_receiver(&self.to_value(), name)
    }

    /// [[Get]] internal method
    pub fn get_with_receiver(&self, receiver: &JsValue, name: &str) -> JsResult<JsValue> {
        if let Some(result) = self.dispatch(Trap::Get, Some(name), |h| h.get(receiver, name)) {
            return result;
        }
        match self.get_property_descriptor(name)? {
            Some(desc) if desc.is_accessor_descriptor() => match desc.get {
                Some(getter) => reflect::call(&getter, receiver, &[]),
                None => Ok(JsValue::Undefined),
            },
            Some(desc) => Ok(desc.value.unwrap_or_default()),
            None => Ok(JsValue::Undefined),
        }
    }

    /// [[Set]] with the proxy itself as receiver
    pub fn set(&self, name: &str, value: JsValue) -> JsResult<bool> {
        self.set_with_receiver(&self.to_value(), name, value)
    }

    /// [[Set]] internal method
    ///
    /// Without a `set` trap the write is resolved through
    /// [`get_property_descriptor`](Self::get_property_descriptor). A refused
    /// write returns `Ok(false)`.
    pub fn set_with_receiver(
        &self,
        receiver: &JsValue,
        name: &str,
        value: JsValue,
    ) -> JsResult<bool> {
        if let Some(result) =
            self.dispatch(Trap::Set, Some(name), |h| h.set(receiver, name, &value))
        {
            return result;
        }

        let (desc, own) = match self.locate_descriptor(name)? {
            None => return self.define_on_receiver(receiver, name, PropertyDescriptor::data(value)),
            Some(found) => found,
        };

        if desc.is_accessor_descriptor() {
            return match desc.set {
                Some(setter) => {
                    reflect::call(&setter, receiver, &[value])?;
                    Ok(true)
                }
                None => Ok(false),
            };
        }

        // While trapping, non-configurable data is read-only as well.
        if !desc.writable || (own && !desc.configurable && self.is_trapping()) {
            return Ok(false);
        }
        // Only the proxy's own property keeps its attributes; anything else
        // becomes a fresh data property on the receiver.
        let updated = if own && self.is_receiver(receiver) {
            PropertyDescriptor {
                value: Some(value),
                ..desc
            }
        } else {
            PropertyDescriptor::data(value)
        };
        self.define_on_receiver(receiver, name, updated)
    }

    fn is_receiver(&self, receiver: &JsValue) -> bool {
        matches!(receiver, JsValue::Proxy(proxy) if proxy.ptr_eq(self))
    }

    fn define_on_receiver(
        &self,
        receiver: &JsValue,
        name: &str,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        match receiver {
            _ if self.is_receiver(receiver) => {
                if self.is_trapping() {
                    self.define_property(name, desc)
                } else {
                    Ok(self.data.storage.put(name, desc.value.unwrap_or_default()))
                }
            }
            other if other.is_object_like() => {
                if !reflect::is_extensible(other)? {
                    return Ok(false);
                }
                reflect::define_own_property(other, name, desc)
            }
            _ => Ok(false),
        }
    }

    /// Names visited by `for..in`
    pub fn enumerate(&self) -> JsResult<Vec<String>> {
        let receiver = self.to_value();
        if let Some(result) =
            self.dispatch(Trap::Enumerate, None, |h| h.enumerate(&receiver))
        {
            return result;
        }
        let mut names: IndexSet<String> = self.enumerable_own_names()?.into_iter().collect();
        if let Some(proto) = self.prototype() {
            names.extend(reflect::for_in(&proto)?);
        }
        Ok(names.into_iter().collect())
    }

    /// Own enumerable names, as `Object.keys` reports them
    pub fn keys(&self) -> JsResult<Vec<String>> {
        let receiver = self.to_value();
        if let Some(result) = self.dispatch(Trap::Keys, None, |h| h.keys(&receiver)) {
            return result;
        }
        self.enumerable_own_names()
    }

    fn enumerable_own_names(&self) -> JsResult<Vec<String>> {
        let mut names = Vec::new();
        for name in self.get_own_property_names()? {
            if let Some(desc) = self.get_own_property_descriptor(&name)? {
                if desc.enumerable {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// The prototype link
    pub fn prototype(&self) -> Option<JsValue> {
        self.data.storage.prototype()
    }

    /// Replace the prototype link. Cycle checks belong to the caller.
    pub fn set_prototype(&self, prototype: Option<JsValue>) {
        self.data.storage.replace_prototype(prototype);
    }

    /// Hidden value stored under `name`
    pub fn hidden(&self, name: &str) -> Option<JsValue> {
        self.data.storage.hidden(name)
    }

    /// Store a hidden value
    pub fn set_hidden(&self, name: &str, value: JsValue) {
        self.data.storage.set_hidden(name, value);
    }

    /// Forbid new properties
    pub fn prevent_extensions(&self) -> JsResult<bool> {
        self.lock(LockState::NonExtensible)
    }

    /// Forbid new properties and make every property non-configurable
    pub fn seal(&self) -> JsResult<bool> {
        self.lock(LockState::Sealed)
    }

    /// Seal and make every data property read-only
    pub fn freeze(&self) -> JsResult<bool> {
        self.lock(LockState::Frozen)
    }

    fn lock(&self, target: LockState) -> JsResult<bool> {
        let current = self.data.lock.get();
        if current >= target {
            return Ok(true);
        }

        if self.is_trapping() {
            let receiver = self.to_value();
            let descriptors = match self.dispatch(Trap::Fix, None, |h| h.fix(&receiver)) {
                Some(result) => {
                    result?.ok_or_else(|| JsError::type_error("Cannot lock object"))?
                }
                None => self.snapshot()?,
            };
            self.data.storage.replace_properties(descriptors);
            *self.data.handler.borrow_mut() = None;
            tracing::debug!(
                properties = self.data.storage.own_property_names().len(),
                "proxy stopped trapping"
            );
        }

        match target {
            LockState::Open => {}
            LockState::NonExtensible => self.data.storage.prevent_extensions(),
            LockState::Sealed => self.data.storage.seal(),
            LockState::Frozen => self.data.storage.freeze(),
        }
        self.data.lock.set(target);
        tracing::debug!(from = ?current, to = ?target, "proxy locked");
        Ok(true)
    }

    fn snapshot(&self) -> JsResult<DescriptorMap> {
        let mut descriptors = DescriptorMap::new();
        for name in self.get_own_property_names()? {
            if let Some(desc) = self.get_own_property_descriptor(&name)? {
                descriptors.insert(name, desc);
            }
        }
        Ok(descriptors)
    }

    /// Current integrity level
    pub fn lock_state(&self) -> LockState {
        self.data.lock.get()
    }

    /// Whether operations still go to the handler
    pub fn is_trapping(&self) -> bool {
        self.data.handler.borrow().is_some()
    }

    /// Whether new properties may be added
    pub fn is_extensible(&self) -> bool {
        self.data.lock.get() == LockState::Open
    }

    /// Whether the proxy is sealed (or frozen)
    pub fn is_sealed(&self) -> bool {
        self.data.lock.get() >= LockState::Sealed
    }

    /// Whether the proxy is frozen
    pub fn is_frozen(&self) -> bool {
        self.data.lock.get() == LockState::Frozen
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("trapping", &self.is_trapping())
            .field("lock", &self.data.lock.get())
            .field("callable", &self.is_callable())
            .finish()
    }
}
