//! Proxy handlers
//!
//! A handler supplies the traps of a proxy. Every trap method returns
//! `None` when the trap is absent, in which case the proxy falls back to its
//! default storage. Implement [`ProxyHandler`] directly for native handlers,
//! or use [`HandlerMap`] to dispatch to function values.

use indexmap::IndexMap;

use crate::descriptor::{DescriptorMap, PropertyDescriptor};
use crate::reflect;
use crate::value::{CallContext, JsValue};
use core_types::{JsError, JsResult, Trap};

/// Set of optional traps.
///
/// `receiver` is the value the operation was performed on. For `get` and
/// `set` that may be an object inheriting from the proxy; for every other
/// trap it is the proxy itself.
#[allow(unused_variables)]
pub trait ProxyHandler {
    /// getOwnPropertyDescriptor(name)
    fn get_own_property_descriptor(
        &self,
        receiver: &JsValue,
        name: &str,
    ) -> Option<JsResult<Option<PropertyDescriptor>>> {
        None
    }

    /// getPropertyDescriptor(name)
    fn get_property_descriptor(
        &self,
        receiver: &JsValue,
        name: &str,
    ) -> Option<JsResult<Option<PropertyDescriptor>>> {
        None
    }

    /// getOwnPropertyNames()
    fn get_own_property_names(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        None
    }

    /// defineProperty(name, descriptor)
    fn define_property(
        &self,
        receiver: &JsValue,
        name: &str,
        desc: &PropertyDescriptor,
    ) -> Option<JsResult<bool>> {
        None
    }

    /// delete(name)
    fn delete(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        None
    }

    /// fix(): descriptors that replace the proxy when it is locked, or
    /// `Ok(None)` to refuse locking
    fn fix(&self, receiver: &JsValue) -> Option<JsResult<Option<DescriptorMap>>> {
        None
    }

    /// has(name)
    fn has(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        None
    }

    /// hasOwn(name)
    fn has_own(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        None
    }

    /// get(receiver, name)
    fn get(&self, receiver: &JsValue, name: &str) -> Option<JsResult<JsValue>> {
        None
    }

    /// set(receiver, name, value)
    fn set(&self, receiver: &JsValue, name: &str, value: &JsValue) -> Option<JsResult<bool>> {
        None
    }

    /// enumerate()
    fn enumerate(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        None
    }

    /// keys()
    fn keys(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        None
    }
}

/// Handler that dispatches each trap to a function value.
///
/// Trap functions run with `this` bound to the receiver. Their arguments
/// follow the handler-object convention: `(name)` for most traps,
/// `(receiver, name)` for `get`, `(receiver, name, value)` for `set`,
/// `(name, descriptor)` for `defineProperty` and no arguments for the
/// listing traps and `fix`.
///
/// # Examples
///
/// ```
/// use core_types::Trap;
/// use proxy_runtime::{HandlerMap, JsValue};
///
/// let handler = HandlerMap::new().on(Trap::Has, |_, args| {
///     Ok(JsValue::boolean(args[0].to_js_string() == "first"))
/// });
/// assert!(handler.defines(Trap::Has));
/// assert!(!handler.defines(Trap::Get));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerMap {
    traps: IndexMap<Trap, JsValue>,
}

impl HandlerMap {
    /// Create a table with no traps
    pub fn new() -> Self {
        HandlerMap::default()
    }

    /// Install a native closure as the function for `trap`.
    ///
    /// Invocation traps are not handler traps and are ignored here.
    pub fn on<F>(mut self, trap: Trap, func: F) -> Self
    where
        F: Fn(&CallContext, &[JsValue]) -> JsResult<JsValue> + 'static,
    {
        if trap.is_handler_trap() {
            self.traps
                .insert(trap, JsValue::function(trap.as_str(), func));
        } else {
            tracing::debug!(trap = %trap, "ignoring invocation trap in handler table");
        }
        self
    }

    /// Install an existing function value for `trap`
    pub fn with(mut self, trap: Trap, func: JsValue) -> JsResult<Self> {
        if !trap.is_handler_trap() {
            return Err(JsError::invalid_handler(format!(
                "{} is not a handler trap",
                trap
            )));
        }
        if !func.is_callable() {
            return Err(JsError::invalid_handler(format!(
                "ProxyHandler.{} must be a Function",
                trap
            )));
        }
        self.traps.insert(trap, func);
        Ok(self)
    }

    /// Build the table from a handler object.
    ///
    /// Each known trap name present on the handler (own or inherited) must
    /// hold a callable. Unknown own names are ignored.
    pub fn from_object(handler: &JsValue) -> JsResult<Self> {
        if !handler.is_object_like() {
            return Err(JsError::invalid_handler(format!(
                "Proxy handler must be an object, got {}",
                handler.type_of()
            )));
        }

        let mut table = HandlerMap::new();
        for trap in Trap::HANDLER_TRAPS {
            let key = trap.as_str();
            if !reflect::has(handler, key)? {
                continue;
            }
            let func = reflect::get(handler, key)?;
            if !func.is_callable() {
                return Err(JsError::invalid_handler(format!(
                    "ProxyHandler.{} must be a Function",
                    key
                )));
            }
            table.traps.insert(trap, func);
        }

        for name in reflect::get_own_property_names(handler)? {
            if Trap::from_handler_key(&name).is_none() {
                tracing::debug!(key = %name, "ignoring unknown handler key");
            }
        }

        tracing::debug!(traps = table.traps.len(), "validated handler object");
        Ok(table)
    }

    /// Function installed for `trap`
    pub fn trap(&self, trap: Trap) -> Option<&JsValue> {
        self.traps.get(&trap)
    }

    /// Whether `trap` is installed
    pub fn defines(&self, trap: Trap) -> bool {
        self.traps.contains_key(&trap)
    }

    /// Installed traps in installation order
    pub fn traps(&self) -> impl Iterator<Item = Trap> + '_ {
        self.traps.keys().copied()
    }

    /// Number of installed traps
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Whether no trap is installed
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    fn invoke(
        &self,
        trap: Trap,
        receiver: &JsValue,
        args: &[JsValue],
    ) -> Option<JsResult<JsValue>> {
        let func = self.traps.get(&trap)?;
        Some(reflect::call(func, receiver, args))
    }
}

fn to_descriptor(result: JsValue) -> JsResult<Option<PropertyDescriptor>> {
    if result.is_nullish() {
        Ok(None)
    } else {
        PropertyDescriptor::from_value(&result).map(Some)
    }
}

fn to_names(result: JsValue) -> Vec<String> {
    match result {
        JsValue::Array(names) => names
            .to_vec()
            .iter()
            .map(JsValue::to_property_key)
            .collect(),
        _ => Vec::new(),
    }
}

/// `undefined`/`null` count as success, anything else by truthiness
fn to_success(result: JsValue) -> bool {
    result.is_nullish() || result.to_boolean()
}

fn to_descriptor_map(result: JsValue) -> JsResult<Option<DescriptorMap>> {
    if !result.is_object_like() {
        return Ok(None);
    }
    let mut map = DescriptorMap::new();
    for name in reflect::get_own_property_names(&result)? {
        let desc = reflect::get(&result, &name)?;
        map.insert(name, PropertyDescriptor::from_value(&desc)?);
    }
    Ok(Some(map))
}

fn name_arg(name: &str) -> JsValue {
    JsValue::string(name)
}

impl ProxyHandler for HandlerMap {
    fn get_own_property_descriptor(
        &self,
        receiver: &JsValue,
        name: &str,
    ) -> Option<JsResult<Option<PropertyDescriptor>>> {
        self.invoke(Trap::GetOwnPropertyDescriptor, receiver, &[name_arg(name)])
            .map(|result| result.and_then(to_descriptor))
    }

    fn get_property_descriptor(
        &self,
        receiver: &JsValue,
        name: &str,
    ) -> Option<JsResult<Option<PropertyDescriptor>>> {
        self.invoke(Trap::GetPropertyDescriptor, receiver, &[name_arg(name)])
            .map(|result| result.and_then(to_descriptor))
    }

    fn get_own_property_names(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        self.invoke(Trap::GetOwnPropertyNames, receiver, &[])
            .map(|result| result.map(to_names))
    }

    fn define_property(
        &self,
        receiver: &JsValue,
        name: &str,
        desc: &PropertyDescriptor,
    ) -> Option<JsResult<bool>> {
        self.invoke(
            Trap::DefineProperty,
            receiver,
            &[name_arg(name), desc.to_value()],
        )
        .map(|result| result.map(to_success))
    }

    fn delete(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        self.invoke(Trap::Delete, receiver, &[name_arg(name)])
            .map(|result| result.map(|v| v.to_boolean()))
    }

    fn fix(&self, receiver: &JsValue) -> Option<JsResult<Option<DescriptorMap>>> {
        self.invoke(Trap::Fix, receiver, &[])
            .map(|result| result.and_then(to_descriptor_map))
    }

    fn has(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        self.invoke(Trap::Has, receiver, &[name_arg(name)])
            .map(|result| result.map(|v| v.to_boolean()))
    }

    fn has_own(&self, receiver: &JsValue, name: &str) -> Option<JsResult<bool>> {
        self.invoke(Trap::HasOwn, receiver, &[name_arg(name)])
            .map(|result| result.map(|v| v.to_boolean()))
    }

    fn get(&self, receiver: &JsValue, name: &str) -> Option<JsResult<JsValue>> {
        self.invoke(Trap::Get, receiver, &[receiver.clone(), name_arg(name)])
    }

    fn set(&self, receiver: &JsValue, name: &str, value: &JsValue) -> Option<JsResult<bool>> {
        self.invoke(
            Trap::Set,
            receiver,
            &[receiver.clone(), name_arg(name), value.clone()],
        )
        .map(|result| result.map(to_success))
    }

    fn enumerate(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        self.invoke(Trap::Enumerate, receiver, &[])
            .map(|result| result.map(to_names))
    }

    fn keys(&self, receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        self.invoke(Trap::Keys, receiver, &[])
            .map(|result| result.map(to_names))
    }
}
