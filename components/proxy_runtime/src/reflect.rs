//! Host access operations
//!
//! These are the operations a script performs on values (`obj.x`,
//! `obj.x = y`, `x in obj`, `delete obj.x`, `for..in`, `Object.keys`,
//! `instanceof`, `new`). They work uniformly over ordinary objects, arrays,
//! functions and proxies. Property lookups walk the prototype chain
//! explicitly; when the walk reaches a proxy, the rest of the operation is
//! handed to that proxy together with the original receiver.

use std::collections::HashSet;

use crate::descriptor::PropertyDescriptor;
use crate::object::JsObject;
use crate::proxy::ProxyObject;
use crate::value::{CallContext, JsArray, JsValue, MAX_DENSE_LENGTH};
use core_types::{JsError, JsResult};

/// Prototype link of `value`, if it has one
pub fn prototype_of(value: &JsValue) -> Option<JsValue> {
    match value {
        JsValue::Object(obj) => obj.prototype(),
        JsValue::Function(func) => func.object().prototype(),
        JsValue::Proxy(proxy) => proxy.prototype(),
        _ => None,
    }
}

/// Iterator over a prototype chain.
///
/// [`PrototypeChain::of`] starts at the value's prototype,
/// [`PrototypeChain::including`] at the value itself.
pub struct PrototypeChain {
    next: Option<JsValue>,
    accessor: fn(&JsValue) -> Option<JsValue>,
}

impl PrototypeChain {
    /// Chain of `value`'s ancestors
    pub fn of(value: &JsValue) -> Self {
        PrototypeChain {
            next: prototype_of(value),
            accessor: prototype_of,
        }
    }

    /// `value` followed by its ancestors
    pub fn including(value: &JsValue) -> Self {
        PrototypeChain {
            next: Some(value.clone()),
            accessor: prototype_of,
        }
    }

    /// Chain starting at `start`, linked by a custom accessor
    pub fn with_accessor(
        start: Option<JsValue>,
        accessor: fn(&JsValue) -> Option<JsValue>,
    ) -> Self {
        PrototypeChain {
            next: start,
            accessor,
        }
    }
}

impl Iterator for PrototypeChain {
    type Item = JsValue;

    fn next(&mut self) -> Option<JsValue> {
        let current = self.next.take()?;
        self.next = (self.accessor)(&current);
        Some(current)
    }
}

/// Outcome of looking up a name along a prototype chain
#[derive(Debug, Clone)]
pub enum Resolution {
    /// An ordinary holder has the property
    Found {
        /// The object that owns the property
        holder: JsValue,
        /// Its descriptor
        descriptor: PropertyDescriptor,
    },
    /// The walk reached a proxy, which takes over from here
    Delegated(ProxyObject),
    /// No holder on the chain
    Missing,
}

/// Walk `target`'s chain (starting at `target`) looking for `name`
pub fn resolve(target: &JsValue, name: &str) -> Resolution {
    for holder in PrototypeChain::including(target) {
        if let JsValue::Proxy(proxy) = &holder {
            return Resolution::Delegated(proxy.clone());
        }
        if let Some(descriptor) = ordinary_own_property(&holder, name) {
            return Resolution::Found { holder, descriptor };
        }
    }
    Resolution::Missing
}

/// Canonical array index for `name`
pub fn array_index(name: &str) -> Option<usize> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().map(|i| i as usize)
}

/// Property name for an integer key
pub fn key_from_index(index: usize) -> String {
    index.to_string()
}

fn storage_of(value: &JsValue) -> Option<&JsObject> {
    match value {
        JsValue::Object(obj) => Some(obj),
        JsValue::Function(func) => Some(func.object()),
        _ => None,
    }
}

fn array_own_property(arr: &JsArray, name: &str) -> Option<PropertyDescriptor> {
    if name == "length" {
        let len = JsValue::number(arr.len() as f64);
        return Some(
            PropertyDescriptor::data(len)
                .enumerable(false)
                .configurable(false),
        );
    }
    array_index(name)
        .and_then(|i| arr.get(i))
        .map(PropertyDescriptor::data)
}

fn array_names(arr: &JsArray) -> Vec<String> {
    (0..arr.len()).map(key_from_index).collect()
}

fn array_set(arr: &JsArray, name: &str, value: JsValue) -> JsResult<bool> {
    if name == "length" {
        return match value.as_number() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 => {
                if n > f64::from(u32::MAX) {
                    return Err(JsError::range_error("Invalid array length"));
                }
                grow(arr.set_len(n as usize), n)
            }
            _ => Ok(false),
        };
    }
    match array_index(name) {
        Some(i) => grow(arr.set(i, value), (i + 1) as f64),
        None => Ok(false),
    }
}

fn grow(written: bool, len: f64) -> JsResult<bool> {
    if written {
        Ok(true)
    } else {
        Err(JsError::range_error(format!(
            "Array length {} exceeds the limit of {} elements",
            len, MAX_DENSE_LENGTH
        )))
    }
}

/// Own descriptor of a non-proxy value
fn ordinary_own_property(value: &JsValue, name: &str) -> Option<PropertyDescriptor> {
    match value {
        JsValue::Array(arr) => array_own_property(arr, name),
        other => storage_of(other).and_then(|obj| obj.get_own_property(name)),
    }
}

fn non_object(operation: &str, value: &JsValue) -> JsError {
    JsError::type_error(format!(
        "{} called on non-object: {}",
        operation,
        value.to_js_string()
    ))
}

/// `target[name]`
pub fn get(target: &JsValue, name: &str) -> JsResult<JsValue> {
    get_with_receiver(target, name, target)
}

/// `target[name]` with an explicit receiver for accessors and proxies
pub fn get_with_receiver(target: &JsValue, name: &str, receiver: &JsValue) -> JsResult<JsValue> {
    if target.is_nullish() {
        return Err(JsError::type_error(format!(
            "Cannot read property '{}' of {}",
            name,
            target.to_js_string()
        )));
    }
    match resolve(target, name) {
        Resolution::Found { descriptor, .. } if descriptor.is_accessor_descriptor() => {
            match descriptor.get {
                Some(getter) => call(&getter, receiver, &[]),
                None => Ok(JsValue::Undefined),
            }
        }
        Resolution::Found { descriptor, .. } => Ok(descriptor.value.unwrap_or_default()),
        Resolution::Delegated(proxy) => proxy.get_with_receiver(receiver, name),
        Resolution::Missing => Ok(JsValue::Undefined),
    }
}

/// `target[name] = value`. Returns `false` when the write is refused.
pub fn set(target: &JsValue, name: &str, value: JsValue) -> JsResult<bool> {
    set_with_receiver(target, name, value, target)
}

/// `target[name] = value` with an explicit receiver
pub fn set_with_receiver(
    target: &JsValue,
    name: &str,
    value: JsValue,
    receiver: &JsValue,
) -> JsResult<bool> {
    if target.is_nullish() {
        return Err(JsError::type_error(format!(
            "Cannot set property '{}' of {}",
            name,
            target.to_js_string()
        )));
    }
    if let JsValue::Array(arr) = target {
        return array_set(arr, name, value);
    }
    match resolve(target, name) {
        Resolution::Delegated(proxy) => proxy.set_with_receiver(receiver, name, value),
        Resolution::Found { descriptor, .. } if descriptor.is_accessor_descriptor() => {
            match descriptor.set {
                Some(setter) => {
                    call(&setter, receiver, &[value])?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Resolution::Found { holder, descriptor } => {
            if !descriptor.writable {
                return Ok(false);
            }
            if holder.same_reference(receiver) {
                return Ok(storage_of(receiver).map_or(false, |obj| obj.put(name, value)));
            }
            create_data_property(receiver, name, value)
        }
        Resolution::Missing => create_data_property(receiver, name, value),
    }
}

fn create_data_property(receiver: &JsValue, name: &str, value: JsValue) -> JsResult<bool> {
    match receiver {
        JsValue::Proxy(proxy) => proxy.define_property(name, PropertyDescriptor::data(value)),
        JsValue::Array(arr) => array_set(arr, name, value),
        other => match storage_of(other) {
            Some(obj) if obj.is_extensible() || obj.has_own_property(name) => {
                Ok(obj.put(name, value))
            }
            _ => Ok(false),
        },
    }
}

/// `name in target`
pub fn has(target: &JsValue, name: &str) -> JsResult<bool> {
    if !target.is_object_like() {
        return Err(JsError::type_error(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            name,
            target.to_js_string()
        )));
    }
    match resolve(target, name) {
        Resolution::Found { .. } => Ok(true),
        Resolution::Delegated(proxy) => proxy.has(name),
        Resolution::Missing => Ok(false),
    }
}

/// `Object.prototype.hasOwnProperty.call(target, name)`
pub fn has_own_property(target: &JsValue, name: &str) -> JsResult<bool> {
    match target {
        JsValue::Proxy(proxy) => proxy.has_own(name),
        other => Ok(ordinary_own_property(other, name).is_some()),
    }
}

/// `delete target[name]`. Returns `false` when the delete is refused.
pub fn delete_property(target: &JsValue, name: &str) -> JsResult<bool> {
    match target {
        JsValue::Proxy(proxy) => proxy.delete(name),
        JsValue::Array(arr) => {
            if name == "length" {
                return Ok(false);
            }
            if let Some(i) = array_index(name) {
                if i < arr.len() {
                    arr.set(i, JsValue::Undefined);
                }
            }
            Ok(true)
        }
        other => Ok(storage_of(other).map_or(true, |obj| obj.delete_own_property(name))),
    }
}

/// `delete target[name]` in strict code: a refused delete is an error
pub fn delete_property_strict(target: &JsValue, name: &str) -> JsResult<bool> {
    if delete_property(target, name)? {
        Ok(true)
    } else {
        Err(JsError::not_configurable(name))
    }
}

/// `Object.getOwnPropertyDescriptor(target, name)`
pub fn get_own_property_descriptor(
    target: &JsValue,
    name: &str,
) -> JsResult<Option<PropertyDescriptor>> {
    match target {
        JsValue::Proxy(proxy) => proxy.get_own_property_descriptor(name),
        other => Ok(ordinary_own_property(other, name)),
    }
}

/// Descriptor for `name` on `target` or its prototype chain
pub fn get_property_descriptor(
    target: &JsValue,
    name: &str,
) -> JsResult<Option<PropertyDescriptor>> {
    match resolve(target, name) {
        Resolution::Found { descriptor, .. } => Ok(Some(descriptor)),
        Resolution::Delegated(proxy) => proxy.get_property_descriptor(name),
        Resolution::Missing => Ok(None),
    }
}

/// `Object.defineProperty(target, name, desc)`
pub fn define_own_property(
    target: &JsValue,
    name: &str,
    desc: PropertyDescriptor,
) -> JsResult<bool> {
    desc.validate()?;
    match target {
        JsValue::Proxy(proxy) => proxy.define_property(name, desc),
        JsValue::Array(arr) => {
            if desc.is_accessor_descriptor() {
                return Err(JsError::type_error(format!(
                    "Cannot define accessor '{}' on an array",
                    name
                )));
            }
            let value = desc.value.unwrap_or_default();
            if array_set(arr, name, value)? {
                Ok(true)
            } else {
                Err(JsError::type_error(format!(
                    "Cannot define property {} on an array",
                    name
                )))
            }
        }
        other => match storage_of(other) {
            Some(obj) => obj.define_own_property(name, desc),
            None => Err(non_object("Object.defineProperty", other)),
        },
    }
}

/// `Object.getOwnPropertyNames(target)`
pub fn get_own_property_names(target: &JsValue) -> JsResult<Vec<String>> {
    match target {
        JsValue::Proxy(proxy) => proxy.get_own_property_names(),
        JsValue::Array(arr) => {
            let mut names = array_names(arr);
            names.push("length".to_string());
            Ok(names)
        }
        other => match storage_of(other) {
            Some(obj) => Ok(obj.own_property_names()),
            None => Err(non_object("Object.getOwnPropertyNames", other)),
        },
    }
}

/// `Object.keys(target)`
pub fn keys(target: &JsValue) -> JsResult<Vec<String>> {
    match target {
        JsValue::Proxy(proxy) => proxy.keys(),
        JsValue::Array(arr) => Ok(array_names(arr)),
        other => match storage_of(other) {
            Some(obj) => Ok(obj.own_enumerable_names()),
            None => Err(non_object("Object.keys", other)),
        },
    }
}

/// Names visited by `for (k in target)`.
///
/// Own enumerable names come first, then inherited ones. A name seen
/// earlier on the chain, enumerable or not, shadows later occurrences. A
/// proxy on the chain reports the rest of the names through `enumerate`.
pub fn for_in(target: &JsValue) -> JsResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    if !target.is_object_like() {
        return Ok(names);
    }
    for holder in PrototypeChain::including(target) {
        if let JsValue::Proxy(proxy) = &holder {
            for name in proxy.enumerate()? {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
            break;
        }
        for name in get_own_property_names(&holder)? {
            if !seen.insert(name.clone()) {
                continue;
            }
            if ordinary_own_property(&holder, &name).map_or(false, |d| d.enumerable) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

/// `Object.getPrototypeOf(target)`
pub fn get_prototype_of(target: &JsValue) -> JsResult<JsValue> {
    if !target.is_object_like() {
        return Err(non_object("Object.getPrototypeOf", target));
    }
    Ok(prototype_of(target).unwrap_or(JsValue::Null))
}

/// `Object.setPrototypeOf(target, proto)`.
///
/// `proto` must be object-like or `null`. A link that would make the chain
/// cyclic is a `TypeError`. Returns `false` when `target` cannot take a
/// new prototype.
pub fn set_prototype_of(target: &JsValue, proto: &JsValue) -> JsResult<bool> {
    let new_proto = match proto {
        JsValue::Null => None,
        p if p.is_object_like() => Some(p.clone()),
        other => {
            return Err(JsError::type_error(format!(
                "Object prototype may only be an Object or null: {}",
                other.to_js_string()
            )))
        }
    };

    if let Some(p) = &new_proto {
        if PrototypeChain::including(p).any(|link| link.same_reference(target)) {
            return Err(JsError::type_error("Cyclic __proto__ value"));
        }
    }

    let current = prototype_of(target);
    let unchanged = match (&current, &new_proto) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_reference(b),
        _ => false,
    };
    if unchanged {
        return Ok(true);
    }
    if !is_extensible(target)? {
        return Ok(false);
    }

    match target {
        JsValue::Proxy(proxy) => proxy.set_prototype(new_proto),
        other => match storage_of(other) {
            Some(obj) => obj.replace_prototype(new_proto),
            None => return Ok(false),
        },
    }
    Ok(true)
}

/// `Object.isExtensible(target)`
pub fn is_extensible(target: &JsValue) -> JsResult<bool> {
    Ok(match target {
        JsValue::Proxy(proxy) => proxy.is_extensible(),
        JsValue::Array(_) => true,
        other => storage_of(other).map_or(false, JsObject::is_extensible),
    })
}

/// `func.call(this, ...args)`
pub fn call(func: &JsValue, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    invoke(func, &CallContext::call(this.clone()), args)
}

/// Run `func` with an explicit context
pub fn invoke(func: &JsValue, ctx: &CallContext, args: &[JsValue]) -> JsResult<JsValue> {
    match func {
        JsValue::Function(f) => f.call(ctx, args),
        JsValue::Proxy(proxy) if proxy.is_callable() => proxy.invoke(ctx, args),
        other => Err(JsError::type_error(format!(
            "{} is not a function",
            other.to_js_string()
        ))),
    }
}

/// `new ctor(...args)`
pub fn construct(ctor: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    match ctor {
        JsValue::Function(f) => {
            let proto = get(ctor, "prototype")?;
            let instance = JsValue::Object(JsObject::with_prototype(
                proto.is_object_like().then_some(proto),
            ));
            let result = f.call(&CallContext::construct(instance.clone()), args)?;
            Ok(if result.is_object_like() { result } else { instance })
        }
        JsValue::Proxy(proxy) if proxy.is_callable() => proxy.construct(args),
        other => Err(JsError::type_error(format!(
            "{} is not a constructor",
            other.to_js_string()
        ))),
    }
}

/// `value instanceof ctor`
pub fn instance_of(value: &JsValue, ctor: &JsValue) -> JsResult<bool> {
    if !ctor.is_callable() {
        return Err(JsError::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    }
    if !value.is_object_like() {
        return Ok(false);
    }
    let proto = get(ctor, "prototype")?;
    if !proto.is_object_like() {
        return Err(JsError::type_error(
            "Function has non-object prototype in instanceof check",
        ));
    }
    Ok(PrototypeChain::of(value).any(|link| link.same_reference(&proto)))
}
