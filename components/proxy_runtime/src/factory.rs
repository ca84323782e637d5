//! Proxy factory
//!
//! Entry points for creating proxies and for the operations that only make
//! sense on them (locking, descriptor access, hidden values).

use std::rc::Rc;

use crate::callable::CallableProxyObject;
use crate::descriptor::{DescriptorMap, PropertyDescriptor};
use crate::handler::{HandlerMap, ProxyHandler};
use crate::object::JsObject;
use crate::proxy::{Invocation, ProxyObject};
use crate::reflect;
use crate::value::{JsArray, JsValue};
use core_types::{JsError, JsResult};

/// Proxy constructor functions
///
/// # Examples
///
/// ```
/// use proxy_runtime::{reflect, JsObject, JsValue, ProxyFactory};
///
/// let handler = JsValue::Object(JsObject::new());
/// let proxy = ProxyFactory::create(&handler, None).unwrap().to_value();
///
/// assert!(!reflect::has(&proxy, "anything").unwrap());
/// assert!(reflect::set(&proxy, "x", JsValue::number(1.0)).unwrap());
/// assert_eq!(reflect::get(&proxy, "x").unwrap(), JsValue::number(1.0));
/// ```
pub struct ProxyFactory;

fn expect_proxy<'a>(operation: &str, target: &'a JsValue) -> JsResult<&'a ProxyObject> {
    target.as_proxy().ok_or_else(|| {
        JsError::type_error(format!(
            "{} expects the first argument to be initialized by Proxy",
            operation
        ))
    })
}

fn prototype_arg(prototype: Option<&JsValue>) -> JsResult<Option<JsValue>> {
    match prototype {
        None | Some(JsValue::Null) => Ok(None),
        Some(p) if p.is_object_like() => Ok(Some(p.clone())),
        Some(other) => Err(JsError::type_error(format!(
            "Proxy prototype must be an object or null: {}",
            other.to_js_string()
        ))),
    }
}

fn descriptor_map(descriptors: &JsValue) -> JsResult<DescriptorMap> {
    if !descriptors.is_object_like() {
        return Err(JsError::type_error(
            "defineProperties requires the second argument to be an object",
        ));
    }
    let mut map = DescriptorMap::new();
    for name in reflect::keys(descriptors)? {
        let desc = reflect::get(descriptors, &name)?;
        map.insert(name, PropertyDescriptor::from_value(&desc)?);
    }
    Ok(map)
}

impl ProxyFactory {
    /// Create a proxy from a handler object
    pub fn create(handler: &JsValue, prototype: Option<&JsValue>) -> JsResult<ProxyObject> {
        let table = HandlerMap::from_object(handler)?;
        ProxyFactory::create_with_handler(Rc::new(table), prototype)
    }

    /// Create a proxy from a native handler
    pub fn create_with_handler(
        handler: Rc<dyn ProxyHandler>,
        prototype: Option<&JsValue>,
    ) -> JsResult<ProxyObject> {
        let prototype = prototype_arg(prototype)?;
        Ok(ProxyObject::new(handler, prototype))
    }

    /// Create a callable proxy from a handler object and its invocation traps
    pub fn create_callable(
        handler: &JsValue,
        call: &JsValue,
        construct: Option<&JsValue>,
    ) -> JsResult<CallableProxyObject> {
        let table = HandlerMap::from_object(handler)?;
        ProxyFactory::create_callable_with_handler(Rc::new(table), call, construct)
    }

    /// Create a callable proxy from a native handler
    pub fn create_callable_with_handler(
        handler: Rc<dyn ProxyHandler>,
        call: &JsValue,
        construct: Option<&JsValue>,
    ) -> JsResult<CallableProxyObject> {
        if !call.is_callable() {
            return Err(JsError::type_error(
                "createCallable requires the call trap to be a Function",
            ));
        }
        let construct = match construct {
            None | Some(JsValue::Undefined) => None,
            Some(f) if f.is_callable() => Some(f.clone()),
            Some(_) => {
                return Err(JsError::type_error(
                    "createCallable requires the construct trap to be a Function",
                ))
            }
        };
        let invocation = Invocation {
            call: call.clone(),
            construct,
        };
        Ok(CallableProxyObject::new(ProxyObject::with_invocation(
            handler, None, invocation,
        )))
    }

    /// Define one property on a proxy from an object-form descriptor
    pub fn define_property(target: &JsValue, name: &str, desc: &JsValue) -> JsResult<bool> {
        let proxy = expect_proxy("defineProperty", target)?;
        proxy.define_property(name, PropertyDescriptor::from_value(desc)?)
    }

    /// Define each enumerable entry of `descriptors` on a proxy, in order
    pub fn define_properties(target: &JsValue, descriptors: &JsValue) -> JsResult<()> {
        let proxy = expect_proxy("defineProperties", target)?;
        proxy.define_properties(descriptor_map(descriptors)?)
    }

    /// Own descriptor of a proxy property in object form, or `undefined`
    pub fn get_own_property_descriptor(target: &JsValue, name: &str) -> JsResult<JsValue> {
        let proxy = expect_proxy("getOwnPropertyDescriptor", target)?;
        Ok(proxy
            .get_own_property_descriptor(name)?
            .map_or(JsValue::Undefined, |desc| desc.to_value()))
    }

    /// Freeze a proxy
    pub fn freeze(target: &JsValue) -> JsResult<bool> {
        expect_proxy("freeze", target)?.freeze()
    }

    /// Seal a proxy
    pub fn seal(target: &JsValue) -> JsResult<bool> {
        expect_proxy("seal", target)?.seal()
    }

    /// Make a proxy non-extensible
    pub fn prevent_extensions(target: &JsValue) -> JsResult<bool> {
        expect_proxy("preventExtensions", target)?.prevent_extensions()
    }

    /// Whether a proxy still traps
    pub fn is_trapping(target: &JsValue) -> JsResult<bool> {
        Ok(expect_proxy("isTrapping", target)?.is_trapping())
    }

    /// Whether a proxy is extensible
    pub fn is_extensible(target: &JsValue) -> JsResult<bool> {
        Ok(expect_proxy("isExtensible", target)?.is_extensible())
    }

    /// Whether a proxy is sealed
    pub fn is_sealed(target: &JsValue) -> JsResult<bool> {
        Ok(expect_proxy("isSealed", target)?.is_sealed())
    }

    /// Whether a proxy is frozen
    pub fn is_frozen(target: &JsValue) -> JsResult<bool> {
        Ok(expect_proxy("isFrozen", target)?.is_frozen())
    }

    /// Whether `value` is a proxy
    pub fn is_proxy(value: &JsValue) -> bool {
        value.is_proxy()
    }

    /// Replace the prototype of any object, rejecting cycles
    pub fn set_prototype(target: &JsValue, prototype: &JsValue) -> JsResult<bool> {
        reflect::set_prototype_of(target, prototype)
    }

    /// Shallow copy of a value
    pub fn clone(value: &JsValue) -> JsValue {
        match value {
            JsValue::Object(obj) => JsValue::Object(obj.shallow_clone()),
            JsValue::Array(arr) => JsValue::Array(JsArray::from_vec(arr.to_vec())),
            JsValue::Proxy(proxy) => JsValue::Proxy(proxy.shallow_clone()),
            other => other.clone(),
        }
    }

    /// Hidden value stored on an object
    pub fn hidden(target: &JsValue, name: &str) -> JsResult<Option<JsValue>> {
        match target {
            JsValue::Proxy(proxy) => Ok(proxy.hidden(name)),
            other => Ok(hidden_storage(other)?.hidden(name)),
        }
    }

    /// Store a hidden value on an object
    pub fn set_hidden(target: &JsValue, name: &str, value: JsValue) -> JsResult<()> {
        match target {
            JsValue::Proxy(proxy) => proxy.set_hidden(name, value),
            other => hidden_storage(other)?.set_hidden(name, value),
        }
        Ok(())
    }
}

fn hidden_storage(target: &JsValue) -> JsResult<&JsObject> {
    match target {
        JsValue::Object(obj) => Ok(obj),
        JsValue::Function(func) => Ok(func.object()),
        other => Err(JsError::type_error(format!(
            "hidden requires the first argument to be an object: {}",
            other.to_js_string()
        ))),
    }
}
