//! Callable proxies
//!
//! A callable proxy is an ordinary [`ProxyObject`] that also carries a call
//! trap and, optionally, a construct trap.

use std::ops::Deref;

use crate::observer::TrapEvent;
use crate::proxy::ProxyObject;
use crate::reflect;
use crate::value::{CallContext, JsValue};
use core_types::{JsError, JsResult, Trap};

impl ProxyObject {
    /// [[Call]] internal method
    pub fn call(&self, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        self.invoke(&CallContext::call(this.clone()), args)
    }

    /// Dispatch to the call trap, or to the construct trap when the context
    /// is constructing and one exists
    pub fn invoke(&self, ctx: &CallContext, args: &[JsValue]) -> JsResult<JsValue> {
        let invocation = self
            .invocation()
            .ok_or_else(|| JsError::type_error("proxy is not a function"))?;

        let (trap, func) = match (&invocation.construct, ctx.constructing) {
            (Some(construct), true) => (Trap::Construct, construct.clone()),
            (_, true) => (Trap::Construct, invocation.call.clone()),
            (_, false) => (Trap::Call, invocation.call.clone()),
        };

        let result = reflect::invoke(&func, ctx, args);
        tracing::trace!(trap = %trap, ok = result.is_ok(), "proxy invocation");
        self.notify(&TrapEvent::new(trap, None));
        result
    }

    /// [[Construct]] internal method
    ///
    /// The default instance is a new proxy sharing this proxy's handler and
    /// observers, inheriting from this proxy's `prototype` property. An
    /// object-like trap result replaces it.
    pub fn construct(&self, args: &[JsValue]) -> JsResult<JsValue> {
        if !self.is_callable() {
            return Err(JsError::type_error("proxy is not a constructor"));
        }
        let prototype = self.get("prototype")?;
        let prototype = prototype.is_object_like().then_some(prototype);
        let instance = self.spawn_instance(prototype).to_value();

        let result = self.invoke(&CallContext::construct(instance.clone()), args)?;
        if result.is_object_like() {
            Ok(result)
        } else {
            Ok(instance)
        }
    }
}

/// A proxy created with call and construct traps.
///
/// Dereferences to the underlying [`ProxyObject`], so every property
/// operation is available directly.
#[derive(Debug, Clone)]
pub struct CallableProxyObject {
    proxy: ProxyObject,
}

impl CallableProxyObject {
    pub(crate) fn new(proxy: ProxyObject) -> Self {
        CallableProxyObject { proxy }
    }

    /// Call with the given receiver
    pub fn call(&self, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        self.proxy.call(this, args)
    }

    /// Construct a new instance
    pub fn construct(&self, args: &[JsValue]) -> JsResult<JsValue> {
        self.proxy.construct(args)
    }

    /// The underlying proxy
    pub fn as_proxy(&self) -> &ProxyObject {
        &self.proxy
    }

    /// The proxy as a value
    pub fn into_value(self) -> JsValue {
        JsValue::Proxy(self.proxy)
    }
}

impl Deref for CallableProxyObject {
    type Target = ProxyObject;

    fn deref(&self) -> &ProxyObject {
        &self.proxy
    }
}

impl From<CallableProxyObject> for JsValue {
    fn from(callable: CallableProxyObject) -> Self {
        callable.into_value()
    }
}
