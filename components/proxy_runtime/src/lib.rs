//! Interceptable proxy objects for a dynamic object model.
//!
//! This crate provides:
//!
//! - [`JsValue`], [`JsObject`], [`JsFunction`], [`JsArray`] - the object model
//! - [`PropertyDescriptor`] - data and accessor descriptors
//! - [`reflect`] - host access operations over any value
//! - [`ProxyHandler`] and [`HandlerMap`] - trap dispatch
//! - [`ProxyObject`] and [`CallableProxyObject`] - proxies
//! - [`ProxyFactory`] - creation, locking and hidden values
//! - [`TrapObserver`] and [`TrapRecorder`] - trap observation
//!
//! # Examples
//!
//! ```
//! use core_types::Trap;
//! use proxy_runtime::{reflect, JsObject, JsValue, ProxyFactory, TrapRecorder};
//!
//! let backing = JsObject::new();
//! backing.put("first", JsValue::string("firstProp"));
//! let store = backing.clone();
//!
//! let handler = JsObject::new();
//! handler.put(
//!     "has",
//!     JsValue::function("has", move |_, args| {
//!         Ok(JsValue::boolean(store.has_own_property(&args[0].to_js_string())))
//!     }),
//! );
//!
//! let proxy = ProxyFactory::create(&JsValue::Object(handler), None).unwrap();
//! let recorder = TrapRecorder::new();
//! proxy.observe(recorder.clone());
//!
//! assert!(reflect::has(&proxy.to_value(), "first").unwrap());
//! assert_eq!(recorder.last_trap(), Some(Trap::Has));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod callable;
mod descriptor;
mod factory;
mod handler;
mod object;
mod observer;
mod proxy;
pub mod reflect;
mod value;

pub use callable::CallableProxyObject;
pub use descriptor::{DescriptorMap, PropertyDescriptor};
pub use factory::ProxyFactory;
pub use handler::{HandlerMap, ProxyHandler};
pub use object::JsObject;
pub use observer::{TrapEvent, TrapObserver, TrapRecorder};
pub use proxy::{LockState, ProxyObject};
pub use reflect::{PrototypeChain, Resolution};
pub use value::{CallContext, JsArray, JsFunction, JsValue, NativeFn, MAX_DENSE_LENGTH};

pub use core_types::{ErrorKind, JsError, JsResult, Trap};
