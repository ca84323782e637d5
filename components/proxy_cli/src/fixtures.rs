//! Handler objects shared by the scenarios and the shell
//!
//! The backing-store handler keeps every property of its proxy as a
//! descriptor object inside a plain object, and defines all twelve traps
//! in terms of it.

use proxy_runtime::{reflect, CallContext, JsObject, JsResult, JsValue};

/// Object built from key/value pairs
pub fn object_with(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = JsObject::new();
    for (key, value) in entries {
        obj.put(key, value.clone());
    }
    JsValue::Object(obj)
}

/// Data descriptor object with every flag set
pub fn open_descriptor(value: JsValue) -> JsValue {
    object_with(&[
        ("value", value),
        ("writable", JsValue::boolean(true)),
        ("enumerable", JsValue::boolean(true)),
        ("configurable", JsValue::boolean(true)),
    ])
}

fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}

fn key(args: &[JsValue], index: usize) -> String {
    arg(args, index).to_property_key()
}

fn install<F>(handler: &JsObject, store: &JsValue, name: &str, trap: F)
where
    F: Fn(&JsValue, &CallContext, &[JsValue]) -> JsResult<JsValue> + 'static,
{
    let store = store.clone();
    handler.put(
        name,
        JsValue::function(name, move |ctx, args| trap(&store, ctx, args)),
    );
}

/// Handler object over `store`
pub fn backing_store_handler(store: &JsObject) -> JsValue {
    let handler = JsObject::new();
    let s = JsValue::Object(store.clone());

    install(&handler, &s, "getOwnPropertyDescriptor", |store, _, args| {
        let name = key(args, 0);
        if reflect::has_own_property(store, &name)? {
            reflect::get(store, &name)
        } else {
            Ok(JsValue::Undefined)
        }
    });
    install(&handler, &s, "getPropertyDescriptor", |store, _, args| {
        let name = key(args, 0);
        if reflect::has(store, &name)? {
            reflect::get(store, &name)
        } else {
            Ok(JsValue::Undefined)
        }
    });
    install(&handler, &s, "defineProperty", |store, _, args| {
        let name = key(args, 0);
        if reflect::has(store, &name)? {
            let existing = reflect::get(store, &name)?;
            if !reflect::get(&existing, "configurable")?.to_boolean() {
                return Ok(JsValue::Null);
            }
        }
        reflect::set(store, &name, arg(args, 1))?;
        Ok(JsValue::Null)
    });
    install(&handler, &s, "getOwnPropertyNames", |store, _, _| {
        Ok(JsValue::string_array(&reflect::get_own_property_names(store)?))
    });
    install(&handler, &s, "delete", |store, _, args| {
        let name = key(args, 0);
        if !reflect::has(store, &name)? {
            return Ok(JsValue::boolean(true));
        }
        Ok(JsValue::boolean(reflect::delete_property(store, &name)?))
    });
    install(&handler, &s, "enumerate", |store, _, _| {
        Ok(JsValue::string_array(&reflect::keys(store)?))
    });
    install(&handler, &s, "fix", |store, _, _| Ok(store.clone()));
    install(&handler, &s, "has", |store, _, args| {
        Ok(JsValue::boolean(reflect::has(store, &key(args, 0))?))
    });
    install(&handler, &s, "hasOwn", |store, _, args| {
        Ok(JsValue::boolean(reflect::has_own_property(store, &key(args, 0))?))
    });
    install(&handler, &s, "get", |store, _, args| {
        let receiver = arg(args, 0);
        let name = key(args, 1);
        if !reflect::has(store, &name)? {
            return Ok(JsValue::Undefined);
        }
        let desc = reflect::get(store, &name)?;
        let getter = reflect::get(&desc, "get")?;
        if getter.is_callable() {
            reflect::call(&getter, &receiver, &[])
        } else {
            reflect::get(&desc, "value")
        }
    });
    install(&handler, &s, "set", |store, _, args| {
        let receiver = arg(args, 0);
        let name = key(args, 1);
        let value = arg(args, 2);
        if !reflect::has(store, &name)? {
            reflect::set(store, &name, open_descriptor(value))?;
            return Ok(JsValue::boolean(true));
        }
        let desc = reflect::get(store, &name)?;
        if !reflect::get(&desc, "configurable")?.to_boolean() {
            return Ok(JsValue::boolean(false));
        }
        let setter = reflect::get(&desc, "set")?;
        if setter.is_callable() {
            reflect::call(&setter, &receiver, &[value])?;
        } else {
            reflect::set(&desc, "value", value)?;
        }
        Ok(JsValue::boolean(true))
    });
    install(&handler, &s, "keys", |store, _, _| {
        Ok(JsValue::string_array(&reflect::get_own_property_names(store)?))
    });

    JsValue::Object(handler)
}
