//! Shared fixtures for the contract tests

use proxy_runtime::{reflect, JsObject, JsResult, JsValue};

/// Build an object from key/value pairs
pub fn object_with(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = JsObject::new();
    for (key, value) in entries {
        obj.put(key, value.clone());
    }
    JsValue::Object(obj)
}

/// Native function wrapper
pub fn func<F>(name: &str, body: F) -> JsValue
where
    F: Fn(&JsValue, &[JsValue]) -> JsResult<JsValue> + 'static,
{
    JsValue::function(name, move |ctx, args| body(&ctx.this, args))
}

fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}

fn name_arg(args: &[JsValue], index: usize) -> String {
    arg(args, index).to_property_key()
}

fn flag(desc: &JsValue, field: &str) -> JsResult<bool> {
    Ok(reflect::get(desc, field)?.to_boolean())
}

/// Handler object that keeps its properties as descriptor objects in
/// `store`, defining every trap.
pub fn map_backed_handler(store: &JsObject) -> JsValue {
    let handler = JsObject::new();
    let s = JsValue::Object(store.clone());

    let store_ = s.clone();
    handler.put(
        "getOwnPropertyDescriptor",
        func("getOwnPropertyDescriptor", move |_, args| {
            let name = name_arg(args, 0);
            if reflect::has_own_property(&store_, &name)? {
                reflect::get(&store_, &name)
            } else {
                Ok(JsValue::Undefined)
            }
        }),
    );

    let store_ = s.clone();
    handler.put(
        "getPropertyDescriptor",
        func("getPropertyDescriptor", move |_, args| {
            let name = name_arg(args, 0);
            if reflect::has(&store_, &name)? {
                reflect::get(&store_, &name)
            } else {
                Ok(JsValue::Undefined)
            }
        }),
    );

    let store_ = s.clone();
    handler.put(
        "defineProperty",
        func("defineProperty", move |_, args| {
            let name = name_arg(args, 0);
            if reflect::has(&store_, &name)? {
                let existing = reflect::get(&store_, &name)?;
                if !flag(&existing, "configurable")? {
                    return Ok(JsValue::Null);
                }
            }
            reflect::set(&store_, &name, arg(args, 1))?;
            Ok(JsValue::Null)
        }),
    );

    let store_ = s.clone();
    handler.put(
        "getOwnPropertyNames",
        func("getOwnPropertyNames", move |_, _| {
            Ok(JsValue::string_array(&reflect::get_own_property_names(&store_)?))
        }),
    );

    let store_ = s.clone();
    handler.put(
        "delete",
        func("delete", move |_, args| {
            let name = name_arg(args, 0);
            if !reflect::has(&store_, &name)? {
                return Ok(JsValue::boolean(true));
            }
            Ok(JsValue::boolean(reflect::delete_property(&store_, &name)?))
        }),
    );

    let store_ = s.clone();
    handler.put(
        "enumerate",
        func("enumerate", move |_, _| {
            Ok(JsValue::string_array(&reflect::keys(&store_)?))
        }),
    );

    let store_ = s.clone();
    handler.put("fix", func("fix", move |_, _| Ok(store_.clone())));

    let store_ = s.clone();
    handler.put(
        "has",
        func("has", move |_, args| {
            Ok(JsValue::boolean(reflect::has(&store_, &name_arg(args, 0))?))
        }),
    );

    let store_ = s.clone();
    handler.put(
        "hasOwn",
        func("hasOwn", move |_, args| {
            Ok(JsValue::boolean(reflect::has_own_property(
                &store_,
                &name_arg(args, 0),
            )?))
        }),
    );

    let store_ = s.clone();
    handler.put(
        "get",
        func("get", move |_, args| {
            let receiver = arg(args, 0);
            let name = name_arg(args, 1);
            if !reflect::has(&store_, &name)? {
                return Ok(JsValue::Undefined);
            }
            let desc = reflect::get(&store_, &name)?;
            let getter = reflect::get(&desc, "get")?;
            if getter.is_callable() {
                reflect::call(&getter, &receiver, &[])
            } else {
                reflect::get(&desc, "value")
            }
        }),
    );

    let store_ = s.clone();
    handler.put(
        "set",
        func("set", move |_, args| {
            let receiver = arg(args, 0);
            let name = name_arg(args, 1);
            let value = arg(args, 2);
            if !reflect::has(&store_, &name)? {
                let desc = object_with(&[
                    ("configurable", JsValue::boolean(true)),
                    ("writable", JsValue::boolean(true)),
                    ("enumerable", JsValue::boolean(true)),
                    ("value", value),
                ]);
                reflect::set(&store_, &name, desc)?;
                return Ok(JsValue::boolean(true));
            }
            let desc = reflect::get(&store_, &name)?;
            if !flag(&desc, "configurable")? {
                return Ok(JsValue::boolean(false));
            }
            let setter = reflect::get(&desc, "set")?;
            if setter.is_callable() {
                reflect::call(&setter, &receiver, &[value.clone()])?;
            }
            reflect::set(&desc, "value", value)?;
            Ok(JsValue::boolean(true))
        }),
    );

    let store_ = s;
    handler.put(
        "keys",
        func("keys", move |_, _| {
            Ok(JsValue::string_array(&reflect::get_own_property_names(&store_)?))
        }),
    );

    JsValue::Object(handler)
}
