//! Proxies on prototype chains

use super::support::{func, map_backed_handler, object_with};
use proxy_runtime::{
    reflect, JsFunction, JsObject, JsValue, PropertyDescriptor, ProxyFactory, Trap, TrapRecorder,
};

fn base_type() -> JsValue {
    JsValue::Function(JsFunction::constructor("BaseType", |_, _| Ok(JsValue::Undefined)))
}

#[test]
fn test_proxy_with_explicit_prototype_is_instance() {
    let base = base_type();
    let proto = reflect::get(&base, "prototype").unwrap();
    let proxy = ProxyFactory::create(&JsValue::object(), Some(&proto))
        .unwrap()
        .to_value();
    assert!(reflect::instance_of(&proxy, &base).unwrap());
}

#[test]
fn test_instance_of_constructor_with_proxy_prototype() {
    let base = base_type();
    let proto = reflect::get(&base, "prototype").unwrap();
    let proxy = ProxyFactory::create(&JsValue::object(), Some(&proto))
        .unwrap()
        .to_value();

    let sub = JsValue::Function(JsFunction::constructor("SubProxy", |_, _| Ok(JsValue::Undefined)));
    assert!(reflect::set(&sub, "prototype", proxy.clone()).unwrap());

    let instance = reflect::construct(&sub, &[]).unwrap();
    assert!(reflect::instance_of(&instance, &base).unwrap());
    assert!(reflect::instance_of(&instance, &sub).unwrap());
}

#[test]
fn test_value_set_on_proxy_prototype_is_inherited() {
    let store = JsObject::new();
    let proxy = ProxyFactory::create(&map_backed_handler(&store), None)
        .unwrap()
        .to_value();
    let sub = JsValue::Function(JsFunction::constructor("SubProxy", |_, _| Ok(JsValue::Undefined)));
    reflect::set(&sub, "prototype", proxy.clone()).unwrap();

    let prototype = reflect::get(&sub, "prototype").unwrap();
    reflect::set(&prototype, "second", JsValue::string("great")).unwrap();

    let instance = reflect::construct(&sub, &[]).unwrap();
    assert_eq!(reflect::get(&instance, "second").unwrap(), JsValue::string("great"));
    assert!(reflect::has(&instance, "second").unwrap());
    assert!(!reflect::has_own_property(&instance, "second").unwrap());
}

#[test]
fn test_inherited_read_passes_original_receiver() {
    let handler = object_with(&[(
        "get",
        func("get", |_, args| {
            let receiver = &args[0];
            reflect::get(receiver, "tag")
        }),
    )]);
    let proxy = ProxyFactory::create(&handler, None).unwrap().to_value();
    let child = JsValue::object_with_proto(&proxy);
    reflect::set(&child, "tag", JsValue::string("child")).unwrap();

    assert_eq!(reflect::get(&child, "anything").unwrap(), JsValue::string("child"));
}

#[test]
fn test_inherited_write_goes_to_set_trap() {
    let recorder = TrapRecorder::new();
    let handler = object_with(&[(
        "set",
        func("set", |_, args| {
            let receiver = &args[0];
            let name = args[1].to_property_key();
            let value = args[2].clone();
            let obj = receiver.as_object().cloned().unwrap_or_default();
            obj.put(&format!("seen_{}", name), value);
            Ok(JsValue::boolean(true))
        }),
    )]);
    let proxy = ProxyFactory::create(&handler, None).unwrap();
    proxy.observe(recorder.clone());
    let child = JsValue::object_with_proto(&proxy.to_value());

    assert!(reflect::set(&child, "x", JsValue::number(1.0)).unwrap());
    assert_eq!(recorder.last_trap(), Some(Trap::Set));
    assert!(reflect::has_own_property(&child, "seen_x").unwrap());
}

#[test]
fn test_write_without_set_trap_lands_on_receiver() {
    let proxy = ProxyFactory::create(&JsValue::object(), None).unwrap().to_value();
    let child = JsValue::object_with_proto(&proxy);
    assert!(reflect::set(&child, "own", JsValue::number(1.0)).unwrap());
    assert!(reflect::has_own_property(&child, "own").unwrap());
    assert!(!reflect::has_own_property(&proxy, "own").unwrap());
}

#[test]
fn test_for_in_delegates_to_enumerate() {
    let store = JsObject::new();
    store.put(
        "inherited",
        object_with(&[("value", JsValue::Null), ("enumerable", JsValue::boolean(true))]),
    );
    let proxy = ProxyFactory::create(&map_backed_handler(&store), None)
        .unwrap()
        .to_value();
    let child = JsObject::with_prototype(Some(proxy));
    child.put("own", JsValue::Null);

    assert_eq!(
        reflect::for_in(&JsValue::Object(child)).unwrap(),
        vec!["own", "inherited"]
    );
}

#[test]
fn test_fallback_has_consults_prototype() {
    let proto = object_with(&[("shared", JsValue::Null)]);
    let proxy = ProxyFactory::create(&JsValue::object(), Some(&proto))
        .unwrap()
        .to_value();
    assert!(reflect::has(&proxy, "shared").unwrap());
    assert!(!reflect::has_own_property(&proxy, "shared").unwrap());
    assert_eq!(reflect::for_in(&proxy).unwrap(), vec!["shared"]);
    assert!(reflect::keys(&proxy).unwrap().is_empty());
}

#[test]
fn test_write_shadowing_inherited_property_is_open() {
    let proto = JsObject::new();
    proto
        .define_own_property(
            "p",
            PropertyDescriptor::data(JsValue::number(0.0))
                .enumerable(false)
                .configurable(false),
        )
        .unwrap();
    let proto = JsValue::Object(proto);
    let proxy = ProxyFactory::create(&JsValue::object(), Some(&proto)).unwrap();

    assert!(proxy.set("p", JsValue::number(1.0)).unwrap());

    let own = proxy.get_own_property_descriptor("p").unwrap().unwrap();
    assert_eq!(own.value, Some(JsValue::number(1.0)));
    assert!(own.writable && own.enumerable && own.configurable);
    assert_eq!(reflect::keys(&proxy.to_value()).unwrap(), vec!["p"]);
    assert_eq!(reflect::get(&proto, "p").unwrap(), JsValue::number(0.0));
}

#[test]
fn test_write_to_own_property_keeps_attributes() {
    let proxy = ProxyFactory::create(&JsValue::object(), None).unwrap();
    proxy
        .define_property(
            "hidden",
            PropertyDescriptor::data(JsValue::number(0.0)).enumerable(false),
        )
        .unwrap();

    assert!(proxy.set("hidden", JsValue::number(1.0)).unwrap());

    let own = proxy.get_own_property_descriptor("hidden").unwrap().unwrap();
    assert_eq!(own.value, Some(JsValue::number(1.0)));
    assert!(!own.enumerable);
}
