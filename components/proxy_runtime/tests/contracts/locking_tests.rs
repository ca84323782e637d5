//! freeze / seal / preventExtensions

use super::support::{func, map_backed_handler, object_with};
use proxy_runtime::{reflect, ErrorKind, JsObject, JsValue, ProxyFactory, Trap, TrapRecorder};

fn store_with_value() -> JsObject {
    let store = JsObject::new();
    store.put(
        "kept",
        object_with(&[
            ("value", JsValue::string("kept")),
            ("writable", JsValue::boolean(true)),
            ("enumerable", JsValue::boolean(true)),
            ("configurable", JsValue::boolean(true)),
        ]),
    );
    store
}

#[test]
fn test_freeze_uses_fix_result_and_stops_trapping() {
    let store = store_with_value();
    let recorder = TrapRecorder::new();
    let proxy = ProxyFactory::create(&map_backed_handler(&store), None).unwrap();
    proxy.observe(recorder.clone());
    let proxy = proxy.to_value();

    assert!(ProxyFactory::freeze(&proxy).unwrap());
    assert_eq!(recorder.last_trap(), Some(Trap::Fix));
    assert!(ProxyFactory::is_frozen(&proxy).unwrap());
    assert!(!ProxyFactory::is_trapping(&proxy).unwrap());

    recorder.clear();
    assert_eq!(reflect::get(&proxy, "kept").unwrap(), JsValue::string("kept"));
    assert!(!reflect::set(&proxy, "kept", JsValue::Null).unwrap());
    assert!(!reflect::delete_property(&proxy, "kept").unwrap());
    assert!(recorder.is_empty());
}

#[test]
fn test_define_after_freeze_fails() {
    let proxy = ProxyFactory::create(&map_backed_handler(&store_with_value()), None)
        .unwrap()
        .to_value();
    ProxyFactory::freeze(&proxy).unwrap();
    let desc = object_with(&[("value", JsValue::Null)]);
    let err = ProxyFactory::define_property(&proxy, "fresh", &desc).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(!reflect::set(&proxy, "fresh", JsValue::Null).unwrap());
}

#[test]
fn test_delete_missing_after_lock_fails() {
    let proxy = ProxyFactory::create(&JsValue::object(), None).unwrap();
    proxy.set("x", JsValue::number(1.0)).unwrap();
    assert!(proxy.delete("never_existed").unwrap());

    proxy.freeze().unwrap();
    assert!(!proxy.delete("never_existed").unwrap());

    let value = proxy.to_value();
    let err = reflect::delete_property_strict(&value, "never_existed").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotConfigurableError);
    assert!(reflect::has(&value, "x").unwrap());
}

#[test]
fn test_delete_after_prevent_extensions() {
    let proxy = ProxyFactory::create(&JsValue::object(), None).unwrap();
    proxy.set("x", JsValue::number(1.0)).unwrap();
    proxy.prevent_extensions().unwrap();

    assert!(!proxy.delete("missing").unwrap());
    assert!(proxy.delete("x").unwrap());
    assert!(!proxy.has("x").unwrap());
}

#[test]
fn test_fix_returning_undefined_refuses() {
    let handler = object_with(&[("fix", func("fix", |_, _| Ok(JsValue::Undefined)))]);
    let proxy = ProxyFactory::create(&handler, None).unwrap().to_value();
    let err = ProxyFactory::seal(&proxy).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "Cannot lock object");
    assert!(ProxyFactory::is_trapping(&proxy).unwrap());
    assert!(ProxyFactory::is_extensible(&proxy).unwrap());
}

#[test]
fn test_lock_without_fix_snapshots_through_traps() {
    let store = store_with_value();
    let handler = map_backed_handler(&store);
    // Drop fix so the proxy has to snapshot itself.
    reflect::delete_property(&handler, "fix").unwrap();

    let recorder = TrapRecorder::new();
    let proxy = ProxyFactory::create(&handler, None).unwrap();
    proxy.observe(recorder.clone());
    let proxy = proxy.to_value();

    ProxyFactory::prevent_extensions(&proxy).unwrap();
    assert_eq!(
        recorder.traps(),
        vec![Trap::GetOwnPropertyNames, Trap::GetOwnPropertyDescriptor]
    );
    assert!(!ProxyFactory::is_extensible(&proxy).unwrap());
    assert!(!ProxyFactory::is_sealed(&proxy).unwrap());
    assert_eq!(reflect::get(&proxy, "kept").unwrap(), JsValue::string("kept"));
}

#[test]
fn test_seal_allows_writes_to_existing() {
    let proxy = ProxyFactory::create(&map_backed_handler(&store_with_value()), None)
        .unwrap()
        .to_value();
    ProxyFactory::seal(&proxy).unwrap();
    assert!(ProxyFactory::is_sealed(&proxy).unwrap());
    assert!(!ProxyFactory::is_frozen(&proxy).unwrap());
    assert!(reflect::set(&proxy, "kept", JsValue::string("changed")).unwrap());
    assert_eq!(reflect::get(&proxy, "kept").unwrap(), JsValue::string("changed"));
    assert!(!reflect::delete_property(&proxy, "kept").unwrap());
}

#[test]
fn test_repeat_lock_does_not_call_fix() {
    let recorder = TrapRecorder::new();
    let proxy = ProxyFactory::create(&map_backed_handler(&store_with_value()), None).unwrap();
    proxy.observe(recorder.clone());
    let proxy = proxy.to_value();

    ProxyFactory::freeze(&proxy).unwrap();
    ProxyFactory::freeze(&proxy).unwrap();
    ProxyFactory::seal(&proxy).unwrap();
    ProxyFactory::prevent_extensions(&proxy).unwrap();
    assert_eq!(recorder.count(Trap::Fix), 1);
}

#[test]
fn test_locked_proxy_keeps_prototype() {
    let proto = object_with(&[("inherited", JsValue::number(1.0))]);
    let proxy = ProxyFactory::create(&JsValue::object(), Some(&proto))
        .unwrap()
        .to_value();
    ProxyFactory::freeze(&proxy).unwrap();
    assert_eq!(reflect::get(&proxy, "inherited").unwrap(), JsValue::number(1.0));
}
