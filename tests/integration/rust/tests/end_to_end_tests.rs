//! End-to-end proxy behaviour
//!
//! Drives proxies built from the CLI's backing-store handler through the
//! public `proxy_runtime` API:
//! - absent names and the set/get round trip
//! - listing idempotence and insertion order
//! - non-configurable protection
//! - batch definition and inheritance through a proxy prototype
//! - locking, and call versus construct

use core_types::{ErrorKind, Trap};
use proxy_cli::fixtures::{backing_store_handler, object_with};
use proxy_runtime::{
    reflect, JsFunction, JsObject, JsValue, ProxyFactory, TrapRecorder,
};

/// Proxy over a fresh backing store, plus the store and a recorder
fn backed() -> (JsValue, JsObject, TrapRecorder) {
    let store = JsObject::new();
    let proxy = ProxyFactory::create(&backing_store_handler(&store), None)
        .expect("handler is valid");
    let recorder = TrapRecorder::new();
    proxy.observe(recorder.clone());
    (proxy.to_value(), store, recorder)
}

fn getter(value: &'static str) -> JsValue {
    JsValue::function("get", move |_, _| Ok(JsValue::string(value)))
}

/// Test: names the handler does not know are absent
#[test]
fn test_e2e_absent_names() {
    let (proxy, _, _) = backed();
    let empty = ProxyFactory::create(&JsValue::object(), None)
        .unwrap()
        .to_value();

    for p in [&proxy, &empty] {
        for name in ["missing", "0", "length"] {
            assert!(!reflect::has(p, name).unwrap());
            assert!(reflect::get(p, name).unwrap().is_undefined());
        }
    }
}

/// Test: assigning an absent name creates an open data property
#[test]
fn test_e2e_set_get_round_trip() {
    let (proxy, _, _) = backed();
    let empty = ProxyFactory::create(&JsValue::object(), None)
        .unwrap()
        .to_value();

    for p in [&proxy, &empty] {
        assert!(reflect::set(p, "x", JsValue::number(7.0)).unwrap());
        assert_eq!(reflect::get(p, "x").unwrap(), JsValue::number(7.0));

        let desc = ProxyFactory::get_own_property_descriptor(p, "x").unwrap();
        assert!(reflect::get(&desc, "enumerable").unwrap().to_boolean());
        assert!(reflect::get(&desc, "configurable").unwrap().to_boolean());
    }
}

/// Test: listing twice without mutation gives the same order
#[test]
fn test_e2e_listing_is_idempotent() {
    let (proxy, _, _) = backed();
    for name in ["c", "a", "b"] {
        reflect::set(&proxy, name, JsValue::Null).unwrap();
    }

    let first = reflect::get_own_property_names(&proxy).unwrap();
    let second = reflect::get_own_property_names(&proxy).unwrap();
    assert_eq!(first, vec!["c", "a", "b"]);
    assert_eq!(first, second);
}

/// Test: a non-configurable property cannot be deleted
#[test]
fn test_e2e_non_configurable_protection() {
    let proxy = ProxyFactory::create(&JsValue::object(), None)
        .unwrap()
        .to_value();
    let desc = object_with(&[("value", JsValue::number(1.0))]);
    ProxyFactory::define_property(&proxy, "p", &desc).unwrap();

    assert!(!reflect::delete_property(&proxy, "p").unwrap());
    assert!(reflect::has(&proxy, "p").unwrap());

    let err = reflect::delete_property_strict(&proxy, "p").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotConfigurableError);
}

/// Test: the original script's trap sequence and enumeration
#[test]
fn test_e2e_trap_sequence() {
    let (proxy, store, recorder) = backed();
    store.put(
        "first",
        object_with(&[
            ("get", getter("firstProp")),
            ("configurable", JsValue::boolean(true)),
        ]),
    );

    assert!(reflect::has(&proxy, "first").unwrap());
    assert_eq!(reflect::get(&proxy, "first").unwrap(), JsValue::string("firstProp"));
    assert!(reflect::set(&proxy, "second", JsValue::string("secondProp")).unwrap());
    assert_eq!(recorder.traps(), vec![Trap::Has, Trap::Get, Trap::Set]);

    assert_eq!(reflect::keys(&proxy).unwrap(), vec!["first", "second"]);
    assert_eq!(reflect::for_in(&proxy).unwrap().len(), 2);
    assert_eq!(recorder.last_trap(), Some(Trap::Enumerate));
}

/// Test: batch definition lands in the backing store
#[test]
fn test_e2e_batch_define() {
    let (proxy, store, recorder) = backed();
    let accessor = |value| {
        object_with(&[
            ("get", getter(value)),
            ("configurable", JsValue::boolean(true)),
        ])
    };
    let batch = object_with(&[
        ("fourth", accessor("fourthProp")),
        ("fifth", accessor("fifthProp")),
    ]);

    ProxyFactory::define_properties(&proxy, &batch).unwrap();

    assert_eq!(recorder.count(Trap::DefineProperty), 2);
    assert_eq!(reflect::get(&proxy, "fourth").unwrap(), JsValue::string("fourthProp"));
    assert_eq!(reflect::get(&proxy, "fifth").unwrap(), JsValue::string("fifthProp"));
    assert!(store.has_own_property("fourth"));
    assert!(store.has_own_property("fifth"));
}

/// Test: a proxy used as a constructor's prototype
#[test]
fn test_e2e_proxy_as_prototype() {
    let base = JsValue::Function(JsFunction::constructor("BaseType", |_, _| {
        Ok(JsValue::Undefined)
    }));
    let base_proto = reflect::get(&base, "prototype").unwrap();
    let store = JsObject::new();
    let proxy = ProxyFactory::create(&backing_store_handler(&store), Some(&base_proto))
        .unwrap()
        .to_value();

    let sub = JsValue::Function(JsFunction::constructor("SubProxy", |_, _| {
        Ok(JsValue::Undefined)
    }));
    assert!(reflect::set(&sub, "prototype", proxy.clone()).unwrap());

    let instance = reflect::construct(&sub, &[]).unwrap();
    assert!(reflect::instance_of(&instance, &base).unwrap());
    assert!(reflect::instance_of(&instance, &sub).unwrap());

    reflect::set(&proxy, "shared", JsValue::number(3.0)).unwrap();
    assert_eq!(reflect::get(&instance, "shared").unwrap(), JsValue::number(3.0));
}

/// Test: freezing fixes the handler's view and stops trapping
#[test]
fn test_e2e_freeze() {
    let (proxy, _, recorder) = backed();
    reflect::set(&proxy, "kept", JsValue::string("v")).unwrap();

    assert!(ProxyFactory::freeze(&proxy).unwrap());
    assert!(ProxyFactory::is_frozen(&proxy).unwrap());
    assert!(!ProxyFactory::is_trapping(&proxy).unwrap());
    assert_eq!(recorder.last_trap(), Some(Trap::Fix));

    recorder.clear();
    assert_eq!(reflect::get(&proxy, "kept").unwrap(), JsValue::string("v"));
    assert!(!reflect::set(&proxy, "kept", JsValue::Null).unwrap());
    let desc = object_with(&[("value", JsValue::Null)]);
    let err = ProxyFactory::define_property(&proxy, "fresh", &desc).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(recorder.is_empty());
}

/// Test: the call trap sees whether it is constructing
#[test]
fn test_e2e_call_versus_construct() {
    let trap = JsValue::function("trap", |ctx, args| {
        let mode = if ctx.constructing { "construct" } else { "call" };
        Ok(object_with(&[
            ("mode", JsValue::string(mode)),
            ("argc", JsValue::number(args.len() as f64)),
        ]))
    });
    let callable = ProxyFactory::create_callable(&JsValue::object(), &trap, None).unwrap();
    let value = callable.to_value();

    let called = reflect::call(&value, &JsValue::Undefined, &[JsValue::Null]).unwrap();
    assert_eq!(reflect::get(&called, "mode").unwrap(), JsValue::string("call"));
    assert_eq!(reflect::get(&called, "argc").unwrap(), JsValue::number(1.0));

    let constructed = reflect::construct(&value, &[]).unwrap();
    assert_eq!(reflect::get(&constructed, "mode").unwrap(), JsValue::string("construct"));
}
