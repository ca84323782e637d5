//! Handlers implemented in Rust

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use proxy_runtime::{
    reflect, DescriptorMap, JsResult, JsValue, PropertyDescriptor, ProxyFactory, ProxyHandler,
    Trap, TrapRecorder,
};

/// Read-mostly handler over a sorted map; refuses deletes.
#[derive(Default)]
struct SortedMapHandler {
    entries: RefCell<BTreeMap<String, JsValue>>,
}

impl ProxyHandler for SortedMapHandler {
    fn get_own_property_descriptor(
        &self,
        _receiver: &JsValue,
        name: &str,
    ) -> Option<JsResult<Option<PropertyDescriptor>>> {
        let desc = self
            .entries
            .borrow()
            .get(name)
            .map(|v| PropertyDescriptor::data(v.clone()));
        Some(Ok(desc))
    }

    fn get_own_property_names(&self, _receiver: &JsValue) -> Option<JsResult<Vec<String>>> {
        Some(Ok(self.entries.borrow().keys().cloned().collect()))
    }

    fn get(&self, _receiver: &JsValue, name: &str) -> Option<JsResult<JsValue>> {
        Some(Ok(self
            .entries
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()))
    }

    fn set(&self, _receiver: &JsValue, name: &str, value: &JsValue) -> Option<JsResult<bool>> {
        self.entries
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Some(Ok(true))
    }

    fn delete(&self, _receiver: &JsValue, _name: &str) -> Option<JsResult<bool>> {
        Some(Ok(false))
    }

    fn fix(&self, _receiver: &JsValue) -> Option<JsResult<Option<DescriptorMap>>> {
        let map = self
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), PropertyDescriptor::data(v.clone())))
            .collect();
        Some(Ok(Some(map)))
    }
}

fn sorted_proxy() -> (Rc<SortedMapHandler>, JsValue) {
    let handler = Rc::new(SortedMapHandler::default());
    let proxy = ProxyFactory::create_with_handler(handler.clone(), None)
        .unwrap()
        .to_value();
    (handler, proxy)
}

#[test]
fn test_native_handler_orders_names() {
    let (handler, proxy) = sorted_proxy();
    reflect::set(&proxy, "zeta", JsValue::number(1.0)).unwrap();
    reflect::set(&proxy, "alpha", JsValue::number(2.0)).unwrap();

    assert_eq!(handler.entries.borrow().len(), 2);
    assert_eq!(reflect::keys(&proxy).unwrap(), vec!["alpha", "zeta"]);
    assert_eq!(reflect::for_in(&proxy).unwrap(), vec!["alpha", "zeta"]);
}

#[test]
fn test_native_handler_partial_traps_fall_back() {
    let (_, proxy) = sorted_proxy();
    reflect::set(&proxy, "k", JsValue::string("v")).unwrap();

    // has/hasOwn are not implemented: answered through getOwnPropertyDescriptor
    assert!(reflect::has(&proxy, "k").unwrap());
    assert!(reflect::has_own_property(&proxy, "k").unwrap());
    assert!(!reflect::has(&proxy, "missing").unwrap());
    assert!(!reflect::delete_property(&proxy, "k").unwrap());
}

#[test]
fn test_native_handler_fix() {
    let (_, proxy) = sorted_proxy();
    reflect::set(&proxy, "k", JsValue::string("v")).unwrap();
    ProxyFactory::freeze(&proxy).unwrap();
    assert!(!ProxyFactory::is_trapping(&proxy).unwrap());
    assert_eq!(reflect::get(&proxy, "k").unwrap(), JsValue::string("v"));
}

#[test]
fn test_observer_closure() {
    let (_, proxy) = sorted_proxy();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    proxy
        .as_proxy()
        .unwrap()
        .observe(move |event: &proxy_runtime::TrapEvent| sink.borrow_mut().push(event.trap));

    reflect::get(&proxy, "x").unwrap();
    reflect::has(&proxy, "x").unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![Trap::Get, Trap::GetOwnPropertyDescriptor]
    );
}

#[test]
fn test_recorder_names() {
    let (_, proxy) = sorted_proxy();
    let recorder = TrapRecorder::new();
    proxy.as_proxy().unwrap().observe(recorder.clone());
    reflect::set(&proxy, "named", JsValue::Null).unwrap();
    let event = recorder.last().unwrap();
    assert_eq!(event.trap, Trap::Set);
    assert_eq!(event.name.as_deref(), Some("named"));
}
