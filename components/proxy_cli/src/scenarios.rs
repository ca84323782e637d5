//! Bundled conformance scenarios
//!
//! Each scenario sets up a fixture (usually a proxy over a backing-store
//! handler) and runs numbered steps against it, collecting assertion
//! results instead of panicking.

use std::collections::HashMap;

use serde::Serialize;

use crate::fixtures::{backing_store_handler, object_with, open_descriptor};
use proxy_runtime::{
    reflect, ErrorKind, JsError, JsFunction, JsObject, JsResult, JsValue, ProxyFactory,
    ProxyObject, Trap, TrapRecorder,
};

/// Outcome of one assertion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionResult {
    /// What was asserted
    pub message: String,
    /// Whether it held
    pub passed: bool,
    /// Expected/actual values for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Collects assertion results for one step
#[derive(Debug, Default)]
pub struct Assertions {
    results: Vec<AssertionResult>,
}

impl Assertions {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, passed: bool, message: &str, detail: Option<String>) {
        if !passed {
            tracing::debug!(
                assertion = message,
                detail = detail.as_deref().unwrap_or(""),
                "assertion failed"
            );
        }
        self.results.push(AssertionResult {
            message: message.to_string(),
            passed,
            detail: if passed { None } else { detail },
        });
    }

    /// Assert a condition
    pub fn ok(&mut self, condition: bool, message: &str) {
        self.record(condition, message, None);
    }

    /// Assert strict equality of two values
    pub fn equal(&mut self, actual: &JsValue, expected: &JsValue, message: &str) {
        self.record(
            actual.strict_equals(expected),
            message,
            Some(format!("expected {}, got {}", expected, actual)),
        );
    }

    /// Assert an ordered name list
    pub fn names(&mut self, actual: &[String], expected: &[&str], message: &str) {
        self.record(
            actual.iter().map(String::as_str).eq(expected.iter().copied()),
            message,
            Some(format!("expected {:?}, got {:?}", expected, actual)),
        );
    }

    /// Assert that `trap` was the most recent trap
    pub fn last_trap(&mut self, recorder: &TrapRecorder, trap: Trap, message: &str) {
        let last = recorder.last_trap();
        self.record(
            last == Some(trap),
            message,
            Some(format!(
                "expected {}, got {}",
                trap,
                last.map_or("no trap".to_string(), |t| t.to_string())
            )),
        );
    }

    /// Assert that an operation failed with `kind`
    pub fn error_kind<T>(&mut self, result: JsResult<T>, kind: ErrorKind, message: &str) {
        let detail = match &result {
            Ok(_) => format!("expected {}, got success", kind),
            Err(e) => format!("expected {}, got {}", kind, e),
        };
        self.record(matches!(&result, Err(e) if e.kind == kind), message, Some(detail));
    }

    /// Record an error that aborted the step
    pub fn aborted(&mut self, error: &JsError) {
        self.record(false, "step completed", Some(error.to_string()));
    }

    /// Results so far
    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    /// Number of failed assertions
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Take the results, leaving the collector empty
    pub fn take(&mut self) -> Vec<AssertionResult> {
        std::mem::take(&mut self.results)
    }
}

/// State shared by the steps of a scenario
pub struct Fixture {
    /// The proxy under test
    pub proxy: JsValue,
    /// The handler's backing store
    pub store: JsObject,
    /// Observer attached to the proxy
    pub recorder: TrapRecorder,
    values: HashMap<&'static str, JsValue>,
}

impl Fixture {
    /// Fixture over `proxy`, attaching a fresh recorder
    pub fn new(proxy: &ProxyObject, store: JsObject) -> Self {
        let recorder = TrapRecorder::new();
        proxy.observe(recorder.clone());
        Fixture {
            proxy: proxy.to_value(),
            store,
            recorder,
            values: HashMap::new(),
        }
    }

    /// Keep an auxiliary value for later steps
    pub fn remember(&mut self, key: &'static str, value: JsValue) {
        self.values.insert(key, value);
    }

    /// Auxiliary value stored by setup
    pub fn value(&self, key: &str) -> JsResult<JsValue> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| JsError::internal(format!("fixture has no value named {}", key)))
    }
}

/// Body of one step
pub type StepFn = fn(&mut Fixture, &mut Assertions) -> JsResult<()>;

/// One numbered step
pub struct Step {
    /// Printed as `Test i of n: description`
    pub description: &'static str,
    /// Step body
    pub run: StepFn,
}

/// A named sequence of steps over one fixture
pub struct Scenario {
    /// Name used by `--scenario`
    pub name: &'static str,
    /// One-line summary for `list`
    pub summary: &'static str,
    /// Builds the fixture
    pub setup: fn() -> JsResult<Fixture>,
    /// Steps in order
    pub steps: &'static [Step],
}

/// Every bundled scenario
pub fn catalogue() -> &'static [Scenario] {
    SCENARIOS
}

/// Scenario by name
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "trap-log",
        summary: "Handler-object traps run in order: has, get, set, enumerate, names, keys",
        setup: trap_log::setup,
        steps: &[
            Step { description: "Creating proxy", run: trap_log::create },
            Step { description: "has", run: trap_log::has },
            Step { description: "Accessing getter", run: trap_log::read_accessor },
            Step { description: "Accessing setter", run: trap_log::write_accessor },
            Step { description: "set property", run: trap_log::set_new },
            Step { description: "Iterate property names", run: trap_log::iterate },
            Step { description: "getOwnPropertyNames", run: trap_log::own_names },
            Step { description: "keys", run: trap_log::keys },
        ],
    },
    Scenario {
        name: "inheritance",
        summary: "Proxies as prototypes: instanceof, inherited reads and writes",
        setup: inheritance::setup,
        steps: &[
            Step { description: "Inheritance by explicit setting", run: inheritance::explicit },
            Step { description: "Inheritance by prototype", run: inheritance::by_prototype },
            Step { description: "Set value on Proxy", run: inheritance::set_on_proxy },
            Step { description: "Get value on Proxy instance", run: inheritance::get_on_instance },
        ],
    },
    Scenario {
        name: "descriptors",
        summary: "Batch definition, non-configurable protection, descriptor validation",
        setup: descriptors::setup,
        steps: &[
            Step { description: "Batch define", run: descriptors::batch },
            Step { description: "Non-configurable property", run: descriptors::non_configurable },
            Step { description: "Redefinition", run: descriptors::redefinition },
            Step { description: "Descriptor normalisation", run: descriptors::mixed },
        ],
    },
    Scenario {
        name: "locking",
        summary: "freeze through fix, frozen semantics, refused locks",
        setup: locking::setup,
        steps: &[
            Step { description: "Freeze", run: locking::freeze },
            Step { description: "Frozen reads", run: locking::frozen_reads },
            Step { description: "Frozen writes", run: locking::frozen_writes },
            Step { description: "Fix refusal", run: locking::fix_refusal },
        ],
    },
    Scenario {
        name: "callable",
        summary: "Call and construct traps, default instances, instanceof",
        setup: callable::setup,
        steps: &[
            Step { description: "Call", run: callable::call },
            Step { description: "Construct", run: callable::construct },
            Step { description: "Construct trap", run: callable::construct_trap },
            Step { description: "instanceof", run: callable::instance_of },
        ],
    },
];

fn getter(value: &'static str) -> JsValue {
    JsValue::function("get", move |_, _| Ok(JsValue::string(value)))
}

fn backed_proxy(store: &JsObject, prototype: Option<&JsValue>) -> JsResult<ProxyObject> {
    ProxyFactory::create(&backing_store_handler(store), prototype)
}

mod trap_log {
    use super::*;

    pub fn setup() -> JsResult<Fixture> {
        let store = JsObject::new();
        let setter = JsValue::function("set", |_, _| Ok(JsValue::Undefined));
        store.put(
            "first",
            object_with(&[("get", getter("firstProp")), ("set", setter)]),
        );
        let proxy = backed_proxy(&store, None)?;
        Ok(Fixture::new(&proxy, store))
    }

    pub fn create(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        a.ok(ProxyFactory::is_trapping(&f.proxy)?, "the proxy is trapping");
        a.ok(f.recorder.is_empty(), "creating the proxy runs no trap");
        Ok(())
    }

    pub fn has(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        a.ok(reflect::has(&f.proxy, "first")?, "first in proxy");
        a.last_trap(&f.recorder, Trap::Has, "has was called");
        Ok(())
    }

    pub fn read_accessor(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let value = reflect::get(&f.proxy, "first")?;
        a.equal(&value, &JsValue::string("firstProp"), "proxy.first is the getter result");
        a.last_trap(&f.recorder, Trap::Get, "get was called");
        Ok(())
    }

    pub fn write_accessor(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        reflect::set(&f.proxy, "first", JsValue::string("changed"))?;
        a.last_trap(&f.recorder, Trap::Set, "set was called");
        let value = reflect::get(&f.proxy, "first")?;
        a.equal(&value, &JsValue::string("firstProp"), "proxy.first == firstValue");
        Ok(())
    }

    pub fn set_new(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let written = reflect::set(&f.proxy, "second", JsValue::string("secondProp"))?;
        a.ok(written, "the new property was accepted");
        a.last_trap(&f.recorder, Trap::Set, "set new property");
        Ok(())
    }

    pub fn iterate(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let count = reflect::for_in(&f.proxy)?.len();
        a.ok(count == 2, "there are 2 properties on the proxy");
        a.last_trap(&f.recorder, Trap::Enumerate, "for..in invokes enumerate");
        Ok(())
    }

    pub fn own_names(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let names = reflect::get_own_property_names(&f.proxy)?;
        a.last_trap(
            &f.recorder,
            Trap::GetOwnPropertyNames,
            "getOwnPropertyNames was called",
        );
        a.names(&names, &["first", "second"], "both names in insertion order");
        Ok(())
    }

    pub fn keys(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let names = reflect::keys(&f.proxy)?;
        a.last_trap(&f.recorder, Trap::Keys, "keys was called");
        a.names(&names, &["first", "second"], "both keys in insertion order");
        Ok(())
    }
}

mod inheritance {
    use super::*;

    pub fn setup() -> JsResult<Fixture> {
        let base = JsValue::Function(JsFunction::constructor("BaseType", |_, _| {
            Ok(JsValue::Undefined)
        }));
        let proto = reflect::get(&base, "prototype")?;
        let store = JsObject::new();
        let proxy = backed_proxy(&store, Some(&proto))?;

        let sub = JsValue::Function(JsFunction::constructor("SubProxy", |_, _| {
            Ok(JsValue::Undefined)
        }));
        reflect::set(&sub, "prototype", proxy.to_value())?;

        let mut fixture = Fixture::new(&proxy, store);
        fixture.remember("BaseType", base);
        fixture.remember("SubProxy", sub);
        Ok(fixture)
    }

    pub fn explicit(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let base = f.value("BaseType")?;
        a.ok(reflect::instance_of(&f.proxy, &base)?, "proxy instanceof BaseType");
        Ok(())
    }

    pub fn by_prototype(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let instance = reflect::construct(&f.value("SubProxy")?, &[])?;
        a.ok(
            reflect::instance_of(&instance, &f.value("BaseType")?)?,
            "new SubProxy() instanceof BaseType",
        );
        Ok(())
    }

    pub fn set_on_proxy(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let prototype = reflect::get(&f.value("SubProxy")?, "prototype")?;
        let written = reflect::set(&prototype, "second", JsValue::string("great"))?;
        a.ok(written, "SubProxy.prototype.second = \"great\"");
        a.ok(f.store.has_own_property("second"), "the value reached the backing store");
        Ok(())
    }

    pub fn get_on_instance(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let instance = reflect::construct(&f.value("SubProxy")?, &[])?;
        let value = reflect::get(&instance, "second")?;
        a.equal(&value, &JsValue::string("great"), "new SubProxy().second");
        a.ok(
            !reflect::has_own_property(&instance, "second")?,
            "the value is inherited, not own",
        );
        Ok(())
    }
}

mod descriptors {
    use super::*;

    pub fn setup() -> JsResult<Fixture> {
        let store = JsObject::new();
        store.put("first", object_with(&[("get", getter("firstProp"))]));
        let proxy = backed_proxy(&store, None)?;
        let mut fixture = Fixture::new(&proxy, store);
        let plain = ProxyFactory::create(&JsValue::object(), None)?;
        fixture.remember("plain", plain.to_value());
        Ok(fixture)
    }

    pub fn batch(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let batch = object_with(&[
            (
                "fourth",
                object_with(&[
                    ("get", getter("fourthProp")),
                    ("enumerable", JsValue::boolean(true)),
                    ("configurable", JsValue::boolean(true)),
                ]),
            ),
            (
                "fifth",
                object_with(&[
                    ("get", getter("fifthProp")),
                    ("configurable", JsValue::boolean(true)),
                ]),
            ),
        ]);
        ProxyFactory::define_properties(&f.proxy, &batch)?;
        a.last_trap(&f.recorder, Trap::DefineProperty, "defineProperty was called");
        let fourth = reflect::get(&f.proxy, "fourth")?;
        a.equal(&fourth, &JsValue::string("fourthProp"), "fourth getter");
        let fifth = reflect::get(&f.proxy, "fifth")?;
        a.equal(&fifth, &JsValue::string("fifthProp"), "fifth getter");
        a.ok(
            f.store.has_own_property("fourth") && f.store.has_own_property("fifth"),
            "both names are in the backing store",
        );
        Ok(())
    }

    pub fn non_configurable(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let plain = f.value("plain")?;
        let desc = object_with(&[("value", JsValue::number(1.0))]);
        ProxyFactory::define_property(&plain, "p", &desc)?;
        a.ok(!reflect::delete_property(&plain, "p")?, "delete proxy.p is refused");
        a.ok(reflect::has(&plain, "p")?, "p is still in the proxy");
        Ok(())
    }

    pub fn redefinition(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let plain = f.value("plain")?;
        let same = object_with(&[("value", JsValue::number(1.0))]);
        a.ok(
            ProxyFactory::define_property(&plain, "p", &same)?,
            "an identical redefinition succeeds",
        );
        let other = object_with(&[("value", JsValue::number(2.0))]);
        a.error_kind(
            ProxyFactory::define_property(&plain, "p", &other),
            ErrorKind::NotConfigurableError,
            "a different redefinition fails",
        );
        Ok(())
    }

    pub fn mixed(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let plain = f.value("plain")?;
        let desc = object_with(&[
            ("value", JsValue::number(1.0)),
            ("get", getter("never")),
        ]);
        a.error_kind(
            ProxyFactory::define_property(&plain, "mixed", &desc),
            ErrorKind::TypeError,
            "accessor and data fields together are rejected",
        );
        Ok(())
    }
}

mod locking {
    use super::*;

    pub fn setup() -> JsResult<Fixture> {
        let store = JsObject::new();
        store.put("kept", open_descriptor(JsValue::string("kept")));
        let proxy = backed_proxy(&store, None)?;
        Ok(Fixture::new(&proxy, store))
    }

    pub fn freeze(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        a.ok(ProxyFactory::freeze(&f.proxy)?, "freeze succeeds");
        a.last_trap(&f.recorder, Trap::Fix, "fix was called");
        a.ok(ProxyFactory::is_frozen(&f.proxy)?, "the proxy is frozen");
        a.ok(!ProxyFactory::is_trapping(&f.proxy)?, "the proxy no longer traps");
        Ok(())
    }

    pub fn frozen_reads(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        f.recorder.clear();
        let value = reflect::get(&f.proxy, "kept")?;
        a.equal(&value, &JsValue::string("kept"), "the fixed property is readable");
        a.ok(f.recorder.is_empty(), "no trap runs after freezing");
        Ok(())
    }

    pub fn frozen_writes(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        a.ok(
            !reflect::set(&f.proxy, "kept", JsValue::Null)?,
            "writes to a frozen property are refused",
        );
        let desc = object_with(&[("value", JsValue::Null)]);
        a.error_kind(
            ProxyFactory::define_property(&f.proxy, "fresh", &desc),
            ErrorKind::TypeError,
            "defining a new name fails",
        );
        Ok(())
    }

    pub fn fix_refusal(_f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let handler = object_with(&[(
            "fix",
            JsValue::function("fix", |_, _| Ok(JsValue::Undefined)),
        )]);
        let proxy = ProxyFactory::create(&handler, None)?.to_value();
        a.error_kind(
            ProxyFactory::seal(&proxy),
            ErrorKind::TypeError,
            "fix returning undefined refuses the lock",
        );
        a.ok(ProxyFactory::is_trapping(&proxy)?, "the proxy keeps trapping");
        Ok(())
    }
}

mod callable {
    use super::*;

    pub fn setup() -> JsResult<Fixture> {
        let store = JsObject::new();
        let trap = JsValue::function("trap", |ctx, _| {
            if ctx.constructing {
                reflect::set(&ctx.this, "mode", JsValue::string("construct"))?;
                Ok(JsValue::Undefined)
            } else {
                Ok(JsValue::string("call"))
            }
        });
        let callable =
            ProxyFactory::create_callable(&backing_store_handler(&store), &trap, None)?;
        Ok(Fixture::new(&callable, store))
    }

    pub fn call(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let result = reflect::call(&f.proxy, &JsValue::Undefined, &[])?;
        a.equal(&result, &JsValue::string("call"), "the call trap sees a plain call");
        a.last_trap(&f.recorder, Trap::Call, "callTrap was called");
        Ok(())
    }

    pub fn construct(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let instance = reflect::construct(&f.proxy, &[])?;
        a.ok(instance.is_proxy(), "the default instance is a proxy");
        a.ok(
            f.recorder.traps().contains(&Trap::Construct),
            "construction was observed",
        );
        let mode = reflect::get(&instance, "mode")?;
        a.equal(&mode, &JsValue::string("construct"), "the call trap sees construction");
        Ok(())
    }

    pub fn construct_trap(_f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let replacement = JsValue::object();
        let returned = replacement.clone();
        let construct = JsValue::function("construct", move |_, _| Ok(returned.clone()));
        let call = JsValue::function("call", |_, _| Ok(JsValue::Undefined));
        let callable = ProxyFactory::create_callable(&JsValue::object(), &call, Some(&construct))?;
        let result = callable.construct(&[])?;
        a.ok(
            result.same_reference(&replacement),
            "an object returned by the construct trap replaces the instance",
        );
        Ok(())
    }

    pub fn instance_of(f: &mut Fixture, a: &mut Assertions) -> JsResult<()> {
        let proto = JsValue::object();
        reflect::set(&f.proxy, "prototype", proto.clone())?;
        let instance = reflect::construct(&f.proxy, &[])?;
        let inherits = reflect::get_prototype_of(&instance)?.same_reference(&proto);
        a.ok(inherits, "the instance inherits from the prototype property");
        a.ok(
            reflect::instance_of(&instance, &f.proxy)?,
            "instance instanceof the callable proxy",
        );
        Ok(())
    }
}
