//! Value representation for the object model
//!
//! Primitive values are stored inline; objects, arrays, functions and proxies
//! are reference types shared through `Rc` and compared by identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::descriptor::PropertyDescriptor;
use crate::object::JsObject;
use crate::proxy::ProxyObject;
use core_types::JsResult;

/// Invocation context passed to every native function.
///
/// `this` is the receiver of the call. `constructing` is set when the
/// function runs as part of a `new`-style construction, in which case
/// `this` is the freshly allocated instance.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// The receiver
    pub this: JsValue,
    /// Whether this invocation is a construction
    pub constructing: bool,
}

impl CallContext {
    /// Context for a plain invocation
    pub fn call(this: JsValue) -> Self {
        CallContext {
            this,
            constructing: false,
        }
    }

    /// Context for a construction with the given instance as receiver
    pub fn construct(instance: JsValue) -> Self {
        CallContext {
            this: instance,
            constructing: true,
        }
    }
}

/// Signature of a native function body
pub type NativeFn = dyn Fn(&CallContext, &[JsValue]) -> JsResult<JsValue>;

struct FunctionData {
    name: String,
    func: Box<NativeFn>,
    /// Own properties of the function object (e.g. `prototype`)
    object: JsObject,
}

/// A callable function object
#[derive(Clone)]
pub struct JsFunction {
    data: Rc<FunctionData>,
}

impl JsFunction {
    /// Create a function without a `prototype` property
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallContext, &[JsValue]) -> JsResult<JsValue> + 'static,
    {
        JsFunction {
            data: Rc::new(FunctionData {
                name: name.into(),
                func: Box::new(func),
                object: JsObject::new(),
            }),
        }
    }

    /// Create a constructor function whose `prototype` property holds a fresh object
    pub fn constructor<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallContext, &[JsValue]) -> JsResult<JsValue> + 'static,
    {
        let function = JsFunction::new(name, func);
        let prototype = PropertyDescriptor::data(JsValue::object())
            .enumerable(false)
            .configurable(false);
        function.data.object.insert_unchecked("prototype", prototype);
        function
    }

    /// The function's name
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Storage for the function's own properties
    pub fn object(&self) -> &JsObject {
        &self.data.object
    }

    /// Run the function body
    pub fn call(&self, ctx: &CallContext, args: &[JsValue]) -> JsResult<JsValue> {
        (self.data.func)(ctx, args)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsFunction) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsFunction({})", self.data.name)
    }
}

/// Largest length an array's element storage may grow to
pub const MAX_DENSE_LENGTH: usize = 1 << 24;

/// A dense array of values
#[derive(Clone, Default)]
pub struct JsArray {
    elements: Rc<RefCell<Vec<JsValue>>>,
}

impl JsArray {
    /// Create an empty array
    pub fn new() -> Self {
        JsArray::default()
    }

    /// Create an array holding the given values
    pub fn from_vec(values: Vec<JsValue>) -> Self {
        JsArray {
            elements: Rc::new(RefCell::new(values)),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Element at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<JsValue> {
        self.elements.borrow().get(index).cloned()
    }

    /// Store `value` at `index`, growing the array with `undefined` as needed.
    ///
    /// Returns `false` without writing when `index` is at or past
    /// [`MAX_DENSE_LENGTH`].
    pub fn set(&self, index: usize, value: JsValue) -> bool {
        if index >= MAX_DENSE_LENGTH {
            return false;
        }
        let mut elements = self.elements.borrow_mut();
        if index >= elements.len() {
            elements.resize(index + 1, JsValue::Undefined);
        }
        elements[index] = value;
        true
    }

    /// Truncate or extend to `len` elements. Refuses lengths past
    /// [`MAX_DENSE_LENGTH`].
    pub fn set_len(&self, len: usize) -> bool {
        if len > MAX_DENSE_LENGTH {
            return false;
        }
        self.elements.borrow_mut().resize(len, JsValue::Undefined);
        true
    }

    /// Append a value
    pub fn push(&self, value: JsValue) {
        self.elements.borrow_mut().push(value);
    }

    /// Copy of the elements
    pub fn to_vec(&self) -> Vec<JsValue> {
        self.elements.borrow().clone()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsArray) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }
}

impl fmt::Debug for JsArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsArray(len={})", self.len())
    }
}

/// A value in the object model
#[derive(Clone)]
pub enum JsValue {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String value
    String(String),
    /// Ordinary object
    Object(JsObject),
    /// Array
    Array(JsArray),
    /// Function object
    Function(JsFunction),
    /// Proxy object, callable or not
    Proxy(ProxyObject),
}

impl JsValue {
    /// Create undefined value
    pub fn undefined() -> Self {
        JsValue::Undefined
    }

    /// Create null value
    pub fn null() -> Self {
        JsValue::Null
    }

    /// Create boolean value
    pub fn boolean(v: bool) -> Self {
        JsValue::Boolean(v)
    }

    /// Create number value
    pub fn number(v: f64) -> Self {
        JsValue::Number(v)
    }

    /// Create string value
    pub fn string(s: impl Into<String>) -> Self {
        JsValue::String(s.into())
    }

    /// Create empty object without a prototype
    pub fn object() -> Self {
        JsValue::Object(JsObject::new())
    }

    /// Create empty object inheriting from `proto`
    pub fn object_with_proto(proto: &JsValue) -> Self {
        JsValue::Object(JsObject::with_prototype(Some(proto.clone())))
    }

    /// Create array from values
    pub fn array_from(values: Vec<JsValue>) -> Self {
        JsValue::Array(JsArray::from_vec(values))
    }

    /// Create array of strings
    pub fn string_array<S: AsRef<str>>(names: &[S]) -> Self {
        JsValue::array_from(
            names
                .iter()
                .map(|name| JsValue::string(name.as_ref()))
                .collect(),
        )
    }

    /// Create a function value
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallContext, &[JsValue]) -> JsResult<JsValue> + 'static,
    {
        JsValue::Function(JsFunction::new(name, func))
    }

    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    /// Check if value is undefined or null
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    /// Check if value is an ordinary object
    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, JsValue::Array(_))
    }

    /// Check if value is a function
    pub fn is_function(&self) -> bool {
        matches!(self, JsValue::Function(_))
    }

    /// Check if value is a proxy
    pub fn is_proxy(&self) -> bool {
        matches!(self, JsValue::Proxy(_))
    }

    /// Reference types: everything that can hold properties
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            JsValue::Object(_) | JsValue::Array(_) | JsValue::Function(_) | JsValue::Proxy(_)
        )
    }

    /// Functions and callable proxies
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Function(_) => true,
            JsValue::Proxy(proxy) => proxy.is_callable(),
            _ => false,
        }
    }

    /// Get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            JsValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as ordinary object
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&JsArray> {
        match self {
            JsValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as function
    pub fn as_function(&self) -> Option<&JsFunction> {
        match self {
            JsValue::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Get as proxy
    pub fn as_proxy(&self) -> Option<&ProxyObject> {
        match self {
            JsValue::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    /// ToBoolean
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Convert to string representation
    pub fn to_js_string(&self) -> String {
        match self {
            JsValue::Undefined => "undefined".to_string(),
            JsValue::Null => "null".to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::Number(n) => number_to_string(*n),
            JsValue::String(s) => s.clone(),
            JsValue::Object(_) => "[object Object]".to_string(),
            JsValue::Array(arr) => arr
                .to_vec()
                .iter()
                .map(|e| match e {
                    JsValue::Undefined | JsValue::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            JsValue::Function(func) => format!("function {}() {{ [native code] }}", func.name()),
            JsValue::Proxy(proxy) if proxy.is_callable() => {
                "function () { [native code] }".to_string()
            }
            JsValue::Proxy(_) => "[object Object]".to_string(),
        }
    }

    /// Property key for this value (integer keys become their decimal string)
    pub fn to_property_key(&self) -> String {
        self.to_js_string()
    }

    /// The type of the value as `typeof` would report it
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(_) | JsValue::Array(_) => "object",
            JsValue::Function(_) => "function",
            JsValue::Proxy(proxy) if proxy.is_callable() => "function",
            JsValue::Proxy(_) => "object",
        }
    }

    /// Identity of reference types; primitives never share a reference
    pub fn same_reference(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Object(a), JsValue::Object(b)) => a.ptr_eq(b),
            (JsValue::Array(a), JsValue::Array(b)) => a.ptr_eq(b),
            (JsValue::Function(a), JsValue::Function(b)) => a.ptr_eq(b),
            (JsValue::Proxy(a), JsValue::Proxy(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Strict equality (`===`)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            _ => self.same_reference(other),
        }
    }

    /// SameValue: like strict equality but NaN equals NaN and +0 differs from -0
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            _ => self.strict_equals(other),
        }
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => f.write_str("Undefined"),
            JsValue::Null => f.write_str("Null"),
            JsValue::Boolean(b) => write!(f, "Boolean({})", b),
            JsValue::Number(n) => write!(f, "Number({})", n),
            JsValue::String(s) => write!(f, "String({:?})", s),
            JsValue::Object(obj) => write!(f, "{:?}", obj),
            JsValue::Array(arr) => write!(f, "{:?}", arr),
            JsValue::Function(func) => write!(f, "{:?}", func),
            JsValue::Proxy(proxy) => write!(f, "{:?}", proxy),
        }
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl Default for JsValue {
    fn default() -> Self {
        JsValue::Undefined
    }
}

impl From<bool> for JsValue {
    fn from(v: bool) -> Self {
        JsValue::Boolean(v)
    }
}

impl From<f64> for JsValue {
    fn from(v: f64) -> Self {
        JsValue::Number(v)
    }
}

impl From<&str> for JsValue {
    fn from(v: &str) -> Self {
        JsValue::String(v.to_string())
    }
}

impl From<String> for JsValue {
    fn from(v: String) -> Self {
        JsValue::String(v)
    }
}

impl From<JsObject> for JsValue {
    fn from(v: JsObject) -> Self {
        JsValue::Object(v)
    }
}

impl From<JsArray> for JsValue {
    fn from(v: JsArray) -> Self {
        JsValue::Array(v)
    }
}

impl From<JsFunction> for JsValue {
    fn from(v: JsFunction) -> Self {
        JsValue::Function(v)
    }
}

impl From<ProxyObject> for JsValue {
    fn from(v: ProxyObject) -> Self {
        JsValue::Proxy(v)
    }
}
