//! Property descriptors

use indexmap::IndexMap;

use crate::object::JsObject;
use crate::reflect;
use crate::value::JsValue;
use core_types::{JsError, JsResult};

/// Ordered map of property name to descriptor
pub type DescriptorMap = IndexMap<String, PropertyDescriptor>;

/// Property descriptor
///
/// Either a data descriptor (`value`, `writable`) or an accessor descriptor
/// (`get`, `set`). A descriptor that mixes the two forms is rejected by
/// [`PropertyDescriptor::validate`].
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    /// Value (data descriptor)
    pub value: Option<JsValue>,
    /// Getter (accessor descriptor)
    pub get: Option<JsValue>,
    /// Setter (accessor descriptor)
    pub set: Option<JsValue>,
    /// Writable flag
    pub writable: bool,
    /// Enumerable flag
    pub enumerable: bool,
    /// Configurable flag
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Writable, enumerable and configurable data descriptor
    pub fn data(value: JsValue) -> Self {
        PropertyDescriptor {
            value: Some(value),
            get: None,
            set: None,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Enumerable and configurable accessor descriptor
    pub fn accessor(get: Option<JsValue>, set: Option<JsValue>) -> Self {
        PropertyDescriptor {
            value: None,
            get,
            set,
            writable: false,
            enumerable: true,
            configurable: true,
        }
    }

    /// Set the writable flag
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Set the enumerable flag
    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Set the configurable flag
    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    /// Has a getter or setter
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Has a value or is writable
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable
    }

    /// Reject mixed descriptors and non-callable accessors
    pub fn validate(&self) -> JsResult<()> {
        if self.is_accessor_descriptor() && self.is_data_descriptor() {
            return Err(JsError::type_error(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        for (field, accessor) in [("get", &self.get), ("set", &self.set)] {
            if let Some(f) = accessor {
                if !f.is_callable() {
                    return Err(JsError::type_error(format!(
                        "{} must be a function: {}",
                        field,
                        f.to_js_string()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Normalise an object-form descriptor.
    ///
    /// Fields are read with ordinary property access, so inherited fields
    /// and proxy descriptors work. Missing flags are `false`; an undefined
    /// `get` or `set` counts as absent.
    pub fn from_value(value: &JsValue) -> JsResult<Self> {
        if !value.is_object_like() {
            return Err(JsError::type_error(format!(
                "Property description must be an object: {}",
                value.to_js_string()
            )));
        }

        let flag = |name: &str| -> JsResult<bool> {
            if reflect::has(value, name)? {
                Ok(reflect::get(value, name)?.to_boolean())
            } else {
                Ok(false)
            }
        };
        let field = |name: &str| -> JsResult<Option<JsValue>> {
            if reflect::has(value, name)? {
                Ok(Some(reflect::get(value, name)?))
            } else {
                Ok(None)
            }
        };

        let desc = PropertyDescriptor {
            enumerable: flag("enumerable")?,
            configurable: flag("configurable")?,
            value: field("value")?,
            writable: flag("writable")?,
            get: field("get")?.filter(|f| !f.is_undefined()),
            set: field("set")?.filter(|f| !f.is_undefined()),
        };
        desc.validate()?;
        Ok(desc)
    }

    /// Object form of the descriptor, as handed to `defineProperty` traps
    pub fn to_value(&self) -> JsValue {
        let obj = JsObject::new();
        if self.is_accessor_descriptor() {
            obj.put("get", self.get.clone().unwrap_or_default());
            obj.put("set", self.set.clone().unwrap_or_default());
        } else {
            obj.put("value", self.value.clone().unwrap_or_default());
            obj.put("writable", JsValue::boolean(self.writable));
        }
        obj.put("enumerable", JsValue::boolean(self.enumerable));
        obj.put("configurable", JsValue::boolean(self.configurable));
        JsValue::Object(obj)
    }

    /// Field-by-field identity, using SameValue for values and reference
    /// identity for accessors
    pub fn same_as(&self, other: &PropertyDescriptor) -> bool {
        fn same(a: &Option<JsValue>, b: &Option<JsValue>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_value(b),
                _ => false,
            }
        }
        self.writable == other.writable
            && self.enumerable == other.enumerable
            && self.configurable == other.configurable
            && same(&self.value, &other.value)
            && same(&self.get, &other.get)
            && same(&self.set, &other.set)
    }

    /// Copy made non-configurable
    pub fn sealed(&self) -> Self {
        self.clone().configurable(false)
    }

    /// Copy made non-configurable and, for data descriptors, read-only
    pub fn frozen(&self) -> Self {
        let mut desc = self.sealed();
        if desc.is_data_descriptor() {
            desc.writable = false;
        }
        desc
    }
}
