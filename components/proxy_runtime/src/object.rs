//! Ordinary objects
//!
//! An ordinary object is an insertion-ordered map of property descriptors
//! plus a prototype link, an extensibility flag and a side table of hidden
//! values. Proxies use one as their default storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::descriptor::{DescriptorMap, PropertyDescriptor};
use crate::value::JsValue;
use core_types::{JsError, JsResult};

#[derive(Default)]
struct ObjectData {
    properties: IndexMap<String, PropertyDescriptor>,
    prototype: Option<JsValue>,
    extensible: bool,
    hidden: HashMap<String, JsValue>,
}

/// An ordinary object with shared, interior-mutable storage
#[derive(Clone)]
pub struct JsObject {
    data: Rc<RefCell<ObjectData>>,
}

impl JsObject {
    /// Create an empty, extensible object with no prototype
    pub fn new() -> Self {
        JsObject::with_prototype(None)
    }

    /// Create an empty, extensible object with the given prototype
    pub fn with_prototype(prototype: Option<JsValue>) -> Self {
        JsObject {
            data: Rc::new(RefCell::new(ObjectData {
                prototype,
                extensible: true,
                ..ObjectData::default()
            })),
        }
    }

    /// Create an object holding exactly the given descriptors
    pub fn from_descriptors(descriptors: DescriptorMap, prototype: Option<JsValue>) -> Self {
        let object = JsObject::with_prototype(prototype);
        object.data.borrow_mut().properties = descriptors;
        object
    }

    /// Own descriptor for `name`
    pub fn get_own_property(&self, name: &str) -> Option<PropertyDescriptor> {
        self.data.borrow().properties.get(name).cloned()
    }

    /// Whether `name` is an own property
    pub fn has_own_property(&self, name: &str) -> bool {
        self.data.borrow().properties.contains_key(name)
    }

    /// Own property names in insertion order
    pub fn own_property_names(&self) -> Vec<String> {
        self.data.borrow().properties.keys().cloned().collect()
    }

    /// Own enumerable property names in insertion order
    pub fn own_enumerable_names(&self) -> Vec<String> {
        self.data
            .borrow()
            .properties
            .iter()
            .filter(|(_, desc)| desc.enumerable)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// [[DefineOwnProperty]]
    ///
    /// A missing name on a non-extensible object is a `TypeError`. An existing
    /// non-configurable property can only be redefined with an identical
    /// descriptor, anything else is a `NotConfigurableError`. Redefining an
    /// existing name keeps its position in the enumeration order.
    pub fn define_own_property(&self, name: &str, desc: PropertyDescriptor) -> JsResult<bool> {
        let mut data = self.data.borrow_mut();
        match data.properties.get(name) {
            None if !data.extensible => {
                return Err(JsError::type_error(format!(
                    "Cannot define property {}, object is not extensible",
                    name
                )));
            }
            Some(existing) if !existing.configurable => {
                if existing.same_as(&desc) {
                    return Ok(true);
                }
                return Err(JsError::not_configurable(name));
            }
            _ => {}
        }
        data.properties.insert(name.to_string(), desc);
        Ok(true)
    }

    /// Store a descriptor without attribute or extensibility checks
    pub(crate) fn insert_unchecked(&self, name: &str, desc: PropertyDescriptor) {
        self.data
            .borrow_mut()
            .properties
            .insert(name.to_string(), desc);
    }

    /// Write a value as an ordinary data property.
    ///
    /// Existing writable data properties keep their attributes. Returns
    /// `false` when the write is refused.
    pub fn put(&self, name: &str, value: JsValue) -> bool {
        let mut data = self.data.borrow_mut();
        let extensible = data.extensible;
        match data.properties.get_mut(name) {
            Some(existing) if existing.is_accessor_descriptor() => false,
            Some(existing) => {
                if !existing.writable {
                    return false;
                }
                existing.value = Some(value);
                true
            }
            None if !extensible => false,
            None => {
                data.properties
                    .insert(name.to_string(), PropertyDescriptor::data(value));
                true
            }
        }
    }

    /// [[Delete]]: absent names succeed, non-configurable names are refused
    pub fn delete_own_property(&self, name: &str) -> bool {
        let mut data = self.data.borrow_mut();
        match data.properties.get(name) {
            None => true,
            Some(desc) if !desc.configurable => false,
            Some(_) => {
                data.properties.shift_remove(name);
                true
            }
        }
    }

    /// The prototype link
    pub fn prototype(&self) -> Option<JsValue> {
        self.data.borrow().prototype.clone()
    }

    /// Replace the prototype link without any checks
    pub fn replace_prototype(&self, prototype: Option<JsValue>) {
        self.data.borrow_mut().prototype = prototype;
    }

    /// Whether new properties may be added
    pub fn is_extensible(&self) -> bool {
        self.data.borrow().extensible
    }

    /// Forbid new properties
    pub fn prevent_extensions(&self) {
        self.data.borrow_mut().extensible = false;
    }

    /// Forbid new properties and make every property non-configurable
    pub fn seal(&self) {
        let mut data = self.data.borrow_mut();
        data.extensible = false;
        for desc in data.properties.values_mut() {
            *desc = desc.sealed();
        }
    }

    /// Seal and make every data property read-only
    pub fn freeze(&self) {
        let mut data = self.data.borrow_mut();
        data.extensible = false;
        for desc in data.properties.values_mut() {
            *desc = desc.frozen();
        }
    }

    /// Not extensible and no configurable property
    pub fn is_sealed(&self) -> bool {
        let data = self.data.borrow();
        !data.extensible && data.properties.values().all(|desc| !desc.configurable)
    }

    /// Sealed and no writable data property
    pub fn is_frozen(&self) -> bool {
        let data = self.data.borrow();
        !data.extensible
            && data
                .properties
                .values()
                .all(|desc| !desc.configurable && !(desc.is_data_descriptor() && desc.writable))
    }

    /// Copy of every own descriptor
    pub fn snapshot(&self) -> DescriptorMap {
        self.data.borrow().properties.clone()
    }

    /// Replace every own descriptor at once
    pub fn replace_properties(&self, descriptors: DescriptorMap) {
        self.data.borrow_mut().properties = descriptors;
    }

    /// Hidden value stored under `name`
    pub fn hidden(&self, name: &str) -> Option<JsValue> {
        self.data.borrow().hidden.get(name).cloned()
    }

    /// Store a hidden value, invisible to property operations
    pub fn set_hidden(&self, name: &str, value: JsValue) {
        self.data
            .borrow_mut()
            .hidden
            .insert(name.to_string(), value);
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// New object with the same descriptors, prototype and extensibility.
    /// Hidden values are not copied.
    pub fn shallow_clone(&self) -> JsObject {
        let data = self.data.borrow();
        JsObject {
            data: Rc::new(RefCell::new(ObjectData {
                properties: data.properties.clone(),
                prototype: data.prototype.clone(),
                extensible: data.extensible,
                hidden: HashMap::new(),
            })),
        }
    }
}

impl Default for JsObject {
    fn default() -> Self {
        JsObject::new()
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Property values may point back at this object, so only names are printed.
        match self.data.try_borrow() {
            Ok(data) => f
                .debug_struct("JsObject")
                .field("properties", &data.properties.keys().collect::<Vec<_>>())
                .field("extensible", &data.extensible)
                .finish(),
            Err(_) => f.write_str("JsObject(<borrowed>)"),
        }
    }
}
