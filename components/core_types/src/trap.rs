//! Names of the interceptable operations.

use std::fmt;

/// One interceptable operation on a proxy.
///
/// The first twelve variants are the handler traps; `Call` and `Construct`
/// are the invocation traps of callable proxies, which are supplied at
/// creation time rather than through the handler.
///
/// # Examples
///
/// ```
/// use core_types::Trap;
///
/// assert_eq!(Trap::from_handler_key("hasOwn"), Some(Trap::HasOwn));
/// assert_eq!(Trap::from_handler_key("callTrap"), None);
/// assert_eq!(Trap::Delete.as_str(), "delete");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trap {
    /// getOwnPropertyDescriptor(name)
    GetOwnPropertyDescriptor,
    /// getPropertyDescriptor(name)
    GetPropertyDescriptor,
    /// getOwnPropertyNames()
    GetOwnPropertyNames,
    /// defineProperty(name, descriptor)
    DefineProperty,
    /// delete(name)
    Delete,
    /// fix()
    Fix,
    /// has(name)
    Has,
    /// hasOwn(name)
    HasOwn,
    /// get(receiver, name)
    Get,
    /// set(receiver, name, value)
    Set,
    /// enumerate()
    Enumerate,
    /// keys()
    Keys,
    /// Plain invocation of a callable proxy
    Call,
    /// `new`-style construction of a callable proxy
    Construct,
}

impl Trap {
    /// Traps a handler object may define, in declaration order
    pub const HANDLER_TRAPS: [Trap; 12] = [
        Trap::GetOwnPropertyDescriptor,
        Trap::GetPropertyDescriptor,
        Trap::GetOwnPropertyNames,
        Trap::DefineProperty,
        Trap::Delete,
        Trap::Fix,
        Trap::Has,
        Trap::HasOwn,
        Trap::Get,
        Trap::Set,
        Trap::Enumerate,
        Trap::Keys,
    ];

    /// The trap's key in a handler object
    pub fn as_str(&self) -> &'static str {
        match self {
            Trap::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
            Trap::GetPropertyDescriptor => "getPropertyDescriptor",
            Trap::GetOwnPropertyNames => "getOwnPropertyNames",
            Trap::DefineProperty => "defineProperty",
            Trap::Delete => "delete",
            Trap::Fix => "fix",
            Trap::Has => "has",
            Trap::HasOwn => "hasOwn",
            Trap::Get => "get",
            Trap::Set => "set",
            Trap::Enumerate => "enumerate",
            Trap::Keys => "keys",
            Trap::Call => "callTrap",
            Trap::Construct => "constructTrap",
        }
    }

    /// Look up a handler trap by its key. Invocation traps are not handler keys.
    pub fn from_handler_key(key: &str) -> Option<Trap> {
        Trap::HANDLER_TRAPS
            .iter()
            .copied()
            .find(|trap| trap.as_str() == key)
    }

    /// Whether this trap is carried by the handler
    pub fn is_handler_trap(&self) -> bool {
        !matches!(self, Trap::Call | Trap::Construct)
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
