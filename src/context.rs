//! The heterogeneous context carried through a single parse/execute call.
use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::key::TypedKey;

/// Created at the start of a parse, mutated as the tree binds arguments,
/// and finally handed to the matched terminal's handler (or to the
/// exception controller on failure).
///
/// `S` is the sender type for this manager (Design Note 1: the framework is
/// parameterized by a single sender type rather than per-command generics).
/// Parsed argument values and any other transient data are stored behind
/// [`TypedKey`]s in a single `(name, TypeId) -> Box<dyn Any>` map, the
/// Rust-idiomatic stand-in for the Java source's reflective heterogeneous
/// map (Design Note 1).
///
/// A `CommandContext` is never shared between concurrent parses: each
/// `execute`/`suggest` call gets its own instance (§5).
pub struct CommandContext<S> {
    sender: S,
    values: HashMap<(&'static str, TypeId), Box<dyn Any + Send + Sync>>,
}

impl<S> CommandContext<S> {
    /// Creates a fresh context for a new parse, wrapping the given sender.
    #[must_use]
    pub fn new(sender: S) -> Self {
        Self {
            sender,
            values: HashMap::new(),
        }
    }

    /// The sender that issued this command.
    #[must_use]
    pub const fn sender(&self) -> &S {
        &self.sender
    }

    /// A mutable reference to the sender.
    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    /// Consumes the context, returning its sender.
    #[must_use]
    pub fn into_sender(self) -> S {
        self.sender
    }

    /// Binds a value under a typed key, overwriting any previous binding.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: TypedKey<T>, value: T) {
        self.values
            .insert((key.name(), TypeId::of::<T>()), Box::new(value));
    }

    /// Looks up a value by typed key.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, key: TypedKey<T>) -> Option<&T> {
        self.values
            .get(&(key.name(), TypeId::of::<T>()))
            .map(|value| {
                value
                    .downcast_ref::<T>()
                    .expect("TypedKey name+TypeId pair always matches the stored value's type")
            })
    }

    /// Looks up a value by typed key, falling back to `T::default()`.
    #[must_use]
    pub fn get_or_default<T: Send + Sync + Default + 'static>(&self, key: TypedKey<T>) -> T
    where
        T: Clone,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Removes and returns a bound value.
    pub fn remove<T: Send + Sync + 'static>(&mut self, key: TypedKey<T>) -> Option<T> {
        self.values
            .remove(&(key.name(), TypeId::of::<T>()))
            .map(|value| {
                *value
                    .downcast::<T>()
                    .expect("TypedKey name+TypeId pair always matches the stored value's type")
            })
    }

    /// Whether a value is bound under the given key.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self, key: TypedKey<T>) -> bool {
        self.values.contains_key(&(key.name(), TypeId::of::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_bound_value() {
        let key: TypedKey<i64> = TypedKey::new("amount");
        let mut ctx = CommandContext::new(());
        ctx.set(key, 42);
        assert_eq!(ctx.get(key), Some(&42));
    }

    #[test]
    fn same_name_different_type_keys_do_not_collide() {
        let int_key: TypedKey<i64> = TypedKey::new("value");
        let str_key: TypedKey<String> = TypedKey::new("value");
        let mut ctx = CommandContext::new(());
        ctx.set(int_key, 7);
        ctx.set(str_key, "seven".to_string());
        assert_eq!(ctx.get(int_key), Some(&7));
        assert_eq!(ctx.get(str_key).map(String::as_str), Some("seven"));
    }

    #[test]
    fn remove_returns_owned_value_and_clears_binding() {
        let key: TypedKey<String> = TypedKey::new("name");
        let mut ctx = CommandContext::new(());
        ctx.set(key, "Alice".to_string());
        assert_eq!(ctx.remove(key), Some("Alice".to_string()));
        assert!(!ctx.contains(key));
    }

    #[test]
    fn sender_is_reachable_and_mutable() {
        let mut ctx = CommandContext::new(10_i32);
        assert_eq!(*ctx.sender(), 10);
        *ctx.sender_mut() += 1;
        assert_eq!(ctx.into_sender(), 11);
    }
}
