use std::borrow::Borrow;
use std::fmt;

/// String form of a caller supplied key.
///
/// This is the join key between the lock registry and the expiring store, so two
/// keys render to the same `CacheKey` exactly when they name the same entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A key type that repositories can address entities by.
pub trait EntityKey {
    /// Renders the key for caching. `None` marks the null (or zero) key, which
    /// every repository operation rejects.
    fn cache_key(&self) -> Option<CacheKey>;
}

impl EntityKey for String {
    fn cache_key(&self) -> Option<CacheKey> {
        self.as_str().cache_key()
    }
}

impl EntityKey for &str {
    fn cache_key(&self) -> Option<CacheKey> {
        (!self.is_empty()).then(|| CacheKey::from(*self))
    }
}

impl<T: EntityKey> EntityKey for Option<T> {
    fn cache_key(&self) -> Option<CacheKey> {
        self.as_ref().and_then(EntityKey::cache_key)
    }
}

macro_rules! integer_entity_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EntityKey for $ty {
                fn cache_key(&self) -> Option<CacheKey> {
                    (*self != 0).then(|| CacheKey(self.to_string()))
                }
            }
        )*
    };
}

integer_entity_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keys_render_with_display() {
        assert_eq!(42u32.cache_key(), Some(CacheKey::from("42")));
        assert_eq!((-1i64).cache_key(), Some(CacheKey::from("-1")));
        assert_eq!(0i32.cache_key(), None);
    }

    #[test]
    fn test_string_keys() {
        assert_eq!("order-7".cache_key(), Some(CacheKey::from("order-7")));
        assert_eq!(String::from("order-7").cache_key(), Some(CacheKey::from("order-7")));
        assert_eq!("".cache_key(), None);
        assert_eq!(String::new().cache_key(), None);
    }

    #[test]
    fn test_option_keys() {
        let none: Option<u64> = None;
        assert_eq!(none.cache_key(), None);
        assert_eq!(Some(0u64).cache_key(), None);
        assert_eq!(Some(9u64).cache_key(), 9u64.cache_key());
    }

    #[test]
    fn test_rendering_is_stable() {
        let key = 1234567u64;
        assert_eq!(key.cache_key(), key.cache_key());
        assert_eq!(key.cache_key().unwrap().as_bytes(), b"1234567");
    }
}
