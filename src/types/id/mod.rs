use serde::de::{Error as DeError, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    marker::PhantomData,
    num::NonZeroI64,
};

use self::marker::Marker;

pub mod marker;

/// A database row id tagged with the table it belongs to, so a
/// post id cannot be accidentally passed where a user id is
/// expected.
pub struct Id<T: Marker> {
    value: NonZeroI64,
    phantom: PhantomData<T>,
}

impl<T: Marker> Id<T> {
    /// # Panics
    ///
    /// It will panic if the value is not positive.
    #[must_use]
    #[track_caller]
    pub const fn new(n: i64) -> Self {
        if let Some(id) = Self::new_checked(n) {
            id
        } else {
            panic!("value must be positive")
        }
    }

    #[must_use]
    pub const fn new_checked(n: i64) -> Option<Self> {
        if n <= 0 {
            return None;
        }
        if let Some(n) = NonZeroI64::new(n) {
            Some(Self {
                value: n,
                phantom: PhantomData,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.value.get()
    }
}

impl<T: Marker> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        write!(f, "Id<{marker}>({})", self.value)
    }
}

impl<T: Marker> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.value, f)
    }
}

// Manual impls so `T` does not need to satisfy these bounds itself.
impl<T: Marker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Marker> Copy for Id<T> {}

impl<T: Marker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Marker> Eq for Id<T> {}

impl<T: Marker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Marker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: Marker> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: Marker> Serialize for Id<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.get())
    }
}

impl<'de, T: Marker> Deserialize<'de> for Id<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor<T>(PhantomData<T>);

        impl<'de, T: Marker> Visitor<'de> for IdVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a positive integer")
            }

            fn visit_i64<E: DeError>(self, v: i64) -> Result<Self::Value, E> {
                Id::new_checked(v)
                    .ok_or_else(|| DeError::invalid_value(Unexpected::Signed(v), &self))
            }

            fn visit_u64<E: DeError>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v)
                    .map_err(|_| DeError::invalid_value(Unexpected::Unsigned(v), &self))?;
                self.visit_i64(v)
            }

            fn visit_str<E: DeError>(self, v: &str) -> Result<Self::Value, E> {
                let parsed = v
                    .parse::<i64>()
                    .map_err(|_| DeError::invalid_value(Unexpected::Str(v), &self))?;
                self.visit_i64(parsed)
            }
        }

        deserializer.deserialize_i64(IdVisitor(PhantomData))
    }
}

impl<T: Marker> sqlx::Type<sqlx::Postgres> for Id<T> {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q, T: Marker> sqlx::Encode<'q, sqlx::Postgres> for Id<T> {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.get(), buf)
    }
}

impl<'r, T: Marker> sqlx::Decode<'r, sqlx::Postgres> for Id<T> {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Self::new_checked(raw).ok_or_else(|| "row id must be a positive integer".into())
    }
}
