use serde::de::{Error as DeError, Unexpected};
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    marker::PhantomData,
    num::NonZeroU64,
};

use self::marker::Marker;

pub mod marker;

/// Surrogate key generated by the database. It can never be zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id<T: Marker> {
    value: NonZeroU64,
    phantom: PhantomData<T>,
}

pub type FeedbackId = Id<marker::FeedbackMarker>;

impl<T: Marker> Id<T> {
    /// # Panics
    ///
    /// It will panic if the value is 0.
    #[must_use]
    #[track_caller]
    pub const fn new(n: u64) -> Self {
        if let Some(id) = Self::new_checked(n) {
            id
        } else {
            panic!("value is zero")
        }
    }

    #[must_use]
    pub const fn from_nonzero(n: NonZeroU64) -> Self {
        Self {
            value: n,
            phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn new_checked(n: u64) -> Option<Self> {
        if let Some(n) = NonZeroU64::new(n) {
            Some(Self::from_nonzero(n))
        } else {
            None
        }
    }

    /// Converts the signed value postgres hands out for `BIGSERIAL`
    /// columns. Negative and zero values are rejected.
    #[must_use]
    pub fn from_db(n: i64) -> Option<Self> {
        u64::try_from(n).ok().and_then(Self::new_checked)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.value.get()
    }

    /// Value of the id to bind into a query. Ids outside of
    /// the `i64` range cannot exist in the database.
    #[must_use]
    pub fn to_db(self) -> Option<i64> {
        i64::try_from(self.value.get()).ok()
    }
}

impl<T: Marker> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_name = std::any::type_name::<T>();
        let type_name = type_name.rsplit("::").next().unwrap_or(type_name);
        write!(f, "Id::<{type_name}>({})", self.value.get())
    }
}

impl<T: Marker> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.value.get(), f)
    }
}

impl<T: Marker> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.value.get());
    }
}

impl<'de, T: Marker> serde::Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<T: Marker>(PhantomData<T>);

        impl<'de, T: Marker> serde::de::Visitor<'de> for Visitor<T> {
            type Value = Id<T>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a nonzero integer id")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                let value = u64::try_from(v)
                    .map_err(|_| DeError::invalid_value(Unexpected::Signed(v), &"nonzero u64"))?;

                self.visit_u64(value)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                let value = NonZeroU64::new(v).ok_or_else(|| {
                    DeError::invalid_value(Unexpected::Unsigned(v), &"nonzero u64")
                })?;

                Ok(Id::<T>::from_nonzero(value))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                let value = v
                    .parse::<u64>()
                    .map_err(|_| DeError::invalid_value(Unexpected::Str(v), &"nonzero u64"))?;

                self.visit_u64(value)
            }
        }

        deserializer.deserialize_any(Visitor(PhantomData))
    }
}

impl<T: Marker> serde::Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.value.get())
    }
}
