//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`, `from_reference()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use directorio_core::define_id;
/// define_id!(PersonaId);
/// define_id!(DireccionId);
///
/// let persona_id = PersonaId::new(1);
/// let direccion_id = DireccionId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: PersonaId = direccion_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }

            /// Interpret a wire-level reference to this entity.
            ///
            /// Clients send `0` to mean "no reference"; both `0` and a missing
            /// value map to `None`.
            #[must_use]
            pub const fn from_reference(raw: Option<i32>) -> Option<Self> {
                match raw {
                    None | Some(0) => None,
                    Some(id) => Some(Self(id)),
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(PersonaId);
define_id!(DireccionId);
define_id!(UserId);

// External profile identifier. Not a foreign key in this store.
define_id!(PerfilId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_reference_is_absent() {
        assert_eq!(DireccionId::from_reference(Some(0)), None);
        assert_eq!(DireccionId::from_reference(None), None);
    }

    #[test]
    fn non_zero_reference_is_kept() {
        assert_eq!(
            DireccionId::from_reference(Some(7)),
            Some(DireccionId::new(7))
        );
        assert_eq!(PerfilId::from_reference(Some(-3)), Some(PerfilId::new(-3)));
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&PersonaId::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: PersonaId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.as_i32(), 42);
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(UserId::new(9).to_string(), "9");
    }
}
