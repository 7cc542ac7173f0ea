//! Helper macro for declaring port error enums.
//!
//! `define_port_error!` expands to a `thiserror` enum plus one snake_case
//! constructor per variant (string-like fields accept `impl Into<String>`) and
//! a `kind()` accessor that names the variant for structured log fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (@pattern $variant:ident) => { Self::$variant };
    (@pattern $variant:ident { $($field:ident : $ty:ty),* }) => { Self::$variant { .. } };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Snake-case variant name for log fields.
            pub fn kind(&self) -> &'static str {
                ::paste::paste! {
                    match self {
                        $(
                            define_port_error!(@pattern $variant $( { $($field : $ty),* } )?) =>
                                stringify!([<$variant:snake>]),
                        )*
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Example used to exercise the macro.
        pub enum LedgerError {
            Unreachable { message: String } => "ledger unreachable: {message}",
            Overdrawn { shortfall: i64 } => "overdrawn by {shortfall}",
            DuplicateEntry { reference: String, attempt: u32 } => "duplicate {reference} ({attempt})",
            Closed => "ledger closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = LedgerError::unreachable("timeout");
        assert_eq!(err.to_string(), "ledger unreachable: timeout");
    }

    #[test]
    fn constructors_preserve_numeric_fields() {
        assert_eq!(LedgerError::overdrawn(250_i64).to_string(), "overdrawn by 250");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = LedgerError::duplicate_entry("tx-1", 2_u32);
        assert_eq!(err.to_string(), "duplicate tx-1 (2)");
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(LedgerError::closed(), LedgerError::Closed);
    }

    #[test]
    fn kind_names_the_variant() {
        assert_eq!(LedgerError::duplicate_entry("x", 1_u32).kind(), "duplicate_entry");
        assert_eq!(LedgerError::closed().kind(), "closed");
    }
}
