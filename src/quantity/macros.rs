/// Newtype over a plain number with its unit attached to the formatting.
///
/// Integer quantities are totally ordered and signed ones are negatable,
/// the float quantity is ordered via [`ordered_float::OrderedFloat`].
macro_rules! quantity {
    ($name:ident, i64, $unit:literal) => {
        quantity!(@base $name, i64, $unit);
        quantity!(@integer $name);

        impl ::std::ops::Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }
    };

    ($name:ident, u8, $unit:literal) => {
        quantity!(@base $name, u8, $unit);
        quantity!(@integer $name);
    };

    ($name:ident, f64, $unit:literal) => {
        quantity!(@base $name, f64, $unit);

        impl $name {
            const fn ordered(self) -> ::ordered_float::OrderedFloat<f64> {
                ::ordered_float::OrderedFloat(self.0)
            }
        }

        impl ::std::cmp::Ord for $name {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.ordered().cmp(&other.ordered())
            }
        }

        impl ::std::cmp::PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.ordered() == other.ordered()
            }
        }

        impl ::std::cmp::Eq for $name {}
    };

    (@integer $name:ident) => {
        impl ::std::cmp::Ord for $name {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl ::std::cmp::PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl ::std::cmp::Eq for $name {}
    };

    (@base $name:ident, $container:ty, $unit:literal) => {
        #[repr(transparent)]
        #[derive(
            Copy,
            Clone,
            Default,
            ::derive_more::Add,
            ::derive_more::Sub,
            ::derive_more::SubAssign,
            ::derive_more::Sum,
            ::derive_more::FromStr,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $container);

        impl $name {
            pub const ZERO: Self = Self(0 as $container);
        }

        /// `1500 Wh` for humans.
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }

        /// `1500Wh` for logs.
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{:?}{}", self.0, $unit)
            }
        }
    };
}
