//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every entity table in the simulator is a `Vec` indexed by one of these ids,
//! assigned in input order at setup.  All ids are `Copy + Ord + Hash` so they
//! can key maps and sort without ceremony; `.index()` turns one into a `Vec`
//! index.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Id that indexes nothing; also the `Default`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a depot (batch plant) in the yard's depot table.
    pub struct DepotId(u32);
}

typed_id! {
    /// Index of a delivery site.
    pub struct SiteId(u32);
}

typed_id! {
    /// Index of a truck.
    pub struct TruckId(u32);
}

typed_id! {
    /// Index of a ticket (one truck load).
    pub struct TicketId(u32);
}

typed_id! {
    /// Index of a customer order.
    pub struct OrderId(u32);
}

typed_id! {
    /// Handle of a shared-capacity resource registered with the kernel.
    pub struct ResourceId(u32);
}

typed_id! {
    /// Handle of a logical process registered with the kernel.
    pub struct ProcessId(u32);
}
