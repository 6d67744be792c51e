//! Strongly typed identifier wrappers.
//!
//! Both ids are `Copy + Ord + Hash` so they can be used as map keys and
//! sorted collection elements without ceremony.  `SubnetId` is the stable
//! index a subnet name is assigned when the road network index is built; it
//! is used directly to index the cost matrix and per-subnet tables.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
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
    /// Index of a subnet (road segment / intersection) in the network index.
    /// Assigned once, in subnet-list order, and never reassigned.
    pub struct SubnetId(u32);
}

typed_id! {
    /// Identity of a vehicle agent.  Chosen by the scenario, not by the node.
    pub struct VehicleId(u32);
}
