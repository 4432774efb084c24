//! Dense indices into the schedule store.
//!
//! External identifiers are strings; once a dataset is loaded every entity is
//! addressed by its position in the store's tables instead. The newtypes keep
//! a stop index from being used where a trip index is expected.

macro_rules! store_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Position in the owning table.
            pub fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.as_usize()
            }
        }
    };
}

store_index!(
    /// Index of a stop (area or point) in the schedule store.
    ///
    /// # Examples
    ///
    /// ```
    /// use reach_server::domain::StopIdx;
    ///
    /// let idx = StopIdx(3);
    /// assert_eq!(idx.as_usize(), 3);
    /// ```
    StopIdx
);
store_index!(
    /// Index of a route in the schedule store.
    RouteIdx
);
store_index!(
    /// Index of a trip in the schedule store.
    TripIdx
);
store_index!(
    /// Interned service identifier.
    ServiceIdx
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_order_by_position() {
        assert!(TripIdx(1) < TripIdx(2));
        assert_eq!(usize::from(StopIdx(7)), 7);
        assert_eq!(ServiceIdx(4).to_string(), "4");
    }
}
