//! Operator boilerplate for single-field numeric newtypes.

/// Implements a `std::ops` trait for a tuple newtype by delegating to the inner value.
///
/// ```rust,ignore
/// op!(binary Money, Add, add);
/// ```
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            type Output = $type;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
}
