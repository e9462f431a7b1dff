use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a BDD node.
///
/// The sign carries a complement edge: `-r` denotes the negation of the
/// function referenced by `r`. Index `0` is never a valid node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Index of the referenced node in the storage.
    pub const fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    /// Signed value packed into an unsigned integer, `2 * index + sign`.
    pub(crate) const fn unsigned(self) -> u32 {
        (self.0.unsigned_abs() << 1) | (self.0 < 0) as u32
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_negation() {
        let r = Ref::positive(5);
        assert!(!r.is_negated());
        assert!((-r).is_negated());
        assert_eq!(-(-r), r);
        assert_eq!((-r).index(), 5);
    }

    #[test]
    fn test_unsigned_is_injective() {
        assert_eq!(Ref::positive(3).unsigned(), 6);
        assert_eq!((-Ref::positive(3)).unsigned(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::positive(2).to_string(), "@2");
        assert_eq!((-Ref::positive(2)).to_string(), "~@2");
    }
}
