//! Two's-complement bit-vectors of BDD functions.
//!
//! A [`BitVec`] holds one BDD per bit, least significant bit first. Integer
//! variables become vectors of fresh BDD variables, literals become vectors of
//! terminals, and addition is a ripple-carry adder built from ITE.

use crate::bdd::Bdd;
use crate::reference::Ref;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BitVec {
    bits: Vec<Ref>,
}

/// Smallest two's-complement width that can represent `value`.
pub fn bits_for(value: i64) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    64 - magnitude.leading_zeros() + 1
}

impl BitVec {
    pub fn from_bits(bits: Vec<Ref>) -> Self {
        assert!(!bits.is_empty(), "Bit-vector should have at least one bit");
        Self { bits }
    }

    /// Vector of the given BDD variables, least significant first.
    pub fn from_vars(bdd: &Bdd, vars: impl IntoIterator<Item = u32>) -> Self {
        Self::from_bits(vars.into_iter().map(|v| bdd.mk_var(v)).collect())
    }

    /// Constant vector, or `None` if `value` does not fit in `width` bits.
    pub fn constant(bdd: &Bdd, value: i64, width: u32) -> Option<Self> {
        if width == 0 || width > 64 || bits_for(value) > width {
            return None;
        }
        let bits = (0..width)
            .map(|i| if (value >> i) & 1 == 1 { bdd.one } else { bdd.zero })
            .collect();
        Some(Self::from_bits(bits))
    }

    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    pub fn bit(&self, i: usize) -> Ref {
        self.bits[i]
    }

    pub fn bits(&self) -> &[Ref] {
        &self.bits
    }

    /// The sign bit.
    pub fn msb(&self) -> Ref {
        self.bits[self.bits.len() - 1]
    }

    /// Replicate the sign bit up to `width`.
    pub fn sign_extend(&self, width: u32) -> Self {
        let mut bits = self.bits.clone();
        let msb = self.msb();
        bits.resize((width as usize).max(bits.len()), msb);
        Self { bits }
    }

    /// Bitwise complement.
    pub fn not(&self) -> Self {
        Self {
            bits: self.bits.iter().map(|&b| -b).collect(),
        }
    }
}

impl Bdd {
    /// Ripple-carry sum `a + b + carry`, truncated to the common width.
    pub fn bv_add_carry(&self, a: &BitVec, b: &BitVec, carry: Ref) -> BitVec {
        assert_eq!(a.width(), b.width(), "Bit-vector widths should match");

        let mut carry = carry;
        let mut sum = Vec::with_capacity(a.bits.len());
        for (&x, &y) in a.bits.iter().zip(&b.bits) {
            let x_xor_y = self.apply_xor(x, y);
            sum.push(self.apply_xor(x_xor_y, carry));
            // carry' = majority(x, y, carry)
            carry = self.apply_ite(x_xor_y, carry, x);
        }
        BitVec::from_bits(sum)
    }

    pub fn bv_add(&self, a: &BitVec, b: &BitVec) -> BitVec {
        self.bv_add_carry(a, b, self.zero)
    }

    /// `a - b` as `a + !b + 1`.
    pub fn bv_sub(&self, a: &BitVec, b: &BitVec) -> BitVec {
        self.bv_add_carry(a, &b.not(), self.one)
    }

    pub fn bv_eq(&self, a: &BitVec, b: &BitVec) -> Ref {
        assert_eq!(a.width(), b.width(), "Bit-vector widths should match");
        self.apply_and_many(a.bits.iter().zip(&b.bits).map(|(&x, &y)| self.apply_eq(x, y)))
    }

    /// Signed `a < b`: the sign of `a - b` computed one bit wider, so the
    /// subtraction never overflows.
    pub fn bv_slt(&self, a: &BitVec, b: &BitVec) -> Ref {
        let width = a.width().max(b.width()) + 1;
        let diff = self.bv_sub(&a.sign_extend(width), &b.sign_extend(width));
        diff.msb()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Decode a constant vector back to an integer.
    fn value_of(bdd: &Bdd, v: &BitVec) -> i64 {
        let mut value = 0i64;
        for (i, &b) in v.bits().iter().enumerate() {
            assert!(bdd.is_terminal(b));
            if bdd.is_one(b) {
                value |= 1 << i;
            }
        }
        let w = v.width();
        if w < 64 && bdd.is_one(v.msb()) {
            value -= 1 << w;
        }
        value
    }

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(0), 1);
        assert_eq!(bits_for(-1), 1);
        assert_eq!(bits_for(1), 2);
        assert_eq!(bits_for(7), 4);
        assert_eq!(bits_for(-8), 4);
        assert_eq!(bits_for(8), 5);
        assert_eq!(bits_for(i64::MAX), 64);
        assert_eq!(bits_for(i64::MIN), 64);
    }

    #[test]
    fn test_constant() {
        let bdd = Bdd::default();
        for value in [-8, -3, 0, 5, 7] {
            let v = BitVec::constant(&bdd, value, 4).unwrap();
            assert_eq!(value_of(&bdd, &v), value);
        }
        assert!(BitVec::constant(&bdd, 8, 4).is_none());
        assert!(BitVec::constant(&bdd, -9, 4).is_none());
    }

    #[test]
    fn test_constant_arithmetic() {
        let bdd = Bdd::default();
        for a in -8..8 {
            for b in -8..8 {
                let x = BitVec::constant(&bdd, a, 4).unwrap().sign_extend(5);
                let y = BitVec::constant(&bdd, b, 4).unwrap().sign_extend(5);
                assert_eq!(value_of(&bdd, &bdd.bv_add(&x, &y)), a + b);
                assert_eq!(value_of(&bdd, &bdd.bv_sub(&x, &y)), a - b);
                assert_eq!(bdd.is_one(bdd.bv_slt(&x, &y)), a < b, "{} < {}", a, b);
                assert_eq!(bdd.is_one(bdd.bv_eq(&x, &y)), a == b);
            }
        }
    }

    #[test]
    fn test_symbolic_commutativity() {
        let bdd = Bdd::default();
        // Interleaved: x_i is variable 2i+1, y_i is variable 2i+2.
        let x = BitVec::from_vars(&bdd, (0..4).map(|i| 2 * i + 1));
        let y = BitVec::from_vars(&bdd, (0..4).map(|i| 2 * i + 2));
        assert_eq!(bdd.bv_add(&x, &y), bdd.bv_add(&y, &x));
        // Trichotomy: exactly one of x < y, y < x, x == y holds.
        let lt = bdd.bv_slt(&x, &y);
        assert_eq!(lt, -bdd.apply_or(bdd.bv_slt(&y, &x), bdd.bv_eq(&x, &y)));
    }
}
