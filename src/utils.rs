/// [Szudzik pairing function][szudzik-pairing].
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// Arithmetic wraps, so the result is a hash rather than a bijection once the
/// inputs exceed 32 bits.
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing2(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

pub trait MyHash {
    fn hash(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_szudzik() {
        // a\b  0  1  2  3
        // ---------------
        //  0 | 0  1  4  9
        //  1 | 2  3  5 10
        //  2 | 6  7  8 11
        //  3 |12 13 14 15
        assert_eq!(pairing2(0, 0), 0);
        assert_eq!(pairing2(0, 1), 1);
        assert_eq!(pairing2(1, 0), 2);
        assert_eq!(pairing2(1, 2), 5);
        assert_eq!(pairing2(2, 1), 7);
        assert_eq!(pairing2(3, 3), 15);
    }

    #[test]
    fn test_large_inputs_do_not_overflow() {
        let x = pairing3(u32::MAX as u64, u32::MAX as u64, 7);
        assert_ne!(x, pairing3(u32::MAX as u64, u32::MAX as u64, 8));
    }
}
