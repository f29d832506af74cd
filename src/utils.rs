/// Szudzik's [elegant pairing][szudzik], computed modulo `2^64`.
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// Input signals carry bit 31, so squaring a pairing of two of them no
/// longer fits in `u64`. The table only looks at the low bits, so the
/// arithmetic wraps.
///
/// [szudzik]: https://en.wikipedia.org/wiki/Pairing_function#Other_pairing_functions
pub fn pairing_szudzik(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

pub fn pairing2(a: u64, b: u64) -> u64 {
    pairing_szudzik(a, b)
}

/// Folds `c` into the pairing of `a` and `b`.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing_szudzik(pairing_szudzik(a, b), c)
}

/// Bucket hash for values stored in a [`Table`][crate::table::Table].
///
/// Equal values must hash equally; distinct values may collide.
pub trait MyHash {
    fn hash(&self) -> u64;
}
