use std::collections::BTreeMap;

/// Trial-division factorization. Returns the prime factors of `n` in
/// ascending order, repeated by multiplicity. `n < 2` yields no factors.
pub fn factorize(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }

    let mut d: u64 = 2;
    // d <= n / d instead of d * d <= n: no overflow near u64::MAX
    while d <= n / d {
        while n % d == 0 {
            factors.push(d);
            n /= d;
        }
        d += 1;
    }

    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Groups a factor list into prime -> multiplicity, ascending by prime.
pub fn group(factors: &[u64]) -> BTreeMap<u64, u32> {
    let mut map = BTreeMap::new();
    for &p in factors {
        *map.entry(p).or_insert(0) += 1;
    }
    map
}
