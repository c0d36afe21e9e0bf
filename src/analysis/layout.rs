//! Near-square grid layout for the sensor array

/// Rows and columns of the sensor grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
}

impl GridLayout {
    /// Number of slots (may exceed the channel count on the last row)
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Row and column of a channel, filled row-major
    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        if self.cols == 0 || index >= self.capacity() {
            return None;
        }
        Some((index / self.cols, index % self.cols))
    }
}

/// Choose a near-square layout for `n` cells.
///
/// Prefers the largest divisor of `n` not above `sqrt(n)` as the column
/// count; when the only such divisor is 1 (primes, and 1..=3), falls back to
/// `ceil(sqrt(n))` columns. `n == 0` gives an empty grid.
pub fn best_grid(n: usize) -> GridLayout {
    if n == 0 {
        return GridLayout::default();
    }
    let mut cols = isqrt(n);
    while cols > 1 && n % cols != 0 {
        cols -= 1;
    }
    if cols <= 1 {
        cols = ceil_sqrt(n);
    }
    GridLayout {
        rows: n.div_ceil(cols),
        cols,
    }
}

fn isqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

fn ceil_sqrt(n: usize) -> usize {
    let r = isqrt(n);
    if r * r == n {
        r
    } else {
        r + 1
    }
}
