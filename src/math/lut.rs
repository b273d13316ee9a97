use std::ops::Index;

/// A lookup table of values sampled at a uniform step, starting at zero.
#[derive(Clone, Debug)]
pub struct LookupTable<T> {
    step: f64,
    values: Vec<T>,
}

impl<T> LookupTable<T> {
    /// Creates a lookup table from a sample function.
    ///
    /// The function is called exactly once per sample, in increasing order of `x`,
    /// so it may carry state from one sample to the next.
    pub fn from_samples(num_samples: usize, step: f64, f: impl FnMut(f64) -> T) -> Self {
        let xs = (0..num_samples).map(|i| i as f64 * step);
        let values = xs.map(f).collect();
        Self { step, values }
    }

    /// Creates a lookup table from samples taken at multiples of `step`.
    pub fn from_values(step: f64, values: Vec<T>) -> Self {
        Self { step, values }
    }

    /// Creates an empty lookup table.
    pub(crate) fn empty(step: f64) -> Self {
        Self {
            step,
            values: vec![],
        }
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The distance between consecutive samples.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The index of the sample at or before `x`, which may be out of bounds.
    pub fn bucket(&self, x: f64) -> usize {
        (x / self.step) as usize
    }

    /// Gets the sample at the given index.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.values.get(idx)
    }

    /// The samples as a slice.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> Index<usize> for LookupTable<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.values[idx]
    }
}

impl LookupTable<f64> {
    /// Samples the table, linearly interpolating between neighbouring samples.
    /// Values of `x` outside the table are clamped to the first or last sample.
    pub fn interpolate(&self, x: f64) -> f64 {
        let Some(&first) = self.values.first() else {
            return 0.0;
        };
        if x <= 0.0 {
            return first;
        }
        let last = self.values.len() - 1;
        let idx = self.bucket(x);
        if idx >= last {
            return self.values[last];
        }
        let ratio = (x - idx as f64 * self.step) / self.step;
        self.values[idx] * (1.0 - ratio) + self.values[idx + 1] * ratio
    }
}

#[cfg(test)]
mod test {
    use super::LookupTable;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn basic_lut() {
        let lut = LookupTable::from_samples(31, 5.0, |x| 2.0 * x);

        assert_eq!(lut.len(), 31);
        assert_eq!(lut[0], 0.0);
        assert_eq!(lut[10], 100.0);
        assert_eq!(lut.bucket(52.0), 10);
        assert_eq!(lut.bucket(54.9), 10);
        assert_eq!(lut.get(31), None);
    }

    #[test]
    fn interpolated_lut() {
        let lut = LookupTable::from_samples(5, 0.25, |x| if x < 0.5 { 1.0 } else { 3.0 });

        assert_eq!(lut.interpolate(-1.0), 1.0);
        assert_eq!(lut.interpolate(0.25), 1.0);
        assert_eq!(lut.interpolate(0.5), 3.0);
        assert_approx_eq!(lut.interpolate(0.375), 2.0);
        assert_approx_eq!(lut.interpolate(0.3125), 1.5);
        assert_eq!(lut.interpolate(100.0), 3.0);
        assert_eq!(lut.interpolate(1e30), 3.0);
        assert_eq!(lut.interpolate(f64::INFINITY), 3.0);
    }

    #[test]
    fn stateful_samples() {
        let mut calls = vec![];
        let lut = LookupTable::from_samples(4, 1.0, |x| {
            calls.push(x);
            calls.len()
        });
        assert_eq!(calls, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(lut.values(), &[1, 2, 3, 4]);
    }
}
