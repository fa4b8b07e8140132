//! Utilities for working with probabilities.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);

    /// Index of the largest element; ties go to the lowest index. `None` if the slice is empty.
    fn argmax(&self) -> Option<usize>;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Rescales the slice so that its elements add up to `target`, returning the sum prior to
    /// scaling.
    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &value) in self.iter().enumerate() {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((index, value)),
            }
        }
        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn sum() {
        let data = [0.0, 0.1, 0.2];
        assert_float_absolute_eq!(0.3, data.sum());
    }

    #[test]
    fn normalise() {
        let mut data = [0.05, 0.1, 0.15, 0.2];
        let sum = data.normalise(1.0);
        assert_float_absolute_eq!(0.5, sum);
        assert_float_absolute_eq!(1.0, data.sum());
        assert_float_absolute_eq!(0.1, data[0]);
        assert_float_absolute_eq!(0.4, data[3]);
    }

    #[test]
    fn scale() {
        let mut data = [0.5, 1.0];
        data.scale(3.0);
        assert_eq!([1.5, 3.0], data);
    }

    #[test]
    fn argmax_first_of_ties() {
        assert_eq!(Some(1), [0.1, 0.4, 0.4, 0.1].argmax());
        assert_eq!(Some(0), [0.3].argmax());
        assert_eq!(None, <[f64]>::argmax(&[]));
    }
}
