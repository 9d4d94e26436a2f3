use std::fmt;

/// Dimensions of an operator domain or codomain.
///
/// Data is always handed to operators as a flat slice in row-major
/// order; the shape records how that slice is to be interpreted and is
/// what construction-time compatibility checks compare.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// The same shape stacked `n` times along a new leading dimension.
    ///
    /// With row-major layout the `k`-th slab occupies the contiguous
    /// range `k * numel() .. (k + 1) * numel()` of the flat slice.
    pub fn with_leading(&self, n: usize) -> Shape {
        let mut dims = Vec::with_capacity(self.0.len() + 1);
        dims.push(n);
        dims.extend_from_slice(&self.0);
        Shape(dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape(dims.to_vec())
    }
}

/// One-dimensional shape of length `n`.
impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape(vec![n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numel_is_product_of_dims() {
        assert_eq!(Shape::from([4, 3, 2]).numel(), 24);
        assert_eq!(Shape::from(7).numel(), 7);
        assert_eq!(Shape::new(vec![]).numel(), 1);
    }

    #[test]
    fn leading_dimension_stacks_in_front() {
        let base = Shape::from([4, 3]);
        let stacked = base.with_leading(5);
        assert_eq!(stacked.dims(), &[5, 4, 3]);
        assert_eq!(stacked.numel(), 60);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Shape::from([2, 8]).to_string(), "[2x8]");
        assert_eq!(Shape::from(3).to_string(), "[3]");
    }
}
