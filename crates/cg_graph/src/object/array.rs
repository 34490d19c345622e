use alloc::vec;
use alloc::vec::Vec;

use thiserror::Error;

use crate::object::ArgumentMismatch;
use crate::value::Value;

/// `shape` does not describe `len` elements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("shape {shape:?} does not hold {len} elements")]
pub struct ShapeError {
    pub shape: Vec<usize>,
    pub len: usize,
}

/// A dense, row-major array of numbers.
///
/// Written to documents as nested sequences, one nesting level per
/// dimension, and read back from any rectangular nesting of numbers.
///
/// As with numpy's `tolist`, a dimension of length zero hides every
/// dimension after it: shape `[0, 3]` is written as `[]` and read back as
/// shape `[0]`.
///
/// ```
/// use cg_graph::object::NumericArray;
/// use cg_graph::value::Value;
///
/// let array = NumericArray::new(vec![2, 2], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
/// let value = array.to_value();
/// assert_eq!(
///     value,
///     Value::Seq(vec![
///         Value::Seq(vec![1.0.into(), 0.0.into()]),
///         Value::Seq(vec![0.0.into(), 1.0.into()]),
///     ])
/// );
/// assert_eq!(NumericArray::from_value(&value).unwrap(), array);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, ShapeError> {
        if element_count(&shape) != Some(data.len()) {
            return Err(ShapeError {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// A one-dimensional array.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The nested-sequence document form.
    pub fn to_value(&self) -> Value {
        nest(&self.shape, &self.data)
    }

    /// Reads a rectangular nesting of numbers.
    pub fn from_value(value: &Value) -> Result<Self, ArgumentMismatch> {
        let mut shape = Vec::new();
        let mut cursor = value;
        while let Value::Seq(items) = cursor {
            shape.push(items.len());
            match items.first() {
                Some(first) => cursor = first,
                None => break,
            }
        }

        // The shape only follows the first element of each level, so it is
        // not trusted for a capacity hint until `flatten` has checked it.
        let mut data = Vec::new();
        flatten(value, &shape, &mut data)?;
        Ok(Self { shape, data })
    }
}

fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &len| acc.checked_mul(len))
}

fn nest(shape: &[usize], data: &[f64]) -> Value {
    match shape.split_first() {
        // A zero-dimensional array holds exactly one element.
        None => Value::Float(data.first().copied().unwrap_or_default()),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            Value::Seq(
                (0..len)
                    .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                    .collect(),
            )
        }
    }
}

fn flatten(value: &Value, shape: &[usize], data: &mut Vec<f64>) -> Result<(), ArgumentMismatch> {
    match (shape.split_first(), value) {
        (None, Value::Int(v)) => data.push(*v as f64),
        (None, Value::Float(v)) => data.push(*v),
        (Some((&len, rest)), Value::Seq(items)) if items.len() == len => {
            for item in items {
                flatten(item, rest, data)?;
            }
        }
        _ => {
            return Err(ArgumentMismatch::new(
                "a rectangular numeric array",
                value.kind_name(),
            ));
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests
