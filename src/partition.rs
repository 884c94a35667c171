use crate::StrError;
use std::ops::Range;

/// Holds the contiguous half-open range of elements [start, end) owned by one worker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnedRange {
    /// First owned element
    pub start: usize,

    /// One past the last owned element
    pub end: usize,
}

impl OwnedRange {
    /// Computes the range owned by `rank` among `size` workers
    ///
    /// The n_element elements are split evenly; the remainder goes to the lowest ranks:
    ///
    /// ```text
    /// start = rank (M / size) + min(M % size, rank)
    /// end   = start + M / size + (1 if M % size > rank else 0)
    /// ```
    pub fn new(n_element: usize, rank: usize, size: usize) -> Result<Self, StrError> {
        if size < 1 {
            return Err("the number of workers must be ≥ 1");
        }
        if rank >= size {
            return Err("rank must be smaller than the number of workers");
        }
        let base = n_element / size;
        let rem = n_element % size;
        let start = rank * base + usize::min(rem, rank);
        let end = start + base + usize::from(rem > rank);
        Ok(OwnedRange { start, end })
    }

    /// Returns the range covering all elements (single worker)
    pub fn all(n_element: usize) -> Self {
        OwnedRange {
            start: 0,
            end: n_element,
        }
    }

    /// Returns the number of owned elements
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Tells whether no element is owned
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Returns an iterator over the owned element indices
    pub fn elements(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Computes the ranges owned by all `size` workers (in rank order)
pub fn partition_elements(n_element: usize, size: usize) -> Result<Vec<OwnedRange>, StrError> {
    (0..size).map(|rank| OwnedRange::new(n_element, rank, size)).collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
