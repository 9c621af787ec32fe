//! Multipart upload domain types
//!
//! An object is split into ordered byte ranges, each uploaded as a part
//! tagged with its 1-based number. The service returns a completion token
//! (ETag) per part, and the upload is finalized with the full ascending
//! list of `(number, token)` pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MultipartError;

/// Smallest part the service accepts, except for the last part of an object
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Largest part the service accepts
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Largest number of parts in one upload
pub const MAX_PARTS: u64 = 10_000;

/// Default part size used by the uploader
pub const DEFAULT_PART_SIZE: u64 = MIN_PART_SIZE;

/// A contiguous byte range of the source object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRange {
    /// 1-based part number
    pub number: i32,
    pub offset: u64,
    pub length: u64,
}

impl PartRange {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Ordered split of an object into parts of a fixed size
///
/// The last part holds the remainder. An empty object is planned as a
/// single zero-length part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPlan {
    object_size: u64,
    part_size: u64,
    parts: Vec<PartRange>,
}

impl PartPlan {
    /// Plans an object of `object_size` bytes using parts of `part_size` bytes
    pub fn new(object_size: u64, part_size: u64) -> Result<Self, MultipartError> {
        if part_size < MIN_PART_SIZE {
            return Err(MultipartError::PartSizeTooSmall {
                size: part_size,
                min: MIN_PART_SIZE,
            });
        }

        if part_size > MAX_PART_SIZE {
            return Err(MultipartError::PartSizeTooLarge {
                size: part_size,
                max: MAX_PART_SIZE,
            });
        }

        let count = object_size.div_ceil(part_size).max(1);
        if count > MAX_PARTS {
            return Err(MultipartError::TooManyParts {
                size: object_size,
                parts: count,
                max: MAX_PARTS,
            });
        }

        let parts = (0..count)
            .map(|index| {
                let offset = index * part_size;
                PartRange {
                    number: (index + 1) as i32,
                    offset,
                    length: part_size.min(object_size - offset),
                }
            })
            .collect();

        Ok(Self {
            object_size,
            part_size,
            parts,
        })
    }

    pub fn object_size(&self) -> u64 {
        self.object_size
    }

    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    pub fn parts(&self) -> &[PartRange] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Acknowledgement of one uploaded part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    pub number: i32,
    /// Completion token returned by the service (the part's ETag)
    pub token: String,
}

impl CompletedPart {
    pub fn new(number: i32, token: impl Into<String>) -> Self {
        Self {
            number,
            token: token.into(),
        }
    }
}

/// Collects part acknowledgements in any order and hands them back in
/// ascending order once the sequence is known to be complete
#[derive(Debug, Clone, Default)]
pub struct CompletedParts {
    parts: BTreeMap<i32, String>,
    expected: Option<usize>,
}

impl CompletedParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires exactly `count` parts (numbered `1..=count`) at finalize time
    pub fn expecting(count: usize) -> Self {
        Self {
            parts: BTreeMap::new(),
            expected: Some(count),
        }
    }

    /// Sets the number of parts required at finalize time
    pub fn set_expected(&mut self, count: usize) {
        self.expected = Some(count);
    }

    /// Records an acknowledgement; numbers must be unique and in range
    pub fn record(&mut self, part: CompletedPart) -> Result<(), MultipartError> {
        if part.number < 1 || part.number as u64 > MAX_PARTS {
            return Err(MultipartError::InvalidPartNumber(part.number));
        }
        if self.parts.contains_key(&part.number) {
            return Err(MultipartError::DuplicatePart(part.number));
        }
        self.parts.insert(part.number, part.token);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the parts sorted by number, rejecting any gap
    pub fn finalize(&self) -> Result<Vec<CompletedPart>, MultipartError> {
        let last = match (self.expected, self.parts.keys().next_back()) {
            (Some(0), _) | (None, None) => return Err(MultipartError::NoParts),
            (Some(count), _) => count as i32,
            (None, Some(max)) => *max,
        };

        for number in 1..=last {
            if !self.parts.contains_key(&number) {
                return Err(MultipartError::MissingPart(number));
            }
        }
        if let Some(extra) = self.parts.keys().find(|number| **number > last) {
            return Err(MultipartError::InvalidPartNumber(*extra));
        }

        Ok(self
            .parts
            .iter()
            .map(|(number, token)| CompletedPart::new(*number, token.clone()))
            .collect())
    }
}
