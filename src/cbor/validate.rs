//! Structural checks on raw CBOR.
//!
//! Requests are walked once before any typed decoding, so that malformed
//! input is told apart from input that is well-formed but of the wrong shape.

use core::convert::{TryFrom, TryInto};

use super::error::{Error, Result};

pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

/// The initial byte of an item, with its argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Head {
    pub major: u8,
    pub additional: u8,
    pub argument: u64,
    /// bytes taken by the head itself
    pub len: usize,
}

fn take<const N: usize>(input: &[u8]) -> Result<[u8; N]> {
    input
        .get(1..1 + N)
        .ok_or(Error::DeserializeUnexpectedEnd)?
        .try_into()
        .map_err(|_| Error::DeserializeUnexpectedEnd)
}

/// Parses the head of the next item. Arguments must be minimally encoded,
/// except for the floats of major type 7 which use the same slots.
pub(crate) fn head(input: &[u8]) -> Result<Head> {
    let initial = *input.first().ok_or(Error::DeserializeUnexpectedEnd)?;
    let major = initial >> 5;
    let additional = initial & 0x1f;

    let (argument, len, minimum) = match additional {
        0..=23 => (additional as u64, 1, 0),
        24 => (u8::from_be_bytes(take::<1>(input)?) as u64, 2, 24),
        25 => (u16::from_be_bytes(take::<2>(input)?) as u64, 3, 0x100),
        26 => (u32::from_be_bytes(take::<4>(input)?) as u64, 5, 0x1_0000),
        27 => (u64::from_be_bytes(take::<8>(input)?), 9, 0x1_0000_0000),
        28..=30 => return Err(Error::DeserializeReservedValue),
        _ => {
            return Err(if major == MAJOR_SIMPLE {
                Error::DeserializeUnexpectedBreak
            } else {
                Error::DeserializeIndefiniteLength
            })
        }
    };

    if major != MAJOR_SIMPLE && argument < minimum {
        return Err(Error::DeserializeNonMinimal);
    }

    Ok(Head { major, additional, argument, len })
}

fn length(argument: u64) -> Result<usize> {
    usize::try_from(argument).map_err(|_| Error::DeserializeUnexpectedEnd)
}

/// Walks one complete item, returning its major type and encoded size.
fn item(input: &[u8], depth: usize) -> Result<(u8, usize)> {
    let head = head(input)?;
    let mut offset = head.len;

    match head.major {
        MAJOR_UNSIGNED | MAJOR_NEGATIVE => {}
        MAJOR_BYTES | MAJOR_TEXT => {
            let len = length(head.argument)?;
            let content = input
                .get(offset..)
                .and_then(|rest| rest.get(..len))
                .ok_or(Error::DeserializeUnexpectedEnd)?;
            if head.major == MAJOR_TEXT {
                core::str::from_utf8(content).map_err(|_| Error::DeserializeBadUtf8)?;
            }
            offset += len;
        }
        MAJOR_ARRAY | MAJOR_MAP | MAJOR_TAG => {
            if depth == 0 {
                return Err(Error::DeserializeNestingTooDeep);
            }
            let items = match head.major {
                MAJOR_ARRAY => head.argument,
                // a tag wraps exactly one item
                MAJOR_TAG => 1,
                _ => head
                    .argument
                    .checked_mul(2)
                    .ok_or(Error::DeserializeUnexpectedEnd)?,
            };
            // every item takes at least one byte, so this terminates early
            // on absurd counts
            for _ in 0..items {
                let (_, used) = item(&input[offset..], depth - 1)?;
                offset += used;
            }
        }
        _ => {
            if head.additional == 24 && head.argument < 32 {
                return Err(Error::DeserializeBadSimple);
            }
        }
    }

    Ok((head.major, offset))
}

/// Size of the next item, which may be followed by more data.
pub(crate) fn skip_item(input: &[u8], max_nesting: usize) -> Result<usize> {
    item(input, max_nesting).map(|(_, used)| used)
}

/// Checks that `input` is exactly one well-formed item in canonical
/// encoding (definite lengths, minimal arguments), with arrays and maps
/// nested at most `max_nesting` deep. Returns the item's major type.
///
/// Map key order and duplicate keys are not checked here.
pub fn validate_item(input: &[u8], max_nesting: usize) -> Result<u8> {
    let (major, used) = item(input, max_nesting)?;
    if used != input.len() {
        return Err(Error::DeserializeTrailingData);
    }
    Ok(major)
}
