//! Room code allocation and room form validation.
//!
//! Each floor reserves an eight-slot code namespace derived from its number
//! (`100n + 1` through `100n + 8`), so namespaces of distinct floors never
//! overlap. The allocator works on snapshots fetched from the system of
//! record; it never mutates state itself.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::domain::{Floor, FloorId, Room, RoomStatus};

/// Maximum number of rooms a floor can hold.
pub const ROOMS_PER_FLOOR: u32 = 8;

/// Code namespace reserved for a floor number.
pub const fn code_range(floor_number: u32) -> RangeInclusive<u32> {
    let base = floor_number * 100;
    base + 1..=base + ROOMS_PER_FLOOR
}

fn codes_on_floor(floor: &Floor, rooms: &[Room]) -> Vec<u32> {
    rooms
        .iter()
        .filter(|room| room.floor_id == floor.id)
        .map(|room| room.code)
        .collect()
}

/// Candidate codes for creating a room on `floor`, ascending. A floor
/// already holding eight rooms yields an empty set; callers disable
/// creation rather than erroring.
pub fn available_codes(floor: &Floor, rooms: &[Room]) -> Vec<u32> {
    let used = codes_on_floor(floor, rooms);
    code_range(floor.number)
        .filter(|code| !used.contains(code))
        .collect()
}

/// Candidate codes when editing `room`: the free codes of its floor plus
/// the room's own current code, re-sorted ascending. Keeping the same code
/// is always a legal change.
pub fn available_codes_for_editing(floor: &Floor, rooms: &[Room], room: &Room) -> Vec<u32> {
    let mut codes = available_codes(floor, rooms);
    if !codes.contains(&room.code) {
        codes.push(room.code);
        codes.sort_unstable();
    }
    codes
}

/// Parses a raw code field into an integer. Anything non-numeric yields
/// `None`; callers treat that as invalid input, never as a crash.
pub fn parse_room_code(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Parses a raw rent field. Valid iff it is a finite number `>= 0`.
pub fn parse_rent(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn validate_rent(raw: &str) -> bool {
    parse_rent(raw).is_some()
}

/// Raw form fields for creating or editing a room.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomDraft {
    pub floor_id: FloorId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub rent: String,
}

/// Validated payload ready to be submitted to the system of record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRoom {
    pub floor_id: FloorId,
    pub code: u32,
    pub rent: f64,
    pub status: RoomStatus,
}

/// Rejection reasons for a room submission. Always recoverable; surfaced to
/// the caller as a message, never a panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomValidationError {
    #[error("floor {0} already holds the maximum of {} rooms", ROOMS_PER_FLOOR)]
    FloorFull(u32),
    #[error("enter a valid room code")]
    InvalidCode,
    #[error("room code {code} is outside the range {lo}-{hi} for floor {floor}")]
    CodeOutOfRange {
        code: u32,
        floor: u32,
        lo: u32,
        hi: u32,
    },
    #[error("room code {0} is already in use on this floor")]
    CodeTaken(u32),
    #[error("enter a valid rent amount")]
    InvalidRent,
}

/// Validates a room draft against the floor's current rooms. `editing`
/// carries the room being edited, whose own code stays legal. Checks
/// short-circuit in order: capacity, code parse, code range, code
/// uniqueness, rent.
pub fn validate_draft(
    draft: &RoomDraft,
    floor: &Floor,
    rooms: &[Room],
    editing: Option<&Room>,
) -> Result<NewRoom, RoomValidationError> {
    let candidates = match editing {
        Some(room) => available_codes_for_editing(floor, rooms, room),
        None => available_codes(floor, rooms),
    };

    if candidates.is_empty() {
        return Err(RoomValidationError::FloorFull(floor.number));
    }

    let code = parse_room_code(&draft.code).ok_or(RoomValidationError::InvalidCode)?;

    let range = code_range(floor.number);
    if !range.contains(&code) {
        return Err(RoomValidationError::CodeOutOfRange {
            code,
            floor: floor.number,
            lo: *range.start(),
            hi: *range.end(),
        });
    }

    if !candidates.contains(&code) {
        return Err(RoomValidationError::CodeTaken(code));
    }

    let rent = parse_rent(&draft.rent).ok_or(RoomValidationError::InvalidRent)?;

    Ok(NewRoom {
        floor_id: floor.id,
        code,
        rent,
        status: RoomStatus::Disponible,
    })
}
