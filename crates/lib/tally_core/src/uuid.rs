// Helper for generating UUIDv7 (timestamp-sortable UUIDs).
//
// Ids are generated app-side for every table so the in-memory and
// PostgreSQL stores hand out the same shape of identifier.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a client-supplied id, returning `None` for anything that is not a UUID.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
