/// Offsec Program - Database models.
pub mod asset;
pub mod comment;
pub mod engagement;
pub mod finding;
pub mod intake;
pub mod program_year;
pub mod timeline;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserializer for nullable PATCH fields where an explicit JSON null must
/// be distinguishable from an absent field: absent stays `None`, null
/// becomes `Some(None)` (clear the column), a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
