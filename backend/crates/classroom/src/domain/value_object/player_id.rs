use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Row id of a player, assigned by the database on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(i64);

impl PlayerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}
