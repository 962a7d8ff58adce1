//! Placeholder business objects.
//!
//! The client is generic over whatever serde types the caller passes in;
//! these two records exist so callers and tests have a ready-made named
//! payload to send and decode.

use serde::{Deserialize, Serialize};

/// A named model record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
}

/// A named report record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
}
