use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppResult;
use crate::places::PlaceRecord;

pub const PLACES_TABLE: &str = "places";
pub const PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub primary_key: Vec<&'static str>,
}

/// Response shape expected by the ingestion pipeline's connector protocol.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub state: Map<String, Value>,
    pub schema: BTreeMap<&'static str, TableSchema>,
    pub insert: BTreeMap<&'static str, Vec<PlaceRecord>>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl Envelope {
    /// Compact JSON with non-ASCII characters written as-is.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn assemble(records: Vec<PlaceRecord>) -> Envelope {
    assemble_with_state(records, Map::new())
}

/// The full result set always goes out in one response, so `hasMore` is false.
pub fn assemble_with_state(records: Vec<PlaceRecord>, state: Map<String, Value>) -> Envelope {
    Envelope {
        state,
        schema: BTreeMap::from([(
            PLACES_TABLE,
            TableSchema {
                primary_key: vec![PRIMARY_KEY],
            },
        )]),
        insert: BTreeMap::from([(PLACES_TABLE, records)]),
        has_more: false,
    }
}
