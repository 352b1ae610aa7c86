use engine_logging::engine_debug;
use serde::Deserialize;
use serde_json::Value;
use timeline_core::RawRecord;

/// Key under which the backend nests post objects.
const RECORD_KEY: &str = "legacy";

#[derive(Debug, Deserialize)]
struct TimelineEnvelope {
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    user: UserNode,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    result: UserResult,
}

#[derive(Debug, Deserialize)]
struct UserResult {
    #[serde(alias = "timeline_v2")]
    timeline: TimelineHolder,
}

#[derive(Debug, Deserialize)]
struct TimelineHolder {
    timeline: Timeline,
}

// Instructions vary by type (added entries, pinned entries, module items), so
// each one stays untyped and is searched whole.
#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(default)]
    instructions: Vec<Value>,
}

/// Records carried by one timeline page.
///
/// Walks the known `data.user.result.timeline.timeline.instructions[]` envelope
/// and searches every instruction; a page whose envelope does not match is
/// searched as a whole.
pub fn page_records(text: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    match serde_json::from_str::<TimelineEnvelope>(text) {
        Ok(envelope) => {
            let mut records = Vec::new();
            for instruction in &envelope.data.user.result.timeline.timeline.instructions {
                records.extend(records_under(instruction));
            }
            Ok(records)
        }
        Err(err) => {
            engine_debug!("Timeline envelope not recognised ({}), searching whole page", err);
            let value: Value = serde_json::from_str(text)?;
            Ok(records_under(&value))
        }
    }
}

fn records_under(value: &Value) -> Vec<RawRecord> {
    let mut found = Vec::new();
    deep_search(value, RECORD_KEY, &mut found);
    found.into_iter().filter_map(RawRecord::from_value).collect()
}

/// Collects every value stored under `key`, parents before their descendants.
fn deep_search<'v>(value: &'v Value, key: &str, found: &mut Vec<&'v Value>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                if name == key {
                    found.push(child);
                }
                deep_search(child, key, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                deep_search(item, key, found);
            }
        }
        _ => {}
    }
}
