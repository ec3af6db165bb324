use partilha_application::ResponseEnvelope;
use partilha_domain::{DEFAULT_PAGE_SIZE, PageInfo, RequestDescriptor};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Every response shape the backend is known to produce.
///
/// Objects carrying `success` are always envelopes and objects carrying
/// `results` with a numeric `count` are cursor listings, whatever the types
/// of their other fields. Only the remaining objects are single records.
#[derive(Debug)]
pub(super) enum WireResponse {
    Envelope(WireEnvelope),
    Cursor(WireCursor),
    Bare(Vec<Value>),
    Single(Map<String, Value>),
}

#[derive(Debug)]
pub(super) struct WireEnvelope {
    success: bool,
    data: Value,
    message: Option<String>,
    pagination: Option<WirePagination>,
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    total_pages: Option<u32>,
}

#[derive(Debug)]
pub(super) struct WireCursor {
    results: Vec<Value>,
    count: u64,
    next: Option<String>,
    previous: Option<String>,
}

impl WireResponse {
    /// Classifies a decoded JSON body by shape.
    pub(super) fn from_value(value: Value) -> Result<Self, String> {
        let mut object = match value {
            Value::Array(records) => return Ok(Self::Bare(records)),
            Value::Object(object) => object,
            other => return Err(format!("expected a JSON object or array, got {other}")),
        };

        if let Some(success) = object.remove("success") {
            let Some(success) = success.as_bool() else {
                return Err(format!("envelope field 'success' is not a boolean: {success}"));
            };
            return Ok(Self::Envelope(WireEnvelope {
                success,
                data: object.remove("data").unwrap_or(Value::Null),
                message: text_field(&object, "message"),
                pagination: object
                    .remove("pagination")
                    .and_then(|pagination| serde_json::from_value(pagination).ok()),
            }));
        }

        let count = object.get("count").and_then(Value::as_u64);
        let has_results = matches!(object.get("results"), Some(Value::Array(_)));
        if let (true, Some(count)) = (has_results, count) {
            let results = match object.remove("results") {
                Some(Value::Array(results)) => results,
                _ => Vec::new(),
            };
            return Ok(Self::Cursor(WireCursor {
                results,
                count,
                next: text_field(&object, "next"),
                previous: text_field(&object, "previous"),
            }));
        }

        Ok(Self::Single(object))
    }

    /// Normalizes the wire shape; cursor listings take page and limit from
    /// the request that produced them.
    pub(super) fn normalize(self, descriptor: Option<&RequestDescriptor>) -> ResponseEnvelope {
        match self {
            Self::Envelope(envelope) => {
                let normalized = if envelope.success {
                    ResponseEnvelope::ok(into_records(envelope.data))
                } else {
                    ResponseEnvelope::failed(None)
                };
                let normalized = ResponseEnvelope {
                    message: envelope.message,
                    ..normalized
                };

                match envelope.pagination {
                    Some(pagination) => normalized.with_pagination(PageInfo::numbered(
                        pagination.page.unwrap_or(1),
                        pagination.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                        pagination.total.unwrap_or_default(),
                        pagination.total_pages,
                    )),
                    None => normalized,
                }
            }
            Self::Cursor(cursor) => {
                let page = descriptor.and_then(RequestDescriptor::page).unwrap_or(1);
                let limit = descriptor
                    .and_then(RequestDescriptor::page_size)
                    .unwrap_or(DEFAULT_PAGE_SIZE);

                ResponseEnvelope::ok(cursor.results).with_pagination(PageInfo::cursor(
                    page,
                    limit,
                    cursor.count,
                    cursor.next,
                    cursor.previous,
                ))
            }
            Self::Bare(records) => ResponseEnvelope::ok(records),
            Self::Single(record) => ResponseEnvelope::ok(vec![Value::Object(record)]),
        }
    }
}

fn text_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn into_records(data: Value) -> Vec<Value> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(records) => records,
        record => vec![record],
    }
}
