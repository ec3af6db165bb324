use partilha_core::GatewayError;
use partilha_domain::PageInfo;
use serde_json::Value;

/// Normalized backend response, whatever shape the endpoint used on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// Whether the backend reported success.
    pub success: bool,
    /// Records carried by the response; empty when `success` is false.
    pub data: Vec<Value>,
    /// Server message, expected when `success` is false.
    pub message: Option<String>,
    /// Pagination metadata, when the endpoint reports it.
    pub pagination: Option<PageInfo>,
}

impl ResponseEnvelope {
    /// Creates a successful envelope.
    #[must_use]
    pub fn ok(data: Vec<Value>) -> Self {
        Self {
            success: true,
            data,
            message: None,
            pagination: None,
        }
    }

    /// Creates a failed envelope.
    #[must_use]
    pub fn failed(message: Option<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            message,
            pagination: None,
        }
    }

    /// Attaches pagination metadata.
    #[must_use]
    pub fn with_pagination(mut self, pagination: PageInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Converts a failed envelope into a rejection error.
    pub fn into_result(self) -> Result<Self, GatewayError> {
        if self.success {
            return Ok(self);
        }

        Err(GatewayError::Rejected {
            message: self.message,
        })
    }
}
