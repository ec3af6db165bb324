use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code attached when a request was sent but no response arrived.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";

/// Error code attached when no credential was available for the request.
pub const UNAUTHENTICATED_CODE: &str = "UNAUTHENTICATED";

/// Error code attached when a 2xx envelope reported `success: false`.
pub const REQUEST_REJECTED_CODE: &str = "REQUEST_REJECTED";

/// Error code attached to failures that fit no other category.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Fixed sentence shown when the backend could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Erro de conexão com o servidor. Verifique sua internet e tente novamente.";

/// Fixed sentence shown when a listing fails without a server message.
pub const LOAD_FAILURE_MESSAGE: &str = "Não foi possível carregar os dados.";

/// Fixed sentence shown when an unknown failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Ocorreu um erro inesperado. Tente novamente.";

/// Raw failure produced at the remote gateway boundary.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No credential was available, so no request was sent.
    #[error("no credential available for authenticated request")]
    Unauthenticated,

    /// The request was sent but no response arrived.
    #[error("no response received: {0}")]
    Network(String),

    /// A response arrived with a non-2xx status.
    #[error("HTTP {status} {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Message extracted from the response body, when present.
        server_message: Option<String>,
    },

    /// A 2xx envelope reported `success: false`.
    #[error("request rejected by server: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected {
        /// Message carried by the envelope, when present.
        message: Option<String>,
    },

    /// A failure that has already been classified.
    #[error("{0}")]
    Classified(ClassifiedError),

    /// Uncategorized failure.
    #[error("{0}")]
    Unknown(String),
}

impl From<ClassifiedError> for GatewayError {
    fn from(value: ClassifiedError) -> Self {
        Self::Classified(value)
    }
}

/// Coarse error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential available.
    Unauthenticated,
    /// Request sent, no response received.
    Network,
    /// Caller-visible input rejection (400 or 422).
    Validation,
    /// Any other response with a non-2xx status.
    Http(u16),
    /// Uncategorized.
    Unknown,
}

/// Normalized error carrying a status code and an optional stable code.
///
/// `status` is `0` when no HTTP status applies (network and unknown failures).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ClassifiedError {
    message: String,
    status: u16,
    code: Option<String>,
}

impl ClassifiedError {
    /// Creates a classified error.
    #[must_use]
    pub fn new(message: impl Into<String>, status: u16, code: Option<String>) -> Self {
        Self {
            message: message.into(),
            status,
            code,
        }
    }

    /// Returns the raw message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the HTTP status, `0` when none applies.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the stable error code, when one was assigned.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the coarse category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match (self.status, self.code()) {
            (_, Some(UNAUTHENTICATED_CODE)) => ErrorKind::Unauthenticated,
            (0, Some(NETWORK_ERROR_CODE)) => ErrorKind::Network,
            (400 | 422, _) => ErrorKind::Validation,
            (0, _) => ErrorKind::Unknown,
            (status, _) => ErrorKind::Http(status),
        }
    }

    /// Renders the localized sentence shown to end users.
    #[must_use]
    pub fn user_message(&self) -> String {
        let fixed = match self.status {
            400 => "Dados inválidos. Verifique as informações enviadas.",
            401 => "Sua sessão expirou. Faça login novamente.",
            403 => "Você não tem permissão para realizar esta ação.",
            404 => "Registro não encontrado.",
            409 => "Conflito: já existe um registro com estes dados.",
            422 => "Falha na validação dos dados enviados.",
            500 => "Erro interno do servidor. Tente novamente mais tarde.",
            _ if self.message.trim().is_empty() => UNKNOWN_ERROR_MESSAGE,
            _ => return self.message.clone(),
        };

        fixed.to_owned()
    }
}

/// Classifies a raw gateway failure.
///
/// Already-classified errors pass through unchanged.
#[must_use]
pub fn classify(error: GatewayError) -> ClassifiedError {
    match error {
        GatewayError::Classified(classified) => classified,
        GatewayError::Http {
            status,
            status_text,
            server_message,
        } => {
            let message = server_message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(status_text);
            ClassifiedError::new(message, status, None)
        }
        GatewayError::Network(_) => ClassifiedError::new(
            NETWORK_ERROR_MESSAGE,
            0,
            Some(NETWORK_ERROR_CODE.to_owned()),
        ),
        GatewayError::Unauthenticated => ClassifiedError::new(
            "no credential available",
            401,
            Some(UNAUTHENTICATED_CODE.to_owned()),
        ),
        GatewayError::Rejected { message } => ClassifiedError::new(
            message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned()),
            0,
            Some(REQUEST_REJECTED_CODE.to_owned()),
        ),
        GatewayError::Unknown(message) => {
            ClassifiedError::new(message, 0, Some(UNKNOWN_ERROR_CODE.to_owned()))
        }
    }
}
