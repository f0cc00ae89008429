//! Error types for the cliente API client.
//!
//! # Design
//! Validation failures are raised locally and never reach the network, so
//! they get their own enum. `NotFound` keeps a dedicated variant because
//! callers distinguish "the record does not exist" from other statuses. All
//! other non-2xx responses land in `Http` with the raw status and body.
//! Transport failures are split the same way the wrapper logs them: no
//! response at all versus a request that could not be built or sent.

use thiserror::Error;

/// Rejections raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("nome, email e CPF são obrigatórios")]
    MissingRequiredFields,

    #[error("CPF deve ter 11 dígitos (recebido: {digits})")]
    InvalidCpfLength { digits: usize },

    #[error("status inválido: {0:?}")]
    InvalidStatus(String),
}

/// Errors returned by the transport wrapper and the service layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// No record in the list carries this CPF.
    #[error("cliente não encontrado para o CPF {cpf}")]
    CpfNotFound { cpf: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request was sent but nothing came back.
    #[error("no response from {base_url}: {message}")]
    NoResponse { base_url: String, message: String },

    /// The request could not be constructed or sent.
    #[error("request failed: {0}")]
    Request(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Map a non-success status to the matching variant.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 404 {
            return ApiError::NotFound;
        }
        ApiError::Http { status, body }
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

/// Category used when logging a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            400 => StatusClass::BadRequest,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            409 => StatusClass::Conflict,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            StatusClass::BadRequest => "bad request",
            StatusClass::Unauthorized => "unauthorized",
            StatusClass::Forbidden => "forbidden",
            StatusClass::NotFound => "resource not found",
            StatusClass::Conflict => "conflict (CPF or email already registered)",
            StatusClass::ServerError => "internal server error",
            StatusClass::Unknown => "unknown error",
        }
    }
}
