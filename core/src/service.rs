//! Record service: maps canonical input to backend payloads and back.
//!
//! Validation happens here, before anything is handed to the transport
//! wrapper. Lookups the backend has no endpoint for (by CPF, email
//! availability, filters) fetch the full list and scan it in memory. Those
//! scans are advisory and race with concurrent writers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::format::normalize_cpf;
use crate::http::HttpResponse;
use crate::transport::Transport;
use crate::types::{Cliente, ClienteFilter, ClienteInput, ClienteStatus, StatusPatch};

const CLIENTES: &str = "/Clientes";

pub struct ClienteService<T> {
    api: ApiClient<T>,
}

impl<T: Transport> ClienteService<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }

    pub fn list_all(&self) -> Result<Vec<Cliente>, ApiError> {
        self.fetch_all()
            .inspect_err(|e| error!(error = %e, "failed to list clientes"))
    }

    pub fn get_by_id(&self, id: u64) -> Result<Cliente, ApiError> {
        self.api
            .get(&format!("{CLIENTES}/{id}"))
            .and_then(parse_json)
            .inspect_err(|e| error!(id, error = %e, "failed to fetch cliente"))
    }

    /// Scan the full list for a CPF; punctuation is ignored on both sides.
    pub fn get_by_cpf(&self, cpf: &str) -> Result<Cliente, ApiError> {
        let wanted = normalize_cpf(cpf);
        self.fetch_all()
            .and_then(|clientes| {
                clientes
                    .into_iter()
                    .find(|c| normalize_cpf(&c.cpf) == wanted)
                    .ok_or_else(|| ApiError::CpfNotFound {
                        cpf: cpf.to_string(),
                    })
            })
            .inspect_err(|e| error!(cpf, error = %e, "failed to find cliente by CPF"))
    }

    /// Returns the created record when the backend echoes it.
    pub fn create(&self, input: ClienteInput) -> Result<Option<Cliente>, ApiError> {
        encode(input)
            .and_then(|body| self.api.post(CLIENTES, body))
            .and_then(parse_optional)
            .inspect(|_| info!("cliente created"))
            .inspect_err(|e| error!(error = %e, "failed to create cliente"))
    }

    /// Full-record replacement.
    pub fn update(&self, id: u64, input: ClienteInput) -> Result<Option<Cliente>, ApiError> {
        encode(input)
            .and_then(|body| self.api.put(&format!("{CLIENTES}/{id}"), body))
            .and_then(parse_optional)
            .inspect(|_| info!(id, "cliente updated"))
            .inspect_err(|e| error!(id, error = %e, "failed to update cliente"))
    }

    /// An empty 2xx body counts as success.
    pub fn delete(&self, id: u64) -> Result<bool, ApiError> {
        self.api
            .delete(&format!("{CLIENTES}/{id}"))
            .map(|_| {
                info!(id, "cliente deleted");
                true
            })
            .inspect_err(|e| error!(id, error = %e, "failed to delete cliente"))
    }

    pub fn set_status(&self, id: u64, status: ClienteStatus) -> Result<Option<Cliente>, ApiError> {
        to_json(&StatusPatch { status })
            .and_then(|body| self.api.patch(&format!("{CLIENTES}/{id}/status"), body))
            .and_then(parse_optional)
            .inspect_err(|e| error!(id, %status, error = %e, "failed to change cliente status"))
    }

    /// Whether no other record holds `email`.
    ///
    /// `exclude_id` skips the record being edited so its own address does
    /// not count against it.
    pub fn check_email_available(&self, email: &str, exclude_id: Option<u64>) -> Result<bool, ApiError> {
        self.fetch_all()
            .map(|clientes| {
                !clientes
                    .iter()
                    .any(|c| c.email == email && exclude_id != Some(c.id))
            })
            .inspect_err(|e| error!(email, error = %e, "failed to check email availability"))
    }

    pub fn filter(&self, criteria: &ClienteFilter) -> Result<Vec<Cliente>, ApiError> {
        self.fetch_all()
            .map(|clientes| clientes.into_iter().filter(|c| criteria.matches(c)).collect())
            .inspect_err(|e| error!(error = %e, "failed to filter clientes"))
    }

    fn fetch_all(&self) -> Result<Vec<Cliente>, ApiError> {
        self.api.get(CLIENTES).and_then(parse_json)
    }
}

fn encode(input: ClienteInput) -> Result<String, ApiError> {
    let payload = input.into_payload()?;
    to_json(&payload)
}

fn to_json<S: Serialize>(value: &S) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_json<D: DeserializeOwned>(response: HttpResponse) -> Result<D, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_optional<D: DeserializeOwned>(response: HttpResponse) -> Result<Option<D>, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(None);
    }
    parse_json(response).map(Some)
}
