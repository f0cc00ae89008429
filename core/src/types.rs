//! Domain DTOs for the cliente API.
//!
//! # Design
//! `Cliente` mirrors the backend's wire record. Input flows through one
//! canonical type, `ClienteInput`; `ClientePayload` is what goes over the
//! wire after normalization and validation. Callers holding records with
//! mixed field casing go through `LegacyClienteInput` explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::format::{date_for_transport, normalize_cpf, DateInput};

/// Registration status. Wire values are exactly `Ativo` and `Inativo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClienteStatus {
    #[default]
    Ativo,
    Inativo,
}

impl ClienteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClienteStatus::Ativo => "Ativo",
            ClienteStatus::Inativo => "Inativo",
        }
    }
}

impl fmt::Display for ClienteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClienteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ativo" => Ok(ClienteStatus::Ativo),
            "Inativo" => Ok(ClienteStatus::Inativo),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A cliente record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: u64,
    pub nome: String,
    pub email: String,
    pub cpf: String,
    /// Missing or `null` reads as `Ativo`.
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: ClienteStatus,
    #[serde(default)]
    pub data_nascimento: Option<String>,
    #[serde(default)]
    pub data_inclusao: Option<String>,
}

fn status_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ClienteStatus, D::Error> {
    Option::<ClienteStatus>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Canonical create/update input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClienteInput {
    pub nome: String,
    pub email: String,
    /// Any punctuation is stripped before validation.
    pub cpf: String,
    /// `None` means `Ativo`.
    pub status: Option<ClienteStatus>,
    pub data_nascimento: Option<DateInput>,
}

impl ClienteInput {
    /// Normalize and validate into the wire payload.
    pub fn into_payload(self) -> Result<ClientePayload, ValidationError> {
        let payload = ClientePayload {
            cpf: normalize_cpf(&self.cpf),
            status: self.status.unwrap_or_default(),
            data_nascimento: date_for_transport(self.data_nascimento.as_ref()),
            nome: self.nome,
            email: self.email,
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// Request body for POST and PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientePayload {
    pub nome: String,
    pub email: String,
    pub cpf: String,
    pub status: ClienteStatus,
    pub data_nascimento: Option<String>,
}

impl ClientePayload {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.nome.is_empty() || self.email.is_empty() || self.cpf.is_empty() {
            return Err(ValidationError::MissingRequiredFields);
        }
        if self.cpf.len() != 11 {
            return Err(ValidationError::InvalidCpfLength {
                digits: self.cpf.len(),
            });
        }
        Ok(())
    }
}

/// Request body for `PATCH /Clientes/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: ClienteStatus,
}

/// Input from callers that send either camelCase or PascalCase field names.
///
/// The lower-case field wins when it is present and non-empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyClienteInput {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default, rename = "Nome")]
    pub nome_pascal: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "Email")]
    pub email_pascal: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default, rename = "CPF")]
    pub cpf_upper: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "Status")]
    pub status_pascal: Option<String>,
    #[serde(default, rename = "dataNascimento")]
    pub data_nascimento: Option<String>,
    #[serde(default, rename = "DataNascimento")]
    pub data_nascimento_pascal: Option<String>,
}

fn first_filled(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.filter(|v| !v.is_empty()))
}

impl TryFrom<LegacyClienteInput> for ClienteInput {
    type Error = ValidationError;

    fn try_from(legacy: LegacyClienteInput) -> Result<Self, Self::Error> {
        let status = first_filled(legacy.status, legacy.status_pascal)
            .map(|s| s.parse::<ClienteStatus>())
            .transpose()?;
        Ok(ClienteInput {
            nome: first_filled(legacy.nome, legacy.nome_pascal).unwrap_or_default(),
            email: first_filled(legacy.email, legacy.email_pascal).unwrap_or_default(),
            cpf: first_filled(legacy.cpf, legacy.cpf_upper).unwrap_or_default(),
            status,
            data_nascimento: first_filled(legacy.data_nascimento, legacy.data_nascimento_pascal)
                .map(DateInput::Text),
        })
    }
}

/// In-memory filters applied after a full list fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClienteFilter {
    /// Case-insensitive substring of `nome`.
    pub nome: Option<String>,
    /// Exact status.
    pub status: Option<ClienteStatus>,
    /// Case-insensitive substring of `email`.
    pub email: Option<String>,
}

impl ClienteFilter {
    pub fn matches(&self, cliente: &Cliente) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| match needle {
            Some(n) if !n.is_empty() => haystack.to_lowercase().contains(&n.to_lowercase()),
            _ => true,
        };
        contains(&cliente.nome, &self.nome)
            && self.status.map_or(true, |s| cliente.status == s)
            && contains(&cliente.email, &self.email)
    }
}
