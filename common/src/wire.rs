//! Request and response bodies of the REMEAL REST API.
//!
//! Field names follow the backend (`id_producto`, `fecha_retiro`, ...). Every
//! response is decoded into a typed schema here; a body that does not match is
//! a [`SchemaError`], never a partially trusted value.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::product::ProductId;
use crate::rating::Score;
use crate::reservation::{ReservationId, ReservationState};

/// A 2xx response whose body did not match the endpoint's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected response from {endpoint}: {reason}")]
pub struct SchemaError {
    pub endpoint: &'static str,
    pub reason: String,
}

/// Decode a response body for `endpoint`.
pub fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &[u8]) -> Result<T, SchemaError> {
    serde_json::from_slice(body).map_err(|e| SchemaError {
        endpoint,
        reason: e.to_string(),
    })
}

/// `POST /api/reservas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub id_producto: ProductId,
    #[serde(deserialize_with = "timestamp")]
    pub fecha_retiro: DateTime<Utc>,
    pub mensaje: String,
}

/// `PUT /api/reservas/:id` and `PUT /api/reservas/:id/aprobar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdateRequest {
    pub estado: ReservationState,
}

/// `POST /api/valoraciones`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRatingRequest {
    pub comentario: String,
    pub puntuacion: Score,
    pub id_producto: ProductId,
    pub id_reserva: ReservationId,
}

/// Body of a non-2xx response. The backend is not consistent about the key.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// First non-empty message, if any.
    pub fn text(&self) -> Option<&str> {
        [&self.error, &self.mensaje, &self.message]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// Extract the user-visible message from an error response body.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.text().map(str::to_owned))
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp. Strings without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

pub fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}"))),
    }
}
