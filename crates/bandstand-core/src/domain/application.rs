use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::event::Event;
use crate::domain::ids::{ApplicationId, EventId};

/// Estado de una solicitud de open mic.
///
/// No hay transiciones prohibidas: un organizador puede poner cualquier
/// estado desde cualquier otro (p.ej. volver a `Pending` un rechazo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl ApplicationStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      ApplicationStatus::Pending => "pending",
      ApplicationStatus::Approved => "approved",
      ApplicationStatus::Rejected => "rejected",
    }
  }
}

impl fmt::Display for ApplicationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for ApplicationStatus {
  type Err = ParseStatusError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(ApplicationStatus::Pending),
      "approved" => Ok(ApplicationStatus::Approved),
      "rejected" => Ok(ApplicationStatus::Rejected),
      other => Err(ParseStatusError(other.to_string())),
    }
  }
}

/// Solicitud pública para actuar en el open mic de un evento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenMicApplication {
  pub id: ApplicationId,
  pub event_id: EventId,
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  /// Canción que el artista quiere tocar.
  pub song: String,
  pub instrument_needs: String,
  pub status: ApplicationStatus,
  pub organiser_notes: Option<String>,
  pub submitted_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Formulario público tal como llega, sin normalizar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub song: String,
  pub instrument_needs: Option<String>,
}

/// Artista aprobado tal como se anuncia en público: sin email, teléfono ni
/// notas del organizador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
  pub application_id: ApplicationId,
  pub performer: String,
  pub song: String,
  pub submitted_at: DateTime<Utc>,
}

impl From<OpenMicApplication> for LineupEntry {
  fn from(app: OpenMicApplication) -> Self {
    LineupEntry { application_id: app.id, performer: app.full_name, song: app.song, submitted_at: app.submitted_at }
  }
}

/// Cartel público del open mic de un evento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
  pub event: Event,
  /// Por orden de llegada de la solicitud.
  pub performers: Vec<LineupEntry>,
}
