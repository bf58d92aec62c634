use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{EventId, ProfileId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id: EventId,
  pub name: String,
  /// Identificador público usado por las páginas de solicitud y lineup.
  pub slug: String,
  pub date: NaiveDate,
  pub start_time: NaiveTime,
  pub end_time: NaiveTime,
  pub venue: String,
  pub description: String,
  pub open_mic_enabled: bool,
  pub created_by: ProfileId,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Formulario de alta de evento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
  pub name: String,
  pub date: NaiveDate,
  pub start_time: NaiveTime,
  /// Si falta, el evento termina a la misma hora a la que empieza.
  pub end_time: Option<NaiveTime>,
  pub venue: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub open_mic_enabled: bool,
}

/// Slug de un evento: nombre en minúsculas, espacios → `-`, sin nada fuera de
/// `[a-z0-9-]`, más `-MMDD` de la fecha.
///
/// ```
/// use bandstand_core::domain::event::event_slug;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
/// assert_eq!(event_slug("Open Mic Night!", date), "open-mic-night-0307");
/// ```
pub fn event_slug(name: &str, date: NaiveDate) -> String {
  let mut slug = String::with_capacity(name.len() + 5);
  let mut in_space = false;

  for c in name.to_lowercase().chars() {
    if c.is_whitespace() {
      if !in_space {
        slug.push('-');
      }
      in_space = true;
      continue;
    }
    in_space = false;
    if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
      slug.push(c);
    }
  }

  slug.push_str(&format!("-{:02}{:02}", date.month(), date.day()));
  slug
}
