use serde::{Deserialize, Serialize};
use std::fmt;

/// Tempo de una canción en pulsos por minuto, limitado a `30..=300`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Bpm(u16);

impl Bpm {
  pub const MIN: u16 = 30;
  pub const MAX: u16 = 300;
  pub const DEFAULT: Bpm = Bpm(120);

  /// Devuelve `None` si el valor está fuera de `[MIN, MAX]`.
  pub fn new(value: u16) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
  }

  /// Variante para valores que llegan como entero con signo (formularios, SQL).
  pub fn from_i64(value: i64) -> Option<Self> {
    u16::try_from(value).ok().and_then(Self::new)
  }

  pub fn get(self) -> u16 {
    self.0
  }
}

impl Default for Bpm {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl fmt::Display for Bpm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} BPM", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bpm must be between {min} and {max}, got {0}", min = Bpm::MIN, max = Bpm::MAX)]
pub struct BpmOutOfRange(pub u16);

impl TryFrom<u16> for Bpm {
  type Error = BpmOutOfRange;

  fn try_from(value: u16) -> Result<Self, Self::Error> {
    Bpm::new(value).ok_or(BpmOutOfRange(value))
  }
}

impl From<Bpm> for u16 {
  fn from(bpm: Bpm) -> Self {
    bpm.0
  }
}
