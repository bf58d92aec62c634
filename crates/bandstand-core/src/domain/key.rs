use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Una de las 12 clases de altura, con la grafía que usa la banda
/// (sostenidos para C#/F#, bemoles para el resto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pitch {
  C,
  CSharp,
  D,
  EFlat,
  E,
  F,
  FSharp,
  G,
  AFlat,
  A,
  BFlat,
  B,
}

impl Pitch {
  pub const ALL: [Pitch; 12] = [
    Pitch::C,
    Pitch::CSharp,
    Pitch::D,
    Pitch::EFlat,
    Pitch::E,
    Pitch::F,
    Pitch::FSharp,
    Pitch::G,
    Pitch::AFlat,
    Pitch::A,
    Pitch::BFlat,
    Pitch::B,
  ];

  pub fn symbol(self) -> &'static str {
    match self {
      Pitch::C => "C",
      Pitch::CSharp => "C#",
      Pitch::D => "D",
      Pitch::EFlat => "Eb",
      Pitch::E => "E",
      Pitch::F => "F",
      Pitch::FSharp => "F#",
      Pitch::G => "G",
      Pitch::AFlat => "Ab",
      Pitch::A => "A",
      Pitch::BFlat => "Bb",
      Pitch::B => "B",
    }
  }

  /// Acepta la grafía canónica y su enarmónico habitual (`Db` → `C#`).
  fn parse(s: &str) -> Option<Pitch> {
    let p = match s {
      "C" => Pitch::C,
      "C#" | "Db" => Pitch::CSharp,
      "D" => Pitch::D,
      "Eb" | "D#" => Pitch::EFlat,
      "E" => Pitch::E,
      "F" => Pitch::F,
      "F#" | "Gb" => Pitch::FSharp,
      "G" => Pitch::G,
      "Ab" | "G#" => Pitch::AFlat,
      "A" => Pitch::A,
      "Bb" | "A#" => Pitch::BFlat,
      "B" => Pitch::B,
      _ => return None,
    };
    Some(p)
  }
}

/// Tonalidad de una canción: 12 mayores + 12 menores.
///
/// Se serializa con su símbolo (`"C"`, `"F#m"`, `"Bbm"`...), que es también
/// lo que se guarda en la columna `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MusicalKey {
  pub pitch: Pitch,
  pub minor: bool,
}

impl MusicalKey {
  pub const fn major(pitch: Pitch) -> Self {
    Self { pitch, minor: false }
  }

  pub const fn minor(pitch: Pitch) -> Self {
    Self { pitch, minor: true }
  }

  /// Las 24 tonalidades en el orden en que se ofrecen al usuario:
  /// primero las mayores, luego las menores.
  pub fn all() -> impl Iterator<Item = MusicalKey> {
    Pitch::ALL.into_iter().map(MusicalKey::major).chain(Pitch::ALL.into_iter().map(MusicalKey::minor))
  }
}

impl Default for MusicalKey {
  fn default() -> Self {
    MusicalKey::major(Pitch::C)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown musical key: {0:?}")]
pub struct ParseKeyError(pub String);

impl FromStr for MusicalKey {
  type Err = ParseKeyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let (root, minor) = match trimmed.strip_suffix('m') {
      Some(root) => (root, true),
      None => (trimmed, false),
    };

    Pitch::parse(root).map(|pitch| MusicalKey { pitch, minor }).ok_or_else(|| ParseKeyError(s.to_string()))
  }
}

impl fmt::Display for MusicalKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.pitch.symbol())?;
    if self.minor {
      f.write_str("m")?;
    }
    Ok(())
  }
}

impl From<MusicalKey> for String {
  fn from(key: MusicalKey) -> Self {
    key.to_string()
  }
}

impl TryFrom<String> for MusicalKey {
  type Error = ParseKeyError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}
