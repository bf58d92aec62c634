use chrono::{DateTime, DurationRound, NaiveTime, TimeDelta, Timelike, Utc};

/// Instante actual con precisión de microsegundos, la misma que guarda el
/// almacenamiento. Lo que devuelve un servicio es igual a lo que se relee.
pub(crate) fn now() -> DateTime<Utc> {
  let at = Utc::now();
  at.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(at)
}

/// Hora de evento sin fracción de segundo.
pub(crate) fn whole_seconds(time: NaiveTime) -> NaiveTime {
  time.with_nanosecond(0).unwrap_or(time)
}
