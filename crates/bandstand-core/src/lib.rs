//! Núcleo de Bandstand: setlists, orden de canciones, roles por canción y
//! solicitudes de open mic.
//!
//! Este crate no hace I/O. La persistencia y la identidad llegan a través de
//! los puertos de [`ports`]; los servicios de [`services`] aplican las reglas.

pub mod domain;
pub mod errors;
pub mod ports;
pub mod services;

pub use errors::CoreError;
