use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Escribe `contents` en `path` sin dejar nunca un archivo a medias: se
/// escribe un temporal oculto junto al destino, se hace `fsync` y se
/// renombra encima. Si algo falla el temporal se borra.
pub fn atomic_write_str(path: &Path, contents: &str) -> io::Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let tmp = sibling_tmp(path);
  let result = File::create(&tmp)
    .and_then(|mut file| {
      file.write_all(contents.as_bytes())?;
      file.sync_all()
    })
    .and_then(|()| fs::rename(&tmp, path));

  if result.is_err() {
    let _ = fs::remove_file(&tmp);
  }
  result
}

/// `dir/bandstand.toml` → `dir/.bandstand.toml.tmp`
fn sibling_tmp(path: &Path) -> PathBuf {
  let mut name = std::ffi::OsString::from(".");
  name.push(path.file_name().unwrap_or_default());
  name.push(".tmp");
  path.with_file_name(name)
}
