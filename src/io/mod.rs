use std::io::{BufWriter, Write};
use std::path::Path;
use ndarray::Array2;
use tempfile::NamedTempFile;
use crate::error::Result;
use crate::io::flat::{read_flat, ElementType};
use crate::io::native::read_native;

pub mod flat;
pub mod native;

/// Reads an id matrix from either a flat artifact (`.u32bin`, `.u8bin`) or an `.npy` artifact,
/// choosing the reader by file extension.
pub fn read_ids<P: AsRef<Path>>(path: P) -> Result<Array2<usize>> {
    let path = path.as_ref();
    let matrix = match ElementType::from_path(path) {
        Some(element_type) => read_flat(path, element_type)?,
        None => read_native(path)?,
    };
    matrix.to_ids()
}

/// Writes a file through `write` so that `path` either keeps its previous content or holds the
/// complete new content.
///
/// The bytes go to a temporary file next to `path`, which is renamed over `path` only after
/// `write` succeeds and the buffer is flushed. On failure the temporary file is removed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent)?;
    let mut writer = BufWriter::new(&mut file);
    write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
