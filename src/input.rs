//! Whole-file input and output.

use flate2::read::GzDecoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Check if data is gzip compressed.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Read a whole text file, decompressing gzip input transparently.
pub fn read_input(path: &Path) -> Result<String> {
    let raw = fs::read(path).map_err(io_error(path))?;

    let data = if is_gzip(&raw) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data).map_err(io_error(path))?;
        log::debug!(
            "Decompressed {:?}: {} -> {} bytes",
            path,
            raw.len(),
            data.len()
        );
        data
    } else {
        raw
    };

    String::from_utf8(data).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

/// Write a whole output file.
///
/// Contents go to a sibling temp file that is renamed into place, so a
/// failed run never leaves a truncated output behind.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let temp_path = temp_path(path);

    let result =
        write_temp(&temp_path, contents).and_then(|()| fs::rename(&temp_path, path).map_err(io_error(path)));
    if let Err(e) = result {
        if temp_path.exists() {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                log::warn!("Failed to remove {:?}: {}", temp_path, cleanup);
            }
        }
        return Err(e);
    }
    log::info!("Wrote {:?} ({} bytes)", path, contents.len());
    Ok(())
}

fn write_temp(temp_path: &Path, contents: &str) -> Result<()> {
    let mut file = fs::File::create(temp_path).map_err(io_error(temp_path))?;
    file.write_all(contents.as_bytes()).map_err(io_error(temp_path))?;
    file.sync_all().map_err(io_error(temp_path))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
