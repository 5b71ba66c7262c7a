//! Zip bundling of an export directory

use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name the bundle is delivered under
pub const ARCHIVE_DOWNLOAD_NAME: &str = "slides_data.zip";

/// MIME type of the bundle
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// Absolute form of an output directory.
///
/// Relative paths are joined to the current directory; `.` components and
/// trailing separators are dropped. A path that names no folder of its own
/// (`/`, or one ending in `..`) is rejected, since neither the run layout nor
/// a sibling archive can be derived from it.
pub fn resolve_output_dir(directory: &Path) -> Result<PathBuf> {
    let absolute = if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        std::env::current_dir()?.join(directory)
    };

    let resolved: PathBuf = absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if resolved.file_name().is_none() {
        return Err(Error::InvalidOutputDir {
            path: directory.display().to_string(),
        });
    }
    Ok(resolved)
}

/// `<directory>.zip`, next to the resolved directory
pub fn archive_path_for(directory: &Path) -> Result<PathBuf> {
    let mut name = resolve_output_dir(directory)?.into_os_string();
    name.push(".zip");
    Ok(PathBuf::from(name))
}

/// Zip `directory` recursively into `<directory>.zip` and return its path.
///
/// Entry names are relative to `directory`, subdirectories included. An
/// existing archive is replaced. A missing archive after writing is reported
/// as [`Error::ArchiveMissing`].
pub fn create_archive(directory: &Path) -> Result<PathBuf> {
    if !directory.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory not found: {}", directory.display()),
        )));
    }

    let archive_path = archive_path_for(directory)?;
    let entries = collect_entries(directory)?;
    tracing::debug!(
        directory = %directory.display(),
        archive = %archive_path.display(),
        entries = entries.len(),
        "Creating archive"
    );

    let mut writer = ZipWriter::new(File::create(&archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let name = entry_name(directory, &entry)?;
        if entry.is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
        } else {
            writer.start_file(name, options)?;
            let mut file = File::open(&entry)?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }
    writer.finish()?;

    if !archive_path.is_file() {
        tracing::error!(archive = %archive_path.display(), "Failed to create ZIP file");
        return Err(Error::ArchiveMissing {
            path: archive_path.display().to_string(),
        });
    }

    Ok(archive_path)
}

/// Every file and directory below `directory`, sorted
fn collect_entries(directory: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&directory.to_string_lossy())
    );

    let paths = glob::glob(&pattern).map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid archive pattern: {}", e),
        ))
    })?;

    let mut entries = paths
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Io(e.into_error()))?;
    entries.sort();
    Ok(entries)
}

/// Archive entry name: path relative to `root`, `/`-separated
fn entry_name(root: &Path, entry: &Path) -> Result<String> {
    let relative = entry.strip_prefix(root).map_err(|_| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is outside {}", entry.display(), root.display()),
        ))
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
