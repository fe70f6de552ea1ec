//! Deployment package creation

use crate::error::{PipelineError, Result};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use valkyrie_cloud::CONFIG_BACKUP;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Directories never shipped with the function
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Files never shipped with the function
const SKIPPED_FILES: &[&str] = &[CONFIG_BACKUP];

/// Largest package the compute service accepts as a direct upload
const MAX_DIRECT_UPLOAD: usize = 50 * 1024 * 1024;

pub struct ProjectArchiver;

impl ProjectArchiver {
    /// Zip `root` on a blocking thread
    pub async fn package(root: &Path) -> Result<Vec<u8>> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::create(&root))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
    }

    /// Zip every file under `root`, paths stored relative to it
    pub fn create(root: &Path) -> Result<Vec<u8>> {
        tracing::debug!("Packaging project from: {}", root.display());

        if !root.is_dir() {
            return Err(PipelineError::archive(root, "not a directory"));
        }

        let mut files = Vec::new();
        collect_files(root, &mut files).map_err(|e| PipelineError::archive(root, e))?;
        if files.is_empty() {
            return Err(PipelineError::archive(root, "no files to package"));
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for path in &files {
            let name = entry_name(root, path)?;
            let content = fs::read(path).map_err(|e| PipelineError::archive(path, e))?;
            writer
                .start_file(name, options)
                .map_err(|e| PipelineError::archive(path, e))?;
            writer
                .write_all(&content)
                .map_err(|e| PipelineError::archive(path, e))?;
        }

        let archive = writer
            .finish()
            .map_err(|e| PipelineError::archive(root, e))?
            .into_inner();

        tracing::debug!(
            "Package created: {} files, {} bytes",
            files.len(),
            archive.len()
        );
        Self::check_package_size(archive.len());

        Ok(archive)
    }

    fn check_package_size(size: usize) {
        if size > MAX_DIRECT_UPLOAD {
            tracing::warn!(
                "Package is {}MB, above the {}MB direct upload limit",
                size / 1024 / 1024,
                MAX_DIRECT_UPLOAD / 1024 / 1024
            );
        }
    }
}

/// Recursively gather files in sorted order
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;
        let file_name = entry.file_name();
        let name = file_name.to_str();
        if file_type.is_dir() {
            if !name.is_some_and(|name| SKIPPED_DIRS.contains(&name)) {
                collect_files(&path, files)?;
            }
        } else if file_type.is_file() && !name.is_some_and(|name| SKIPPED_FILES.contains(&name)) {
            files.push(path);
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| PipelineError::archive(path, e))?;
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| PipelineError::archive(path, "path is not valid UTF-8"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}
