//! Static files served from a single root directory.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::{debug, warn};
use tokio::fs;

use crate::protocol::errors::text_error;
use crate::protocol::{status, Response};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const CACHE_CONTROL: &str = "public, max-age=3600";

pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative paths inside the root are accepted.
    pub fn is_safe_path(relative: &str) -> bool {
        !relative.is_empty() && !relative.contains("..") && !relative.starts_with('/')
    }

    /// True when `relative` names an existing regular file that can be opened.
    pub async fn can_serve(&self, relative: &str) -> bool {
        if !Self::is_safe_path(relative) {
            return false;
        }
        let path = self.root.join(relative);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => fs::File::open(&path).await.is_ok(),
            _ => false,
        }
    }

    pub async fn serve(&self, relative: &str) -> Response {
        if !Self::is_safe_path(relative) {
            warn!("Rejected static path {:?}", relative);
            return text_error(status::FORBIDDEN, &format!("Access denied: {relative}"));
        }
        let path = self.root.join(relative);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                return text_error(status::FORBIDDEN, &format!("Cannot read file: {relative}"));
            }
            Err(_) => {
                return text_error(status::NOT_FOUND, &format!("File not found: {relative}"));
            }
        };
        if !metadata.is_file() {
            return text_error(status::BAD_REQUEST, &format!("Not a file: {relative}"));
        }

        match fs::read(&path).await {
            Ok(content) => {
                debug!("Serving {} ({} bytes)", path.display(), content.len());
                Response::binary(status::OK, mime_type(&path), Bytes::from(content))
                    .with_header("Cache-Control", CACHE_CONTROL)
            }
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                text_error(status::FORBIDDEN, &format!("Cannot read file: {relative}"))
            }
            Err(err) => text_error(
                status::INTERNAL_SERVER_ERROR,
                &format!("Error reading file: {err}"),
            ),
        }
    }

    /// Names of the regular files directly under the root, sorted. A missing
    /// or unreadable root lists as empty.
    pub async fn list_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Cannot list {}: {}", self.root.display(), err);
                return names;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_file = match entry.file_type().await {
                Ok(file_type) => file_type.is_file(),
                Err(_) => false,
            };
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        names
    }
}

/// Content type by lower-cased file extension.
pub fn mime_type(path: &Path) -> &'static str {
    let extension = match path.extension().and_then(|ext| ext.to_str()) {
        Some(extension) => extension.to_lowercase(),
        None => return DEFAULT_MIME_TYPE,
    };
    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "md" => "text/markdown",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",

        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => DEFAULT_MIME_TYPE,
    }
}
