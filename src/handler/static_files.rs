//! Static file serving module
//!
//! First pipeline stage. Resolves a request path to a regular file under the
//! static root and serves it, or hands the request on to the proxy.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use hyper::Response;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::handler::router::RequestContext;
use crate::http::cache::{self, CachePolicy};
use crate::http::range::{ByteRange, RangeParseResult};
use crate::http::response::{self, FileMeta};
use crate::http::{self as http_util, mime, GatewayBody};

/// Outcome of the static stage
#[derive(Debug)]
pub enum Resolution {
    /// The request was answered from the static root
    Served(Response<GatewayBody>),
    /// Nothing to serve here; forward the request
    Pass,
}

/// File chosen for a request
struct ResolvedFile {
    path: PathBuf,
    metadata: std::fs::Metadata,
}

/// Try to answer the request from the static root
///
/// Missing files, directories without a default document, dotfiles (unless
/// enabled) and symlinks leading out of the root all yield [`Resolution::Pass`].
/// Any other I/O failure is an error, not a fallthrough.
pub async fn resolve(
    ctx: &RequestContext<'_>,
    state: &GatewayState,
) -> Result<Resolution, GatewayError> {
    let Some(root) = state.static_root.as_deref() else {
        return Ok(Resolution::Pass);
    };
    let static_cfg = &state.config.static_files;

    if ctx.path.has_dotfile() && !static_cfg.serve_dotfiles {
        tracing::debug!(path = ctx.raw_path, "Dotfile request passed to proxy");
        return Ok(Resolution::Pass);
    }

    let Some(file) = locate(root, ctx, &static_cfg.default_document).await? else {
        return Ok(Resolution::Pass);
    };

    let cache_policy = CachePolicy::for_static(static_cfg.max_age);
    let file_size = file.metadata.len();
    let etag = cache::generate_etag(file_size, file.metadata.modified().ok());

    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return Ok(Resolution::Served(http_util::build_304_response(
            &etag,
            cache_policy,
        )));
    }

    let meta = FileMeta {
        content_type: mime::content_type_for(&file.path),
        etag: &etag,
        cache: cache_policy,
    };

    let response = match http_util::parse_range_header(ctx.range_header, file_size) {
        RangeParseResult::Valid(range) => {
            let data = if ctx.is_head {
                Vec::new()
            } else {
                read_range(&file.path, range).await.map_err(GatewayError::StaticIo)?
            };
            response::build_partial_response(data, range, file_size, &meta, ctx.is_head)
        }
        RangeParseResult::NotSatisfiable => http_util::build_416_response(file_size),
        RangeParseResult::None => {
            let data = if ctx.is_head {
                Vec::new()
            } else {
                fs::read(&file.path).await.map_err(GatewayError::StaticIo)?
            };
            response::build_file_response(data, file_size, &meta, ctx.is_head)
        }
    };

    tracing::debug!(path = ctx.raw_path, file = %file.path.display(), "Served static file");
    Ok(Resolution::Served(response))
}

/// Map the request path to a regular file under `root`
async fn locate(
    root: &Path,
    ctx: &RequestContext<'_>,
    default_document: &str,
) -> Result<Option<ResolvedFile>, GatewayError> {
    let mut candidate = root.join(ctx.path.to_relative_path());

    let Some(mut metadata) = metadata_or_pass(&candidate).await? else {
        return Ok(None);
    };

    if metadata.is_dir() {
        candidate.push(default_document);
        match metadata_or_pass(&candidate).await? {
            Some(index) => metadata = index,
            None => return Ok(None),
        }
    } else if ctx.path.has_trailing_slash() {
        // "/app.js/" names a directory that does not exist
        return Ok(None);
    }

    if !metadata.is_file() {
        return Ok(None);
    }

    // Symlinks may point anywhere; only serve what really lives under the root
    let canonical = match fs::canonicalize(&candidate).await {
        Ok(path) => path,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(GatewayError::StaticIo(e)),
    };
    if !canonical.starts_with(root) {
        tracing::warn!(
            path = ctx.raw_path,
            target = %canonical.display(),
            "Symlink outside static root not served"
        );
        return Ok(None);
    }

    Ok(Some(ResolvedFile {
        path: canonical,
        metadata,
    }))
}

/// Metadata for `path`, `None` when nothing is there
async fn metadata_or_pass(path: &Path) -> Result<Option<std::fs::Metadata>, GatewayError> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(GatewayError::StaticIo(e)),
    }
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Read the bytes of an inclusive range
async fn read_range(path: &Path, range: ByteRange) -> io::Result<Vec<u8>> {
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;

    let mut data = Vec::with_capacity(usize::try_from(range.len()).unwrap_or(0));
    file.take(range.len()).read_to_end(&mut data).await?;
    Ok(data)
}
