// src/static_server.rs

// dependencies
use crate::access::{GuardedFs, INDEX_FILE};
use crate::config::Binding;
use crate::errors::ServeError;
use crate::fs::{Dir, File, FileInfo, FileSystem, clean_path};
use crate::listing::render_listing;
use crate::range::{ByteRange, parse_range};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use futures_util::stream;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::{SystemTime, UNIX_EPOCH};

// bytes read from disk per body chunk
const CHUNK_SIZE: usize = 64 * 1024;

// struct type which represents the static file server for one root
pub struct StaticServer<F> {
    fs: F,
}

// methods for the StaticServer type
impl<F: FileSystem> StaticServer<F> {
    pub fn new(fs: F) -> Self {
        StaticServer { fs }
    }

    // utility to return the filesystem files are served from
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Answers one request for `uri` against the filesystem.
    ///
    /// Runs blocking file I/O; call it off the async executor.
    pub fn serve(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<Response, ServeError> {
        let head_only = match *method {
            Method::GET => false,
            Method::HEAD => true,
            _ => return Err(ServeError::MethodNotAllowed),
        };

        let url_path = decode_path(uri.path())?;

        if url_path.ends_with(&format!("/{INDEX_FILE}")) {
            return Ok(local_redirect(uri, "./"));
        }

        let name = clean_path(&url_path);
        let mut file = self.fs.open(&name)?;
        let mut info = file.metadata()?;

        // canonical urls: directories end in a slash, files don't
        let base = last_segment(&url_path);
        if info.is_dir() {
            if !url_path.ends_with('/') {
                return Ok(local_redirect(uri, &format!("{base}/")));
            }
        } else if url_path.ends_with('/') {
            return Ok(local_redirect(uri, &format!("../{base}")));
        }

        if info.is_dir() {
            let index = format!("{}/{INDEX_FILE}", name.trim_end_matches('/'));
            if let Ok(index_file) = self.fs.open(&index) {
                if let Ok(index_info) = index_file.metadata() {
                    if !index_info.is_dir() {
                        file = index_file;
                        info = index_info;
                    }
                }
            }
        }

        if info.is_dir() {
            let entries = file.read_dir(0)?;
            return Ok(listing_response(render_listing(entries), head_only));
        }

        serve_content(file, &info, headers, head_only)
    }
}

impl StaticServer<GuardedFs<Dir>> {
    // create a static file server for a configured binding
    pub fn for_binding(binding: &Binding, dir_listing: bool) -> Self {
        StaticServer::new(GuardedFs::new(Dir::new(&binding.root_dir), dir_listing))
    }
}

// write the body of a regular file, honouring conditional and range headers
fn serve_content<T: File + 'static>(
    mut file: T,
    info: &T::Info,
    request: &HeaderMap,
    head_only: bool,
) -> Result<Response, ServeError> {
    let size = info.size();
    let mut headers = HeaderMap::new();

    let validators = info.modified().map(|modified| {
        let etag = entity_tag(size, modified);
        (modified, etag)
    });

    if let Some((modified, etag)) = &validators {
        headers.insert(
            header::LAST_MODIFIED,
            header_value(&httpdate::fmt_http_date(*modified))?,
        );
        headers.insert(header::ETAG, header_value(etag)?);

        if not_modified(request, *modified, etag) {
            return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
        }
    }

    headers.insert(
        header::CONTENT_TYPE,
        header_value(&guess_mime_type(info.name()))?,
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let range_header = if_range_holds(request, validators.as_ref())
        .then(|| request.get(header::RANGE))
        .flatten()
        .and_then(|value| value.to_str().ok());
    let range = parse_range(range_header, size);

    let (status, start) = match range {
        ByteRange::Full => (StatusCode::OK, 0),
        ByteRange::Partial { start, end } => {
            headers.insert(
                header::CONTENT_RANGE,
                header_value(&format!("bytes {start}-{end}/{size}"))?,
            );
            (StatusCode::PARTIAL_CONTENT, start)
        }
        ByteRange::Unsatisfiable => {
            headers.insert(
                header::CONTENT_RANGE,
                header_value(&format!("bytes */{size}"))?,
            );
            headers.remove(header::CONTENT_TYPE);
            return Ok((StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response());
        }
    };

    let length = range.len(size);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    if head_only {
        return Ok((status, headers).into_response());
    }

    file.seek(SeekFrom::Start(start))?;
    Ok((status, headers, stream_body(file.take(length))).into_response())
}

/// Streams `reader` as a response body, one blocking read per chunk.
///
/// Nothing is read until the body is polled.
fn stream_body<R: Read + Send + 'static>(reader: R) -> Body {
    let chunks = stream::try_unfold(reader, |mut reader| async move {
        let (reader, chunk) = tokio::task::spawn_blocking(move || {
            let mut chunk = vec![0; CHUNK_SIZE];
            let read = reader.read(&mut chunk)?;
            chunk.truncate(read);
            Ok::<_, io::Error>((reader, chunk))
        })
        .await
        .map_err(io::Error::other)??;

        if chunk.is_empty() {
            return Ok(None);
        }
        Ok::<_, io::Error>(Some((Bytes::from(chunk), reader)))
    });
    Body::from_stream(chunks)
}

// a range is only honoured while the If-Range validator still matches
fn if_range_holds(request: &HeaderMap, validators: Option<&(SystemTime, String)>) -> bool {
    let Some(if_range) = request.get(header::IF_RANGE) else {
        return true;
    };
    let (Some((modified, etag)), Ok(if_range)) = (validators, if_range.to_str()) else {
        return false;
    };

    let if_range = if_range.trim();
    if if_range.starts_with('"') {
        return if_range == etag.as_str();
    }
    if if_range.starts_with("W/") {
        return false;
    }

    httpdate::parse_http_date(if_range)
        .map(|date| unix_seconds(date) == unix_seconds(*modified))
        .unwrap_or(false)
}

fn listing_response(page: String, head_only: bool) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if head_only {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(page.len()));
        return (StatusCode::OK, headers).into_response();
    }
    (StatusCode::OK, headers, page).into_response()
}

// redirect relative to the current url, keeping its query string
fn local_redirect(uri: &Uri, target: &str) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{target}?{query}"),
        None => target.to_string(),
    };

    match HeaderValue::from_str(&location) {
        Ok(location) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, location)],
        )
            .into_response(),
        Err(_) => ServeError::NotFound.into_response(),
    }
}

fn not_modified(request: &HeaderMap, modified: SystemTime, etag: &str) -> bool {
    if let Some(candidates) = request.get(header::IF_NONE_MATCH) {
        let Ok(candidates) = candidates.to_str() else {
            return false;
        };
        return candidates
            .split(',')
            .map(str::trim)
            .any(|candidate| candidate == "*" || weak_eq(candidate, etag));
    }

    let Some(since) = request
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| httpdate::parse_http_date(value).ok())
    else {
        return false;
    };

    // http dates only carry whole seconds
    unix_seconds(modified) <= unix_seconds(since)
}

fn weak_eq(a: &str, b: &str) -> bool {
    a.trim_start_matches("W/") == b.trim_start_matches("W/")
}

fn entity_tag(size: u64, modified: SystemTime) -> String {
    format!("\"{:x}-{:x}\"", size, unix_seconds(modified))
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn header_value(value: &str) -> Result<HeaderValue, ServeError> {
    HeaderValue::from_str(value).map_err(|err| ServeError::Io(io::Error::other(err)))
}

fn decode_path(raw: &str) -> Result<String, ServeError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ServeError::NotFound)?;

    if decoded.starts_with('/') {
        Ok(decoded.into_owned())
    } else {
        Ok(format!("/{decoded}"))
    }
}

fn last_segment(url_path: &str) -> &str {
    url_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
}

// helper function to guess the mime type
pub fn guess_mime_type(name: &str) -> Cow<'static, str> {
    Cow::Owned(mime_guess::from_path(name).first_or_octet_stream().to_string())
}
