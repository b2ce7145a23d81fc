//! Incremental decoder for `multipart/x-mixed-replace` motion-JPEG streams

use tracing::warn;

pub const DEFAULT_BOUNDARY: &str = "frame";

const MAX_BUFFER_BYTES: usize = 8 * 1024 * 1024;

/// Read the `boundary` parameter from a multipart Content-Type header.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Splits a byte stream into the bodies of its multipart parts.
///
/// Feed chunks with [`push`](Self::push) and drain complete frames with
/// [`next_frame`](Self::next_frame). Bytes before the first delimiter are
/// skipped.
pub struct MjpegDecoder {
    delimiter: Vec<u8>,
    buffer: Vec<u8>,
}

impl MjpegDecoder {
    pub fn new(boundary: &str) -> Self {
        Self {
            delimiter: format!("--{boundary}").into_bytes(),
            buffer: Vec::new(),
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        if self.buffer.len() + data.len() > MAX_BUFFER_BYTES {
            warn!(
                buffered = self.buffer.len(),
                incoming = data.len(),
                "MJPEG buffer overflow, resynchronizing"
            );
            self.buffer.clear();
        }
        self.buffer.extend_from_slice(data);
    }

    #[cfg(test)]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let start = find(&self.buffer, &self.delimiter)?;
            if start > 0 {
                self.buffer.drain(..start);
            }

            let after_delim = self.delimiter.len();
            let (header_len, sep_len) = find_header_end(&self.buffer[after_delim..])?;
            let body_start = after_delim + header_len + sep_len;

            let headers = String::from_utf8_lossy(&self.buffer[after_delim..after_delim + header_len]);
            let body_end = match content_length(&headers) {
                Some(len) => {
                    if self.buffer.len() < body_start + len {
                        return None;
                    }
                    body_start + len
                }
                None => {
                    let next = find(&self.buffer[body_start..], &self.delimiter)?;
                    let mut end = body_start + next;
                    // Line break before the next delimiter belongs to the framing
                    if self.buffer[body_start..end].ends_with(b"\r\n") {
                        end -= 2;
                    } else if self.buffer[body_start..end].ends_with(b"\n") {
                        end -= 1;
                    }
                    end
                }
            };

            let body = self.buffer[body_start..body_end].to_vec();
            self.buffer.drain(..body_end);

            if !body.is_empty() {
                return Some(body);
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Position and length of the blank line ending the part headers
fn find_header_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n");
    let crlf = find(buffer, b"\r\n\r\n");
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a <= b { (a, 2) } else { (b, 4) }),
        (Some(a), None) => Some((a, 2)),
        (None, Some(b)) => Some((b, 4)),
        (None, None) => None,
    }
}

fn content_length(headers: &str) -> Option<usize> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}
