//! NumPy `.npy` and `.npz` encoding.
//!
//! Only what the dataset needs: little-endian `f4`/`f8` arrays in C order,
//! format version 1.0 on write, 1.0 and 2.0 on read, and stored (not
//! deflated) `.npz` archives.

use std::io::{Cursor, Read, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header plus preamble is padded to a multiple of this many bytes.
const HEADER_ALIGN: usize = 64;

/// Malformed or unsupported NumPy data.
#[derive(Debug, Error)]
pub enum NpyError {
    /// Not a `.npy` payload, or a feature this reader does not handle.
    #[error("invalid npy data: {0}")]
    Format(String),

    /// Archive container failure.
    #[error("npz archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Reading archive entries failed.
    #[error("npz read error: {0}")]
    Io(#[from] std::io::Error),
}

impl NpyError {
    fn format(reason: impl Into<String>) -> Self {
        Self::Format(reason.into())
    }
}

/// Element types that can be stored in a `.npy` array.
pub trait NpyElement: Copy {
    /// NumPy `descr` string.
    const DESCR: &'static str;
    /// Bytes per element.
    const SIZE: usize;

    /// Append the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decode from exactly [`Self::SIZE`] little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

impl NpyElement for f32 {
    const DESCR: &'static str = "<f4";
    const SIZE: usize = 4;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Self::from_le_bytes(buf)
    }
}

impl NpyElement for f64 {
    const DESCR: &'static str = "<f8";
    const SIZE: usize = 8;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Self::from_le_bytes(buf)
    }
}

/// A decoded array: shape and C-order values.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray<T> {
    /// Dimensions; empty for a scalar.
    pub shape: Vec<usize>,
    /// Values in C order.
    pub data: Vec<T>,
}

/// Python tuple literal for a shape: `()`, `(3,)`, `(2, 2, 2)`.
fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [n] => format!("({n},)"),
        _ => {
            let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
            format!("({})", dims.join(", "))
        }
    }
}

/// Encode `data` as a version 1.0 `.npy` payload of the given shape.
///
/// `data.len()` should equal the product of `shape` (1 for a scalar).
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::npy;
///
/// let bytes = npy::encode(&[2], &[1.0f32, 2.0]);
/// assert_eq!(&bytes[..6], b"\x93NUMPY");
/// assert_eq!(bytes.len() % 64, 8);
///
/// let array = npy::decode::<f32>(&bytes).unwrap();
/// assert_eq!(array.shape, vec![2]);
/// assert_eq!(array.data, vec![1.0, 2.0]);
/// ```
#[must_use]
pub fn encode<T: NpyElement>(shape: &[usize], data: &[T]) -> Vec<u8> {
    let mut dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        T::DESCR,
        shape_literal(shape)
    );
    let unpadded = MAGIC.len() + 4 + dict.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    dict.extend(std::iter::repeat_n(' ', padding));
    dict.push('\n');

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: a three-axis shape dictionary is far below u16::MAX bytes
    let header_len = dict.len() as u16;

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + dict.len() + data.len() * T::SIZE);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    for &value in data {
        value.write_le(&mut out);
    }
    out
}

/// Decode a `.npy` payload holding elements of type `T`.
///
/// # Errors
///
/// Returns [`NpyError::Format`] for a bad magic string, unsupported version,
/// a `descr` other than `T::DESCR`, Fortran order, or a body whose length
/// does not match the shape.
pub fn decode<T: NpyElement>(bytes: &[u8]) -> Result<NpyArray<T>, NpyError> {
    if bytes.len() < MAGIC.len() + 4 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(NpyError::format("missing NUMPY magic"));
    }
    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10),
        2 if bytes.len() >= 12 => {
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            let len = usize::try_from(len).map_err(|_| NpyError::format("header too long"))?;
            (len, 12)
        }
        v => return Err(NpyError::format(format!("unsupported version {v}"))),
    };
    let body_start = header_start + header_len;
    let header = bytes
        .get(header_start..body_start)
        .ok_or_else(|| NpyError::format("truncated header"))?;
    let header =
        std::str::from_utf8(header).map_err(|_| NpyError::format("header is not UTF-8"))?;

    let descr = dict_value(header, "descr")?;
    if descr.trim_matches('\'') != T::DESCR {
        return Err(NpyError::format(format!(
            "dtype {descr}, expected '{}'",
            T::DESCR
        )));
    }
    if dict_value(header, "fortran_order")? != "False" {
        return Err(NpyError::format("Fortran order is not supported"));
    }
    let shape = parse_shape(dict_value(header, "shape")?)?;

    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| NpyError::format("shape overflows"))?;
    let body = &bytes[body_start..];
    if Some(body.len()) != count.checked_mul(T::SIZE) {
        return Err(NpyError::format(format!(
            "body holds {} bytes, shape {:?} needs {}",
            body.len(),
            shape,
            count.saturating_mul(T::SIZE)
        )));
    }

    let data = body.chunks_exact(T::SIZE).map(T::read_le).collect();
    Ok(NpyArray { shape, data })
}

/// Raw text of `key`'s value in a NumPy header dictionary.
fn dict_value<'a>(header: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let needle = format!("'{key}':");
    let start = header
        .find(&needle)
        .ok_or_else(|| NpyError::format(format!("header has no '{key}'")))?
        + needle.len();
    let rest = header[start..].trim_start();
    let end = if rest.starts_with('(') {
        rest.find(')').map(|i| i + 1)
    } else {
        rest.find([',', '}'])
    }
    .ok_or_else(|| NpyError::format(format!("unterminated '{key}'")))?;
    Ok(rest[..end].trim())
}

fn parse_shape(literal: &str) -> Result<Vec<usize>, NpyError> {
    let inner = literal
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| NpyError::format(format!("bad shape {literal}")))?;
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| NpyError::format(format!("bad dimension {s}")))
        })
        .collect()
}

/// Pack named `.npy` payloads into a stored `.npz` archive.
///
/// Entry names get a `.npy` suffix, as `numpy.savez` does.
///
/// # Errors
///
/// Returns [`NpyError::Archive`] if the archive cannot be assembled.
pub fn encode_npz(entries: &[(&str, Vec<u8>)]) -> Result<Vec<u8>, NpyError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, payload) in entries {
        zip.start_file(format!("{name}.npy"), options)?;
        zip.write_all(payload)?;
    }
    Ok(zip.finish()?.into_inner())
}

/// Read one array out of an `.npz` archive.
///
/// # Errors
///
/// Returns [`NpyError`] if the archive is unreadable, the entry is missing,
/// or the entry is not a valid array of `T`.
pub fn read_npz_entry<T: NpyElement>(archive: &[u8], name: &str) -> Result<NpyArray<T>, NpyError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut entry = zip.by_name(&format!("{name}.npy"))?;
    let mut payload = Vec::new();
    entry.read_to_end(&mut payload)?;
    decode(&payload)
}
