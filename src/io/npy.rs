//! Minimal NPY v1.0 reader/writer for 2D float arrays
//!
//! Layout: magic `\x93NUMPY`, version 1.0, little-endian u16 header length,
//! an ASCII dict padded with spaces and terminated by `\n` so that the data
//! starts on a 64-byte boundary, then the raw C-order values.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array2;

use crate::core::{LbmError, Real, Result};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;
// magic + version + header length
const PREAMBLE: usize = 10;

fn byte_order() -> char {
    if cfg!(target_endian = "little") {
        '<'
    } else {
        '>'
    }
}

/// Dtype string of `T` in native byte order, e.g. `<f8`
pub fn descr<T: Real>() -> String {
    format!("{}{}", byte_order(), T::NPY_KIND)
}

/// Full header (preamble included) for an array of `shape`
pub fn header<T: Real>(shape: (usize, usize)) -> Vec<u8> {
    let mut dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({}, {}), }}",
        descr::<T>(),
        shape.0,
        shape.1
    );
    let unpadded = PREAMBLE + dict.len() + 1;
    let pad = (ALIGN - unpadded % ALIGN) % ALIGN;
    dict.extend(std::iter::repeat(' ').take(pad));
    dict.push('\n');

    let mut out = Vec::with_capacity(PREAMBLE + dict.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out
}

pub fn write_npy<T: Real>(path: impl AsRef<Path>, array: &Array2<T>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&header::<T>(array.dim()))?;
    match array.as_slice() {
        Some(values) => out.write_all(bytemuck::cast_slice(values))?,
        None => {
            let values: Vec<T> = array.iter().copied().collect();
            out.write_all(bytemuck::cast_slice(values.as_slice()))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn invalid(path: &Path, what: &str) -> LbmError {
    LbmError::Snapshot(format!("{}: {what}", path.display()))
}

/// Read back a file written by [`write_npy`] with the same element type
pub fn read_npy<T: Real>(path: impl AsRef<Path>) -> Result<Array2<T>> {
    let path = path.as_ref();
    let mut input = BufReader::new(File::open(path)?);

    let mut preamble = [0u8; PREAMBLE];
    input.read_exact(&mut preamble)?;
    if &preamble[..6] != MAGIC {
        return Err(invalid(path, "not an npy file"));
    }
    if preamble[6] != 1 {
        return Err(invalid(path, "unsupported npy version"));
    }
    let header_len = u16::from_le_bytes([preamble[8], preamble[9]]) as usize;
    let mut dict = vec![0u8; header_len];
    input.read_exact(&mut dict)?;
    let dict = String::from_utf8(dict).map_err(|_| invalid(path, "header is not ASCII"))?;

    if !dict.contains(&format!("'descr': '{}'", descr::<T>())) {
        return Err(invalid(path, "element type differs"));
    }
    if !dict.contains("'fortran_order': False") {
        return Err(invalid(path, "fortran order is not supported"));
    }
    let shape = parse_shape(&dict).ok_or_else(|| invalid(path, "missing 2D shape"))?;

    let mut values = vec![T::ZERO; shape.0 * shape.1];
    input.read_exact(bytemuck::cast_slice_mut(values.as_mut_slice()))?;
    Array2::from_shape_vec(shape, values).map_err(|e| invalid(path, &e.to_string()))
}

fn parse_shape(dict: &str) -> Option<(usize, usize)> {
    let start = dict.find("'shape': (")? + "'shape': (".len();
    let end = start + dict[start..].find(')')?;
    let mut dims = dict[start..end].split(',').map(str::trim).filter(|s| !s.is_empty());
    let nx = dims.next()?.parse().ok()?;
    let ny = dims.next()?.parse().ok()?;
    Some((nx, ny))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_aligned_and_terminated() {
        for shape in [(3, 4), (128, 128), (1, 100_000)] {
            let h = header::<f64>(shape);
            assert_eq!(h.len() % ALIGN, 0);
            assert_eq!(&h[..6], MAGIC);
            assert_eq!(h[6..8], [1, 0]);
            assert_eq!(*h.last().unwrap(), b'\n');
            let len = u16::from_le_bytes([h[8], h[9]]) as usize;
            assert_eq!(len, h.len() - PREAMBLE);
        }
    }

    #[test]
    fn header_describes_dtype_and_shape() {
        let h = header::<f32>((7, 5));
        let text = String::from_utf8(h[PREAMBLE..].to_vec()).unwrap();
        assert!(text.starts_with(&format!("{{'descr': '{}f4', 'fortran_order': False, 'shape': (7, 5), }}", byte_order())));
        assert_eq!(parse_shape(&text), Some((7, 5)));
    }

    #[test]
    fn file_holds_values_in_row_major_order() {
        let dir = std::env::temp_dir().join(format!("lbm-npy-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ux_0.npy");

        let array = Array2::from_shape_fn((3, 2), |(x, y)| (x * 10 + y) as f64);
        write_npy(&path, &array).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let offset = header::<f64>((3, 2)).len();
        assert_eq!(offset, 128);
        assert_eq!(bytes.len(), offset + 6 * 8);
        let first = f64::from_ne_bytes(bytes[offset..offset + 8].try_into().unwrap());
        let second = f64::from_ne_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
        assert_eq!((first, second), (0.0, 1.0));

        assert_eq!(read_npy::<f64>(&path).unwrap(), array);
        assert!(read_npy::<f32>(&path).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
