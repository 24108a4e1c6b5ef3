use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const MAGIC: [u8; 4] = *b"glTF";
pub const VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = u32::from_le_bytes(*b"JSON");
pub const CHUNK_BIN: u32 = u32::from_le_bytes(*b"BIN\0");

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Decoded binary glTF container: the JSON chunk plus the optional binary
/// chunk that backs buffer 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbContainer {
    version: u32,
    length: u32,
    json: Vec<u8>,
    bin: Option<Vec<u8>>,
}

impl GlbContainer {
    /// Reads a container from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = read_file(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Parses a container already resident in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(malformed(format!(
                "container too small to contain header (len={})",
                data.len()
            )));
        }

        let magic = &data[..4];
        if magic != MAGIC {
            return Err(malformed(format!(
                "invalid container magic: expected glTF, found {magic:?}"
            )));
        }

        let mut cursor = 4;
        let version = read_u32_from_slice(data, &mut cursor)?;
        if version != VERSION {
            return Err(malformed(format!(
                "unsupported container version {version} (expected {VERSION})"
            )));
        }
        let length = read_u32_from_slice(data, &mut cursor)?;
        if length as usize > data.len() {
            return Err(malformed(format!(
                "declared length {length} exceeds file size {}",
                data.len()
            )));
        }
        // Chunks are bounded by the declared length, not by trailing bytes.
        let data = &data[..length as usize];

        let (json_type, json) = read_chunk(data, &mut cursor)?;
        if json_type != CHUNK_JSON {
            return Err(malformed(format!(
                "first chunk has type {json_type:#010x}, expected JSON"
            )));
        }

        let bin = if cursor < data.len() {
            let (chunk_type, bytes) = read_chunk(data, &mut cursor)?;
            if chunk_type == CHUNK_BIN {
                Some(bytes.to_vec())
            } else {
                log::debug!("ignoring trailing chunk of type {chunk_type:#010x}");
                None
            }
        } else {
            None
        };

        log::debug!(
            "container v{version}: {length} bytes, JSON chunk {} bytes, BIN chunk {:?}",
            json.len(),
            bin.as_ref().map(Vec::len)
        );

        Ok(Self {
            version,
            length,
            json: json.to_vec(),
            bin,
        })
    }

    /// Returns the version stored in the header.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the total length stored in the header.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Returns the raw JSON chunk.
    pub fn json(&self) -> &[u8] {
        &self.json
    }

    /// Returns the binary chunk, if the container has one.
    pub fn bin(&self) -> Option<&[u8]> {
        self.bin.as_deref()
    }

    pub fn into_parts(self) -> (Vec<u8>, Option<Vec<u8>>) {
        (self.json, self.bin)
    }
}

fn malformed(message: String) -> Error {
    Error::MalformedContainer(message)
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|err| Error::io(path, err))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|err| Error::io(path, err))?;
    Ok(data)
}

fn read_chunk<'a>(data: &'a [u8], cursor: &mut usize) -> Result<(u32, &'a [u8])> {
    if *cursor + CHUNK_HEADER_LEN > data.len() {
        return Err(malformed(format!(
            "chunk header at offset {} extends past declared length {}",
            *cursor,
            data.len()
        )));
    }
    let chunk_len = read_u32_from_slice(data, cursor)? as usize;
    let chunk_type = read_u32_from_slice(data, cursor)?;
    let start = *cursor;
    let end = start
        .checked_add(chunk_len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            malformed(format!(
                "chunk at offset {start} (len={chunk_len}) extends past declared length {}",
                data.len()
            ))
        })?;
    *cursor = end;
    Ok((chunk_type, &data[start..end]))
}

fn read_u32_from_slice(data: &[u8], cursor: &mut usize) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(*cursor..*cursor + 4)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| malformed("unexpected end of container while reading 32-bit value".into()))?;
    *cursor += 4;
    Ok(u32::from_le_bytes(bytes))
}

/// Directory external URIs of a container at `path` resolve against.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    static JSON: Lazy<String> =
        Lazy::new(|| r#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":4}]}"#.to_string());

    pub(crate) fn build_container(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&VERSION.to_le_bytes());
        buffer.extend_from_slice(&0u32.to_le_bytes()); // placeholder for length

        buffer.extend_from_slice(&(json.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        buffer.extend_from_slice(json);

        if let Some(bin) = bin {
            buffer.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            buffer.extend_from_slice(bin);
        }

        let length = buffer.len() as u32;
        buffer[8..12].copy_from_slice(&length.to_le_bytes());
        buffer
    }

    fn write_container(buffer: &[u8]) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().expect("tmp file");
        tmp.write_all(buffer).expect("write container");
        tmp
    }

    #[test]
    fn open_container_exposes_chunks_unmodified() {
        let bin = [1u8, 2, 3, 4];
        let tmp = write_container(&build_container(JSON.as_bytes(), Some(&bin)));
        let container = GlbContainer::open(tmp.path()).expect("open container");
        assert_eq!(container.version(), 2);
        assert_eq!(container.json(), JSON.as_bytes());
        assert_eq!(container.bin(), Some(&bin[..]));
    }

    #[test]
    fn json_only_container_has_no_bin_chunk() {
        let buffer = build_container(JSON.as_bytes(), None);
        let container = GlbContainer::from_bytes(&buffer).unwrap();
        assert_eq!(container.length() as usize, buffer.len());
        assert!(container.bin().is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buffer = build_container(JSON.as_bytes(), None);
        buffer[..4].copy_from_slice(b"GLTF");
        assert!(matches!(
            GlbContainer::from_bytes(&buffer),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut buffer = build_container(JSON.as_bytes(), None);
        buffer[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            GlbContainer::from_bytes(&buffer),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn declared_length_past_end_is_rejected() {
        let mut buffer = build_container(JSON.as_bytes(), Some(&[0; 4]));
        let too_long = buffer.len() as u32 + 8;
        buffer[8..12].copy_from_slice(&too_long.to_le_bytes());
        assert!(matches!(
            GlbContainer::from_bytes(&buffer),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn chunk_length_past_declared_length_is_rejected() {
        let mut buffer = build_container(JSON.as_bytes(), None);
        let bogus = JSON.len() as u32 + 1;
        buffer[12..16].copy_from_slice(&bogus.to_le_bytes());
        assert!(matches!(
            GlbContainer::from_bytes(&buffer),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn unknown_second_chunk_is_ignored() {
        let mut buffer = build_container(JSON.as_bytes(), Some(&[9; 4]));
        let type_offset = 12 + 8 + JSON.len() + 4;
        buffer[type_offset..type_offset + 4].copy_from_slice(b"XTRA");
        let container = GlbContainer::from_bytes(&buffer).unwrap();
        assert!(container.bin().is_none());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = GlbContainer::open("definitely/not/here.glb").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
