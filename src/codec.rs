//! Binary Codec - whole-container snapshots on disk.
//!
//! # Format
//!
//! ```text
//! [i32 live_element_count]
//! repeat live_element_count times:
//!     [varint length][UTF-8 type tag]
//!     [u32 payload length][payload written by the element]
//! ```
//!
//! All integers are little-endian. There is no header, version or
//! checksum. The payload length lets a reader step over entries whose tag
//! it does not know, which are skipped with a warning.
//!
//! Insertion ids are not stored: a reloaded container stamps its elements
//! `0..N` in stream order.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::array::ArrayContainer;
use crate::error::{Error, Result};
use crate::item::{validate, Encode, Item};
use crate::query::Query;
use crate::wire::{WireReader, WireWriter};

/// Builds one element from its payload.
pub type Decoder<T> = fn(&mut WireReader<'_>) -> Result<T>;

/// Fixed tag → decoder table for one element type.
pub struct Registry<T> {
    decoders: FxHashMap<&'static str, Decoder<T>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            decoders: FxHashMap::default(),
        }
    }

    /// Builder form of [`Registry::register`].
    pub fn with(mut self, tag: &'static str, decoder: Decoder<T>) -> Self {
        self.register(tag, decoder);
        self
    }

    /// Map `tag` to `decoder`, replacing any earlier entry.
    pub fn register(&mut self, tag: &'static str, decoder: Decoder<T>) {
        self.decoders.insert(tag, decoder);
    }

    #[inline]
    pub fn get(&self, tag: &str) -> Option<Decoder<T>> {
        self.decoders.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Element types that know their own decoder table.
pub trait Decode: Sized {
    fn registry() -> Registry<Self>;
}

/// Encode every live element of `container` into one buffer.
///
/// # Errors
/// `NotSerializable` naming the first element without an encoding, or
/// `InvalidArgument` for an element whose price was edited below zero
/// after it was added. Both checks run over the whole container before
/// anything is encoded, so no stream is produced that `decode` would
/// refuse.
pub fn encode<C: Query>(container: &C) -> Result<Vec<u8>> {
    let mut encoders: Vec<&dyn Encode> = Vec::new();
    for (position, item) in container.items().enumerate() {
        validate(item).map_err(|e| match e {
            Error::InvalidArgument { message } => {
                Error::invalid_argument(format!("position {}: {}", position, message))
            }
            other => other,
        })?;
        match item.as_encode() {
            Some(encoder) => encoders.push(encoder),
            None => return Err(Error::not_serializable(position, item.name())),
        }
    }

    let count = i32::try_from(encoders.len()).map_err(|_| {
        Error::invalid_argument(format!("{} elements exceed the format's i32 count", encoders.len()))
    })?;

    let mut out = WireWriter::new();
    out.put_i32(count);
    for encoder in encoders {
        out.put_str(encoder.type_tag());

        let len_at = out.len();
        out.put_u32(0);
        encoder.encode(&mut out);
        let payload_len = out.len() - len_at - 4;
        let payload_len = u32::try_from(payload_len).map_err(|_| {
            Error::invalid_argument(format!("{} payload of {} bytes is too large", encoder.type_tag(), payload_len))
        })?;
        out.patch_u32(len_at, payload_len);
    }
    Ok(out.into_inner())
}

/// Encode `container` and write the bytes to `writer`.
pub fn write_to<C: Query, W: Write>(container: &C, writer: &mut W) -> Result<()> {
    let bytes = encode(container)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write `container` to the file at `path`.
///
/// The file is only created once encoding has succeeded, so a
/// `NotSerializable` failure leaves the filesystem untouched.
pub fn serialize<C: Query, P: AsRef<Path>>(container: &C, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(container)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    log::debug!(
        "wrote {} elements ({} bytes) to {}",
        container.items().count(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Rebuild a container from `bytes` using `registry`.
///
/// # Errors
/// `MalformedData` for a negative count, a truncated entry, a payload its
/// decoder does not consume exactly, an element a container would reject,
/// or bytes left over after the last entry.
pub fn decode<T: Item>(bytes: &[u8], registry: &Registry<T>) -> Result<ArrayContainer<T>> {
    let mut reader = WireReader::new(bytes);
    let count = reader.get_i32()?;
    if count < 0 {
        return Err(Error::malformed(format!("negative element count {}", count)));
    }

    let mut container = ArrayContainer::new();
    let mut skipped = 0usize;
    for entry in 0..count as usize {
        let tag = reader.get_str()?;
        let len = reader.get_u32()? as usize;
        let payload = reader.take(len)?;

        let decoder = match registry.get(&tag) {
            Some(decoder) => decoder,
            None => {
                log::warn!("skipping entry {} with unknown tag {:?} ({} bytes)", entry, tag, len);
                skipped += 1;
                continue;
            }
        };

        let mut fields = WireReader::new(payload);
        let item = decoder(&mut fields).map_err(|e| in_entry(entry, &tag, e))?;
        if !fields.is_empty() {
            return Err(in_entry(
                entry,
                &tag,
                Error::malformed(format!("{} unread payload bytes", fields.remaining())),
            ));
        }
        container.add(item).map_err(|e| in_entry(entry, &tag, Error::malformed(e.to_string())))?;
    }

    if !reader.is_empty() {
        return Err(Error::malformed(format!(
            "{} trailing bytes after {} entries",
            reader.remaining(),
            count
        )));
    }

    log::debug!("decoded {} elements, skipped {}", container.count(), skipped);
    Ok(container)
}

/// Read a whole stream from `reader` and decode it.
pub fn read_from<T: Item, R: Read>(reader: &mut R, registry: &Registry<T>) -> Result<ArrayContainer<T>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, registry)
}

/// Load the file at `path` with the element type's own registry.
pub fn deserialize<T: Item + Decode, P: AsRef<Path>>(path: P) -> Result<ArrayContainer<T>> {
    let bytes = std::fs::read(path.as_ref())?;
    log::debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
    decode(&bytes, &T::registry())
}

/// Prefix a decode failure with the entry it came from.
fn in_entry(entry: usize, tag: &str, err: Error) -> Error {
    match err {
        Error::MalformedData { message } => {
            Error::malformed(format!("entry {} ({}): {}", entry, tag, message))
        }
        other => other,
    }
}
