//! Payload embedding API
//!
//! [`Image`] ties the scanner, chunk codec, segment store and assembler
//! together: load a JPEG, write payloads into APPn segments, read them back,
//! and serialize the result.

use crate::{
    assembler,
    chunk::{self, ChunkSet, Identifier},
    error::{Error, Result},
    marker::{app_marker, is_free_segment},
    scanner::scan,
    store::SegmentStore,
};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Options controlling [`Image::write`]
///
/// The default appends chunks and accepts any APPn number, so a second write
/// with the same segment and identifier produces a set that no longer
/// decodes. Enable `replace_existing` to overwrite instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Remove chunks already stored under the same segment and identifier
    pub replace_existing: bool,
    /// Reject APPn numbers outside [`FREE_SEGMENTS`](crate::FREE_SEGMENTS)
    pub require_free_segment: bool,
}

impl WriteOptions {
    /// Default options: append, any APPn number
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }

    pub fn require_free_segment(mut self, require: bool) -> Self {
        self.require_free_segment = require;
        self
    }
}

/// A loaded JPEG that payloads can be written to and read from
///
/// # Example
///
/// ```no_run
/// use squeeze_io::Image;
///
/// # fn main() -> squeeze_io::Result<()> {
/// let mut image = Image::open("photo.jpg")?;
/// image.write(4, "PSZ", b"0123456789")?;
/// image.save("photo_with_payload.jpg")?;
///
/// let image = Image::open("photo_with_payload.jpg")?;
/// assert_eq!(image.read(4, "PSZ")?, b"0123456789");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Image {
    store: SegmentStore,
    options: WriteOptions,
}

impl Image {
    /// Parse a JPEG held in memory
    pub fn load(bytes: &[u8]) -> Result<Self> {
        ImageBuilder::new().load(bytes)
    }

    /// Read a JPEG to the end of `reader` and parse it
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        ImageBuilder::new().from_reader(reader)
    }

    /// Open and parse a JPEG file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ImageBuilder::new().open(path)
    }

    /// Open and parse a JPEG file through a memory map
    ///
    /// The file is share-locked while it is mapped; the parsed image owns
    /// its data and does not keep the file open.
    #[cfg(feature = "memory-mapped")]
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        ImageBuilder::new().open_mmap(path)
    }

    /// Start building an image with non-default [`WriteOptions`]
    pub fn builder() -> ImageBuilder {
        ImageBuilder::new()
    }

    /// Wrap an already parsed store
    pub fn from_store(store: SegmentStore) -> Self {
        Self {
            store,
            options: WriteOptions::default(),
        }
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    pub fn set_options(&mut self, options: WriteOptions) {
        self.options = options;
    }

    /// The parsed segments
    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn into_store(self) -> SegmentStore {
        self.store
    }

    /// Embed `data` in APPn segment `segment` under `identifier`
    ///
    /// Returns the number of chunks (APPn segments) written. On error the
    /// image is left unchanged.
    ///
    /// # Errors
    /// - `InvalidSegmentNumber` if `segment` is above 15
    /// - `ReservedSegment` if `require_free_segment` is set and `segment` is not free
    /// - `PayloadTooLarge` if `data` needs more than 255 chunks
    pub fn write<I: Into<Identifier>>(&mut self, segment: u8, identifier: I, data: &[u8]) -> Result<usize> {
        let identifier = identifier.into();
        app_marker(segment)?;
        if self.options.require_free_segment && !is_free_segment(segment) {
            return Err(Error::ReservedSegment(segment));
        }

        let payloads: Vec<Vec<u8>> = chunk::encode(identifier, data)?
            .iter()
            .map(chunk::Chunk::to_bytes)
            .collect();

        if self.options.replace_existing {
            let removed = self.remove_chunks(segment, identifier);
            if removed > 0 {
                log::debug!(
                    "replacing {} existing chunks tagged {} in APP{}",
                    removed,
                    identifier,
                    segment
                );
            }
        }

        let written = self.store.insert_app_segments(segment, payloads)?;
        log::debug!(
            "wrote {} bytes tagged {} to APP{} in {} chunks",
            data.len(),
            identifier,
            segment,
            written
        );
        Ok(written)
    }

    /// Recover the payload stored in APPn segment `segment` under `identifier`
    ///
    /// # Errors
    /// - `InvalidSegmentNumber` if `segment` is above 15
    /// - `SegmentNotFound` if no chunk carries `identifier`
    /// - `CorruptChunkSequence` if the chunks do not form one complete set
    pub fn read<I: Into<Identifier>>(&self, segment: u8, identifier: I) -> Result<Vec<u8>> {
        let identifier = identifier.into();
        app_marker(segment)?;
        chunk::decode(identifier, self.store.segments_for(segment))
            .map_err(|err| err.at(segment, identifier))
    }

    /// Remove every chunk stored in APPn segment `segment` under `identifier`
    ///
    /// Returns how many segments were removed; zero if there were none.
    pub fn remove<I: Into<Identifier>>(&mut self, segment: u8, identifier: I) -> Result<usize> {
        app_marker(segment)?;
        Ok(self.remove_chunks(segment, identifier.into()))
    }

    /// Summarize the chunk sets stored in APPn segment `segment`
    ///
    /// Segments too short to hold a chunk header are skipped.
    pub fn payloads(&self, segment: u8) -> Result<Vec<ChunkSet>> {
        app_marker(segment)?;
        Ok(chunk::summarize(self.store.segments_for(segment)))
    }

    /// Serialize to a new JPEG byte buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        assembler::serialize(&self.store)
    }

    /// Serialize into `writer`, returning the number of bytes written
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64> {
        assembler::write_store(&self.store, writer)
    }

    /// Serialize into a file, replacing it if it exists
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut output = BufWriter::new(File::create(path)?);
        self.write_to(&mut output)?;
        Ok(())
    }

    fn remove_chunks(&mut self, segment: u8, identifier: Identifier) -> usize {
        self.store.remove_app_segments(segment, |payload| {
            chunk::Chunk::parse(payload).is_some_and(|chunk| chunk.identifier == identifier)
        })
    }
}

/// Builder for loading images with custom [`WriteOptions`]
///
/// # Example
///
/// ```no_run
/// use squeeze_io::Image;
///
/// # fn main() -> squeeze_io::Result<()> {
/// let mut image = Image::builder()
///     .replace_existing(true)
///     .require_free_segment(true)
///     .open("photo.jpg")?;
/// image.write(5, "ABC", b"first")?;
/// image.write(5, "ABC", b"second")?;
/// assert_eq!(image.read(5, "ABC")?, b"second");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageBuilder {
    options: WriteOptions,
}

impl ImageBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.options = self.options.replace_existing(replace);
        self
    }

    pub fn require_free_segment(mut self, require: bool) -> Self {
        self.options = self.options.require_free_segment(require);
        self
    }

    /// Parse a JPEG held in memory
    pub fn load(self, bytes: &[u8]) -> Result<Image> {
        Ok(Image {
            store: scan(bytes)?,
            options: self.options,
        })
    }

    /// Read a JPEG to the end of `reader` and parse it
    pub fn from_reader<R: Read>(self, mut reader: R) -> Result<Image> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.load(&bytes)
    }

    /// Open and parse a JPEG file
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Image> {
        let bytes = std::fs::read(path)?;
        self.load(&bytes)
    }

    /// Open and parse a JPEG file through a memory map
    #[cfg(feature = "memory-mapped")]
    pub fn open_mmap<P: AsRef<Path>>(self, path: P) -> Result<Image> {
        use fs2::FileExt;

        let file = File::open(path)?;
        FileExt::lock_shared(&file)?;
        // SAFETY: the shared lock keeps cooperating writers from truncating
        // the file while it is mapped; the scan copies everything it keeps.
        let parsed = unsafe { memmap2::Mmap::map(&file) }
            .map_err(Error::from)
            .and_then(|mmap| self.load(&mmap));
        FileExt::unlock(&file)?;
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{SequenceFault, CHUNK_CAPACITY};

    const MINIMAL: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02, 0x00, 0xFF, 0xD9,
    ];

    #[test]
    fn test_write_read_round_trip() {
        let mut image = Image::load(MINIMAL).unwrap();
        assert_eq!(image.write(4, "PSZ", b"0123456789").unwrap(), 1);
        assert_eq!(image.read(4, "PSZ").unwrap(), b"0123456789");
    }

    #[test]
    fn test_write_invalid_segment() {
        let mut image = Image::load(MINIMAL).unwrap();
        assert!(matches!(
            image.write(16, "PSZ", b"x"),
            Err(Error::InvalidSegmentNumber(16))
        ));
        assert!(matches!(
            image.read(200, "PSZ"),
            Err(Error::InvalidSegmentNumber(200))
        ));
    }

    #[test]
    fn test_reserved_segment_only_in_strict_mode() {
        let mut image = Image::load(MINIMAL).unwrap();
        image.write(1, "ABC", b"lenient").unwrap();

        let mut strict = Image::builder().require_free_segment(true).load(MINIMAL).unwrap();
        assert!(matches!(
            strict.write(1, "ABC", b"strict"),
            Err(Error::ReservedSegment(1))
        ));
        assert_eq!(strict.store().len(), 2);
        strict.write(15, "ABC", b"strict").unwrap();
    }

    #[test]
    fn test_repeated_write_appends_by_default() {
        let mut image = Image::load(MINIMAL).unwrap();
        image.write(5, "ABC", b"one").unwrap();
        image.write(5, "ABC", b"two").unwrap();
        match image.read(5, "ABC") {
            Err(Error::CorruptChunkSequence { segment, fault, .. }) => {
                assert_eq!(segment, 5);
                assert_eq!(fault, SequenceFault::DuplicateIndex { index: 0 });
            }
            other => panic!("expected CorruptChunkSequence, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_existing() {
        let mut image = Image::builder().replace_existing(true).load(MINIMAL).unwrap();
        image.write(5, "ABC", &vec![1u8; CHUNK_CAPACITY * 2]).unwrap();
        image.write(5, "XYZ", b"keep").unwrap();
        image.write(5, "ABC", b"short").unwrap();
        assert_eq!(image.read(5, "ABC").unwrap(), b"short");
        assert_eq!(image.read(5, "XYZ").unwrap(), b"keep");
        assert_eq!(image.store().segments_for(5).len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut image = Image::load(MINIMAL).unwrap();
        image.write(6, "AAA", b"a").unwrap();
        image.write(6, "BBB", b"b").unwrap();
        assert_eq!(image.remove(6, "AAA").unwrap(), 1);
        assert_eq!(image.remove(6, "AAA").unwrap(), 0);
        assert!(matches!(
            image.read(6, "AAA"),
            Err(Error::SegmentNotFound { segment: 6, .. })
        ));
        assert_eq!(image.read(6, "BBB").unwrap(), b"b");
    }

    #[test]
    fn test_payloads_listing() {
        let mut image = Image::load(MINIMAL).unwrap();
        image.write(7, "AAA", b"hello").unwrap();
        image.write(7, "BBB", &vec![0u8; CHUNK_CAPACITY + 1]).unwrap();
        let sets = image.payloads(7).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].identifier, Identifier::from("AAA"));
        assert_eq!(sets[0].size, 5);
        assert_eq!(sets[1].declared, 2);
        assert_eq!(sets[1].present, 2);
        assert!(sets.iter().all(ChunkSet::is_complete));
        assert!(image.payloads(8).unwrap().is_empty());
    }

    #[test]
    fn test_serialize_places_segments_before_scan() {
        let mut image = Image::load(MINIMAL).unwrap();
        image.write(4, "PSZ", b"").unwrap();
        let bytes = image.serialize().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[2..11], &[0xFF, 0xE4, 0x00, 0x07, b'P', b'S', b'Z', 1, 0]);
        assert_eq!(&bytes[11..], &MINIMAL[2..]);
    }
}
