use super::PointCodec;
use crate::{Error, Header, Point, Result, Transform, Vector, point::Format, raw};
use laz::{DecompressionSelection, LasZipDecompressor, LazDecompressor, LazVlr};
use std::io::{Cursor, Read, Seek};

/// Decodes laszip-compressed point records.
pub struct LazCodec {
    decompressor: Box<dyn LazDecompressor + Send>,
    buffer: Cursor<Vec<u8>>,
    format: Format,
    transforms: Vector<Transform>,
}

impl LazCodec {
    /// Creates a codec that starts decompressing at the current position of `read`.
    ///
    /// Fields whose [selective](crate::selective) bit is clear in `decompress_selective` are
    /// left undecoded when the point format allows it.
    pub fn new<R>(read: R, header: &Header, decompress_selective: u32) -> Result<LazCodec>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let vlr = laz_vlr(header)?;
        let selection = DecompressionSelection(decompress_selective);
        let decompressor = LasZipDecompressor::selective(read, vlr, selection)?;
        Ok(LazCodec::with_decompressor(Box::new(decompressor), header))
    }

    /// Creates a codec that decompresses whole chunks in parallel.
    ///
    /// Parallel decompression always decodes every field.
    #[cfg(feature = "laz-parallel")]
    pub fn new_parallel<R>(read: R, header: &Header) -> Result<LazCodec>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let decompressor = laz::ParLasZipDecompressor::new(read, laz_vlr(header)?)?;
        Ok(LazCodec::with_decompressor(Box::new(decompressor), header))
    }

    fn with_decompressor(decompressor: Box<dyn LazDecompressor + Send>, header: &Header) -> LazCodec {
        let format = header.point_format();
        LazCodec {
            decompressor,
            buffer: Cursor::new(vec![0u8; usize::from(format.len())]),
            format,
            transforms: header.transforms(),
        }
    }
}

fn laz_vlr(header: &Header) -> Result<LazVlr> {
    let laszip = header.laszip().ok_or(Error::MissingLaszipVlr)?;
    Ok(LazVlr::from_buffer(&laszip.to_bytes()?)?)
}

impl PointCodec for LazCodec {
    fn read(&mut self, point: &mut Point) -> Result<()> {
        self.decompressor.decompress_one(self.buffer.get_mut())?;
        self.buffer.set_position(0);
        raw::point::read_into(&mut self.buffer, self.format, point)?;
        point.transforms = self.transforms;
        Ok(())
    }

    fn seek(&mut self, _current: u64, target: u64) -> Result<()> {
        self.decompressor.seek(target)?;
        Ok(())
    }
}

impl std::fmt::Debug for LazCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazCodec")
            .field("format", &self.format)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}
