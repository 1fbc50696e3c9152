//! Self-describing bundle container for encoded planes.
//!
//! A bundle carries per-plane metadata, the symbol frequency table and a
//! single bit-packed payload. The Huffman tree itself is never serialized;
//! decoders rebuild it from the frequency table through the same
//! deterministic construction the encoder used.
//!
//! Wire layout, all integers big-endian:
//!
//! ```text
//! magic        [u8;4]   "cpkb"
//! version      u8       1
//! plane_count  u32
//! symbol_count u16
//! plane entries: plane_count x { bit_length u64, height u32, width u32 }
//! frequency table: symbol_count x { symbol u8, frequency u64 }, ascending
//! payload_len  u64      bytes
//! payload      packed bits, MSB-first, final byte zero-padded
//! ```

use crate::huffman::HuffmanTree;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chromapack_core::{BitReader, BitWriter, Error, Plane, Result};
use std::io::{Cursor, Read};
use tracing::debug;

/// Bundle magic bytes.
pub const BUNDLE_MAGIC: [u8; 4] = *b"cpkb";
/// Current bundle format version.
pub const BUNDLE_VERSION: u8 = 1;

/// One entropy-coded plane awaiting packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPlane {
    /// Code bits, MSB-first, final byte zero-padded.
    pub bits: Vec<u8>,
    /// Number of meaningful bits in `bits`.
    pub bit_length: u64,
    /// Plane shape as `(height, width)`.
    pub shape: (u32, u32),
}

/// Per-plane metadata as stored in the bundle header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneMeta {
    /// Number of payload bits belonging to this plane.
    pub bit_length: u64,
    /// Plane height in samples.
    pub height: u32,
    /// Plane width in samples.
    pub width: u32,
}

/// A parsed bundle: plane metadata, frequency table and bit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    planes: Vec<PlaneMeta>,
    frequencies: Vec<(u8, u64)>,
    payload: Vec<u8>,
}

impl Bundle {
    /// Serialize encoded planes and their shared frequency table.
    ///
    /// Plane payloads are concatenated at the bit level in encode order;
    /// only the final payload byte is padded. The frequency table is
    /// stored sorted ascending by symbol.
    pub fn pack(planes: &[EncodedPlane], frequencies: &[(u8, u64)]) -> Result<Vec<u8>> {
        let mut table = frequencies.to_vec();
        table.sort_by_key(|&(symbol, _)| symbol);

        let mut payload = BitWriter::new();
        for plane in planes {
            if plane.bit_length > plane.bits.len() as u64 * 8 {
                return Err(Error::validation(format!(
                    "encoded plane claims {} bits but carries only {} bytes",
                    plane.bit_length,
                    plane.bits.len()
                )));
            }
            let mut reader = BitReader::new(&plane.bits);
            for _ in 0..plane.bit_length {
                payload.write_bit(reader.read_bit()?);
            }
        }
        payload.align_to_byte();
        let payload = payload.into_data();

        let mut out = Vec::with_capacity(payload.len() + 64);
        out.extend_from_slice(&BUNDLE_MAGIC);
        out.write_u8(BUNDLE_VERSION)?;
        out.write_u32::<BigEndian>(planes.len() as u32)?;
        out.write_u16::<BigEndian>(table.len() as u16)?;
        for plane in planes {
            out.write_u64::<BigEndian>(plane.bit_length)?;
            out.write_u32::<BigEndian>(plane.shape.0)?;
            out.write_u32::<BigEndian>(plane.shape.1)?;
        }
        for &(symbol, frequency) in &table {
            out.write_u8(symbol)?;
            out.write_u64::<BigEndian>(frequency)?;
        }
        out.write_u64::<BigEndian>(payload.len() as u64)?;
        out.extend_from_slice(&payload);

        debug!(
            planes = planes.len(),
            symbols = table.len(),
            payload_bytes = payload.len(),
            "packed bundle"
        );
        Ok(out)
    }

    /// Parse a bundle from bytes, validating the header end to end.
    pub fn unpack(bytes: &[u8]) -> Result<Bundle> {
        let mut cursor = Cursor::new(bytes);
        let truncated = |field: &'static str| {
            move |_: std::io::Error| {
                Error::invalid_bundle(format!("bundle ends inside {field}"))
            }
        };

        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(truncated("magic"))?;
        if magic != BUNDLE_MAGIC {
            return Err(Error::invalid_bundle(format!(
                "bad magic {magic:02x?}, expected {BUNDLE_MAGIC:02x?}"
            )));
        }

        let version = cursor.read_u8().map_err(truncated("version"))?;
        if version != BUNDLE_VERSION {
            return Err(Error::invalid_bundle(format!(
                "unsupported bundle version {version}"
            )));
        }

        let plane_count = cursor
            .read_u32::<BigEndian>()
            .map_err(truncated("plane count"))?;
        let symbol_count = cursor
            .read_u16::<BigEndian>()
            .map_err(truncated("symbol count"))?;

        let mut planes = Vec::new();
        for _ in 0..plane_count {
            let bit_length = cursor
                .read_u64::<BigEndian>()
                .map_err(truncated("plane entry"))?;
            let height = cursor
                .read_u32::<BigEndian>()
                .map_err(truncated("plane entry"))?;
            let width = cursor
                .read_u32::<BigEndian>()
                .map_err(truncated("plane entry"))?;
            planes.push(PlaneMeta {
                bit_length,
                height,
                width,
            });
        }

        let mut frequencies = Vec::new();
        for _ in 0..symbol_count {
            let symbol = cursor.read_u8().map_err(truncated("frequency table"))?;
            let frequency = cursor
                .read_u64::<BigEndian>()
                .map_err(truncated("frequency table"))?;
            if let Some(&(prev, _)) = frequencies.last() {
                if symbol <= prev {
                    return Err(Error::invalid_bundle(format!(
                        "frequency table not ascending: symbol {symbol} after {prev}"
                    )));
                }
            }
            frequencies.push((symbol, frequency));
        }

        let payload_len = cursor
            .read_u64::<BigEndian>()
            .map_err(truncated("payload length"))?;
        let offset = cursor.position() as usize;
        let remaining = bytes.len() - offset;
        if remaining as u64 != payload_len {
            return Err(Error::invalid_bundle(format!(
                "payload length {payload_len} disagrees with {remaining} trailing bytes"
            )));
        }

        let total_bits: u64 = planes.iter().map(|p| p.bit_length).sum();
        if total_bits > payload_len.saturating_mul(8) {
            return Err(Error::invalid_bundle(format!(
                "plane entries claim {total_bits} bits but payload holds {payload_len} bytes"
            )));
        }

        debug!(
            planes = planes.len(),
            symbols = frequencies.len(),
            payload_bytes = payload_len,
            "unpacked bundle"
        );
        Ok(Bundle {
            planes,
            frequencies,
            payload: bytes[offset..].to_vec(),
        })
    }

    /// Rebuild the Huffman tree from the stored frequency table.
    pub fn rebuild_tree(&self) -> Result<HuffmanTree<u8>> {
        let entries: Vec<(u64, u8)> = self
            .frequencies
            .iter()
            .map(|&(symbol, frequency)| (frequency, symbol))
            .collect();
        HuffmanTree::from_frequencies(&entries)
    }

    /// Decode every plane from the payload.
    ///
    /// Each plane is decoded symbol-by-symbol until its shape is filled,
    /// then checked against its recorded bit length.
    pub fn decode_planes(&self) -> Result<Vec<Plane<u8>>> {
        let tree = self.rebuild_tree()?;
        let mut reader = BitReader::new(&self.payload);

        let mut planes = Vec::with_capacity(self.planes.len());
        for (index, meta) in self.planes.iter().enumerate() {
            let start = reader.position();
            let count = meta.height as usize * meta.width as usize;
            let mut data = Vec::with_capacity(count);
            for _ in 0..count {
                data.push(tree.decode(&mut reader)?);
            }
            let consumed = (reader.position() - start) as u64;
            if consumed != meta.bit_length {
                return Err(Error::invalid_bundle(format!(
                    "plane {index} consumed {consumed} bits but the header records {}",
                    meta.bit_length
                )));
            }
            planes.push(Plane::new(meta.width, meta.height, data)?);
        }
        Ok(planes)
    }

    /// Per-plane metadata in encode order.
    pub fn plane_meta(&self) -> &[PlaneMeta] {
        &self.planes
    }

    /// The stored frequency table, ascending by symbol.
    pub fn frequencies(&self) -> &[(u8, u64)] {
        &self.frequencies
    }

    /// The raw bit payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
