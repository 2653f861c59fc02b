//! Fixed-size record codecs for the layer, parameter and linked-file tables,
//! plus the offset resolution shared by every table.

use std::ops::Range;

use bytestream::{ByteReader, ByteWriter};
use layout::{
    read_expected_i32, read_expected_u32, FormatError, FormatResult, Table, Variant, WidthCodec,
};
use widestring::{U16CStr, U16CString};

use crate::model::{Layer, Parameter};

const LAYER_TAG: i32 = 2;
const LAYER_TRAILER: [i64; 3] = [0, -1, 1];

impl Layer {
    pub(crate) fn decode(reader: &mut ByteReader<'_>, words: WidthCodec) -> FormatResult<Self> {
        read_expected_i32(reader, "layer tag", LAYER_TAG)?;
        let layer_number = reader.read_u32()?;
        for expected in LAYER_TRAILER {
            words.read_expected(reader, "layer trailer", expected)?;
        }
        Ok(Self { layer_number })
    }

    pub(crate) fn encode(self, writer: &mut ByteWriter, words: WidthCodec) -> FormatResult<()> {
        writer.write_i32(LAYER_TAG);
        writer.write_u32(self.layer_number);
        for value in LAYER_TRAILER {
            words.write_signed(writer, value)?;
        }
        Ok(())
    }
}

impl Parameter {
    pub(crate) fn decode(reader: &mut ByteReader<'_>, variant: Variant) -> FormatResult<Self> {
        let words = WidthCodec::for_variant(variant);
        let parameter = Self {
            instruction_number: words.read_natural(reader)?,
            destination_start_byte: words.read_natural(reader)?,
            source_start_byte: words.read_natural(reader)?,
            length: words.read_natural(reader)?,
        };
        if variant.has_parameter_padding() {
            read_expected_u32(reader, "parameter padding", 0)?;
        }
        Ok(parameter)
    }

    pub(crate) fn encode(&self, writer: &mut ByteWriter, variant: Variant) -> FormatResult<()> {
        let words = WidthCodec::for_variant(variant);
        words.write_natural(writer, self.instruction_number)?;
        words.write_natural(writer, self.destination_start_byte)?;
        words.write_natural(writer, self.source_start_byte)?;
        words.write_natural(writer, self.length)?;
        if variant.has_parameter_padding() {
            writer.write_u32(0);
        }
        Ok(())
    }
}

/// Resolves `count` records starting at byte `offset` of a table into an
/// index range.
///
/// An empty range is always valid regardless of its offset. Otherwise the
/// offset must sit on a record boundary and the whole range must lie within
/// the `len` records of the table.
pub(crate) fn record_range(
    table: Table,
    offset: u64,
    count: u64,
    record_size: usize,
    len: usize,
) -> FormatResult<Range<usize>> {
    if count == 0 {
        return Ok(0..0);
    }
    let dangling = FormatError::DanglingReference { table, offset };
    let record_size = record_size as u64;
    if offset % record_size != 0 {
        return Err(dangling);
    }
    let start = offset / record_size;
    let end = start.checked_add(count).ok_or_else(|| dangling.clone())?;
    if end > len as u64 {
        return Err(dangling);
    }
    Ok(start as usize..end as usize)
}

/// Reads `count` fixed-size records starting at absolute `offset`.
///
/// The reader position is restored afterwards, on success or failure.
pub(crate) fn read_records<'a, T>(
    reader: &mut ByteReader<'a>,
    table: Table,
    offset: u64,
    count: u64,
    record_size: usize,
    mut decode: impl FnMut(&mut ByteReader<'a>) -> FormatResult<T>,
) -> FormatResult<Vec<T>> {
    let mut scoped = reader
        .at(offset)
        .map_err(|_| FormatError::DanglingReference { table, offset })?;
    let capacity = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(scoped.remaining() / record_size);
    let mut records = Vec::with_capacity(capacity);
    for _ in 0..count {
        records.push(decode(&mut *scoped)?);
    }
    Ok(records)
}

/// Decodes the NUL-terminated UTF-16LE name at `offset` in the string pool.
pub(crate) fn read_name(pool: &[u8], offset: u64) -> FormatResult<String> {
    let start = usize::try_from(offset)
        .ok()
        .filter(|&start| start < pool.len())
        .ok_or(FormatError::DanglingReference {
            table: Table::Strings,
            offset,
        })?;
    let units: Vec<u16> = pool[start..]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let name = U16CStr::from_slice_truncate(&units)
        .map_err(|_| FormatError::InvalidString { offset })?;
    name.to_string()
        .map_err(|_| FormatError::InvalidString { offset })
}

/// Appends `name` to the string pool as NUL-terminated UTF-16LE and returns
/// its pool offset.
pub(crate) fn write_name(pool: &mut ByteWriter, name: &str) -> FormatResult<u64> {
    let offset = pool.position() as u64;
    let wide = U16CString::from_str(name).map_err(|_| FormatError::InvalidString { offset })?;
    for unit in wide.as_slice_with_nul() {
        pool.write_u16(*unit);
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_bytes(variant: Variant, trailer: [i64; 3]) -> Vec<u8> {
        let words = WidthCodec::for_variant(variant);
        let mut writer = ByteWriter::new();
        writer.write_i32(2);
        writer.write_u32(7);
        for value in trailer {
            words.write_signed(&mut writer, value).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn layer_record_sizes() {
        for variant in Variant::ALL {
            let mut writer = ByteWriter::new();
            Layer::new(1)
                .encode(&mut writer, WidthCodec::for_variant(variant))
                .unwrap();
            assert_eq!(writer.position(), variant.layer_size());
        }
    }

    #[test]
    fn layer_decodes_valid_record() {
        for variant in Variant::ALL {
            let bytes = layer_bytes(variant, [0, -1, 1]);
            let mut reader = ByteReader::new(&bytes);
            let layer = Layer::decode(&mut reader, WidthCodec::for_variant(variant)).unwrap();
            assert_eq!(layer, Layer::new(7));
        }
    }

    #[test]
    fn layer_rejects_bad_trailer() {
        let bytes = layer_bytes(Variant::Gamma, [0, -1, 2]);
        let mut reader = ByteReader::new(&bytes);
        let err = Layer::decode(&mut reader, WidthCodec::for_variant(Variant::Gamma)).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnexpectedValue {
                field: "layer trailer",
                found: 2
            }
        );
    }

    #[test]
    fn layer_rejects_bad_tag() {
        let mut bytes = layer_bytes(Variant::Alpha, [0, -1, 1]);
        bytes[0] = 3;
        let mut reader = ByteReader::new(&bytes);
        let err = Layer::decode(&mut reader, WidthCodec::for_variant(Variant::Alpha)).unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnexpectedValue {
                field: "layer tag",
                found: 3
            }
        ));
    }

    #[test]
    fn parameter_roundtrip_and_size() {
        let parameter = Parameter::new(1, 4, 8, 4);
        for variant in Variant::ALL {
            let mut writer = ByteWriter::new();
            parameter.encode(&mut writer, variant).unwrap();
            let bytes = writer.finish().unwrap();
            assert_eq!(bytes.len(), variant.parameter_size());
            let mut reader = ByteReader::new(&bytes);
            assert_eq!(Parameter::decode(&mut reader, variant).unwrap(), parameter);
        }
    }

    #[test]
    fn narrow_parameter_rejects_nonzero_padding() {
        let mut writer = ByteWriter::new();
        Parameter::new(0, 0, 0, 4).encode(&mut writer, Variant::Alpha).unwrap();
        let mut bytes = writer.finish().unwrap();
        bytes[16] = 1;
        let mut reader = ByteReader::new(&bytes);
        assert!(Parameter::decode(&mut reader, Variant::Alpha).is_err());
    }

    #[test]
    fn narrow_parameter_rejects_wide_values() {
        let mut writer = ByteWriter::new();
        let err = Parameter::new(u64::from(u32::MAX) + 1, 0, 0, 0)
            .encode(&mut writer, Variant::Alpha)
            .unwrap_err();
        assert!(matches!(err, FormatError::ValueOutOfRange { bits: 32, .. }));
    }

    #[test]
    fn record_range_resolution() {
        assert_eq!(record_range(Table::Instructions, 64, 2, 32, 4).unwrap(), 2..4);
        assert_eq!(record_range(Table::Instructions, 999, 0, 32, 0).unwrap(), 0..0);
        assert!(record_range(Table::Instructions, 96, 2, 32, 4).is_err());
        assert!(record_range(Table::Instructions, 33, 1, 32, 4).is_err());
        assert!(record_range(Table::Parameters, u64::MAX - 19, u64::MAX, 20, 4).is_err());
    }

    #[test]
    fn read_records_restores_position() {
        let bytes = [1u8, 0, 2, 0, 3, 0];
        let mut reader = ByteReader::new(&bytes);
        reader.seek(1).unwrap();
        let values = read_records(&mut reader, Table::Layers, 2, 2, 2, |r| {
            Ok(r.read_u16()?)
        })
        .unwrap();
        assert_eq!(values, vec![2, 3]);
        assert_eq!(reader.position(), 1);

        let err = read_records(&mut reader, Table::Layers, 2, 3, 2, |r| Ok(r.read_u16()?))
            .unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));
        assert_eq!(reader.position(), 1);

        let err = read_records(&mut reader, Table::Layers, 7, 1, 2, |r| Ok(r.read_u16()?))
            .unwrap_err();
        assert_eq!(
            err,
            FormatError::DanglingReference {
                table: Table::Layers,
                offset: 7
            }
        );
    }

    #[test]
    fn names_roundtrip_through_pool() {
        let mut pool = ByteWriter::new();
        let first = write_name(&mut pool, "m10_00_00_00").unwrap();
        let second = write_name(&mut pool, "common_func").unwrap();
        let bytes = pool.finish().unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 26);
        assert_eq!(read_name(&bytes, first).unwrap(), "m10_00_00_00");
        assert_eq!(read_name(&bytes, second).unwrap(), "common_func");
    }

    #[test]
    fn name_outside_pool_is_dangling() {
        let err = read_name(&[b'a', 0, 0, 0], 4).unwrap_err();
        assert_eq!(
            err,
            FormatError::DanglingReference {
                table: Table::Strings,
                offset: 4
            }
        );
    }

    #[test]
    fn unterminated_name_is_invalid() {
        let err = read_name(&[b'a', 0, b'b', 0], 0).unwrap_err();
        assert_eq!(err, FormatError::InvalidString { offset: 0 });
    }

    #[test]
    fn name_with_interior_nul_is_rejected() {
        let mut pool = ByteWriter::new();
        assert!(write_name(&mut pool, "a\0b").is_err());
    }
}
