use crate::{
    Result,
    utils::{AsLasStr, FromLasStr},
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The size of one extra bytes descriptor.
pub const EXTRA_BYTES_DESCRIPTOR_SIZE: usize = 192;

/// The storage type of an extra attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DataType {
    /// Opaque bytes, as many as the descriptor's options field says.
    Undocumented(u8),
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// A deprecated two- or three-element array of one of the scalar types.
    Array {
        scalar: u8,
        len: u8,
    },
    /// A type id the las specification reserves.
    Reserved(u8),
}

impl DataType {
    fn new(id: u8, options: u8) -> DataType {
        match id {
            0 => DataType::Undocumented(options),
            1 => DataType::U8,
            2 => DataType::I8,
            3 => DataType::U16,
            4 => DataType::I16,
            5 => DataType::U32,
            6 => DataType::I32,
            7 => DataType::U64,
            8 => DataType::I64,
            9 => DataType::F32,
            10 => DataType::F64,
            11..=20 => DataType::Array {
                scalar: id - 10,
                len: 2,
            },
            21..=30 => DataType::Array {
                scalar: id - 20,
                len: 3,
            },
            _ => DataType::Reserved(id),
        }
    }

    fn id(&self) -> u8 {
        match *self {
            DataType::Undocumented(_) => 0,
            DataType::U8 => 1,
            DataType::I8 => 2,
            DataType::U16 => 3,
            DataType::I16 => 4,
            DataType::U32 => 5,
            DataType::I32 => 6,
            DataType::U64 => 7,
            DataType::I64 => 8,
            DataType::F32 => 9,
            DataType::F64 => 10,
            DataType::Array { scalar, len } => scalar + 10 * (len - 1),
            DataType::Reserved(id) => id,
        }
    }

    /// Returns the number of bytes this type takes in each point record.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::vlr::DataType;
    /// assert_eq!(8, DataType::F64.size());
    /// assert_eq!(6, DataType::Array { scalar: 3, len: 3 }.size());
    /// ```
    pub fn size(&self) -> u16 {
        match *self {
            DataType::Undocumented(n) => u16::from(n),
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
            DataType::Array { scalar, len } => {
                DataType::new(scalar, 0).size() * u16::from(len)
            }
            DataType::Reserved(_) => 0,
        }
    }
}

/// Describes one extra attribute stored after the standard point record, `LASF_Spec` record 4.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct ExtraBytes {
    pub data_type: DataType,
    /// Bit field saying which of no data, min, max, scale and offset are meaningful.
    pub options: u8,
    pub name: String,
    pub no_data: [f64; 3],
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub scale: [f64; 3],
    pub offset: [f64; 3],
    pub description: String,
}

impl ExtraBytes {
    /// Decodes every descriptor in a record. Trailing bytes that don't fill a descriptor are
    /// ignored.
    pub fn read_all(data: &[u8]) -> Result<Vec<ExtraBytes>> {
        data.chunks_exact(EXTRA_BYTES_DESCRIPTOR_SIZE)
            .map(ExtraBytes::read_from)
            .collect()
    }

    /// Reads one descriptor.
    pub fn read_from<R: Read>(mut read: R) -> Result<ExtraBytes> {
        let mut reserved = [0; 2];
        read.read_exact(&mut reserved)?;
        let data_type = read.read_u8()?;
        let options = read.read_u8()?;
        let mut name = [0; 32];
        read.read_exact(&mut name)?;
        let mut unused = [0; 4];
        read.read_exact(&mut unused)?;
        let mut triples = [[0.; 3]; 5];
        for triple in &mut triples {
            for n in triple.iter_mut() {
                *n = read.read_f64::<LittleEndian>()?;
            }
        }
        let mut description = [0; 32];
        read.read_exact(&mut description)?;
        let [no_data, min, max, scale, offset] = triples;
        Ok(ExtraBytes {
            data_type: DataType::new(data_type, options),
            options,
            name: name.as_ref().as_las_string_lossy(),
            no_data,
            min,
            max,
            scale,
            offset,
            description: description.as_ref().as_las_string_lossy(),
        })
    }

    /// Writes one descriptor.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&[0; 2])?;
        write.write_u8(self.data_type.id())?;
        write.write_u8(self.options)?;
        let mut name = [0; 32];
        name.as_mut().from_las_str(&self.name)?;
        write.write_all(&name)?;
        write.write_all(&[0; 4])?;
        for triple in [self.no_data, self.min, self.max, self.scale, self.offset] {
            for n in triple {
                write.write_f64::<LittleEndian>(n)?;
            }
        }
        let mut description = [0; 32];
        description.as_mut().from_las_str(&self.description)?;
        write.write_all(&description)?;
        Ok(())
    }

    /// Returns the number of bytes this attribute takes in each point record.
    pub fn size(&self) -> u16 {
        self.data_type.size()
    }
}
