use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The size of a wave packet descriptor payload.
pub const WAVE_PACKET_DESCRIPTOR_SIZE: usize = 26;

/// Describes how to interpret a waveform packet, `LASF_Spec` records 100 through 354.
///
/// Record `99 + n` holds the descriptor a point refers to with wave packet descriptor index `n`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct WavePacketDescriptor {
    pub bits_per_sample: u8,
    pub waveform_compression_type: u8,
    pub number_of_samples: u32,
    /// Picoseconds.
    pub temporal_sample_spacing: u32,
    pub digitizer_gain: f64,
    pub digitizer_offset: f64,
}

impl WavePacketDescriptor {
    /// Reads a descriptor.
    pub fn read_from<R: Read>(mut read: R) -> Result<WavePacketDescriptor> {
        Ok(WavePacketDescriptor {
            bits_per_sample: read.read_u8()?,
            waveform_compression_type: read.read_u8()?,
            number_of_samples: read.read_u32::<LittleEndian>()?,
            temporal_sample_spacing: read.read_u32::<LittleEndian>()?,
            digitizer_gain: read.read_f64::<LittleEndian>()?,
            digitizer_offset: read.read_f64::<LittleEndian>()?,
        })
    }

    /// Writes a descriptor.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u8(self.bits_per_sample)?;
        write.write_u8(self.waveform_compression_type)?;
        write.write_u32::<LittleEndian>(self.number_of_samples)?;
        write.write_u32::<LittleEndian>(self.temporal_sample_spacing)?;
        write.write_f64::<LittleEndian>(self.digitizer_gain)?;
        write.write_f64::<LittleEndian>(self.digitizer_offset)?;
        Ok(())
    }

    /// Returns a description of what's odd about this descriptor, if anything.
    pub fn anomaly(&self) -> Option<String> {
        if self.bits_per_sample != 8 && self.bits_per_sample != 16 {
            Some(format!(
                "bits per sample is {}, expected 8 or 16",
                self.bits_per_sample
            ))
        } else if self.waveform_compression_type != 0 {
            Some(format!(
                "waveform compression type is {}, expected 0",
                self.waveform_compression_type
            ))
        } else if self.number_of_samples == 0 {
            Some("number of samples is zero".to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let descriptor = WavePacketDescriptor {
            bits_per_sample: 8,
            number_of_samples: 40,
            temporal_sample_spacing: 1000,
            digitizer_gain: 0.5,
            ..Default::default()
        };
        let mut data = Vec::new();
        descriptor.write_to(&mut data).unwrap();
        assert_eq!(WAVE_PACKET_DESCRIPTOR_SIZE, data.len());
        let read = WavePacketDescriptor::read_from(&data[..]).unwrap();
        assert_eq!(descriptor, read);
        assert!(read.anomaly().is_none());
    }

    #[test]
    fn anomalies() {
        let descriptor = WavePacketDescriptor {
            bits_per_sample: 12,
            number_of_samples: 1,
            ..Default::default()
        };
        assert!(descriptor.anomaly().is_some());
    }
}
