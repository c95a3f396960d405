//! WAV decoding and encoding for PCM audio.
//!
//! Reads 8- or 16-bit PCM, mono or stereo, into planar f32. Writes 16-bit PCM.

use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("file too short to be a WAV")]
    UnexpectedEof,
    #[error("missing RIFF/WAVE header")]
    InvalidHeader,
    #[error("missing {0} chunk")]
    MissingChunk(&'static str),
    #[error("unsupported WAV encoding (format {format}, {bits} bits)")]
    UnsupportedFormat { format: u16, bits: u16 },
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u16),
}

/// Planar f32 audio with its sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct WavData {
    pub sample_rate: u32,
    /// One `Vec` per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
}

impl WavData {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self { sample_rate, channels }
    }

    pub fn num_channels(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

// --- Reading ---

struct WavHeader {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

/// Decode a WAV file from raw bytes.
pub fn load_wav(data: &[u8]) -> Result<WavData, WavError> {
    let header = parse_header(data)?;
    let end = (header.data_offset + header.data_size).min(data.len());
    let raw = &data[header.data_offset..end];

    let channels = header.num_channels as usize;
    let bytes = (header.bits_per_sample / 8) as usize;
    let frames = raw.len() / (channels * bytes);
    let mut planes: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();

    for frame in raw.chunks_exact(channels * bytes) {
        for (ch, s) in frame.chunks_exact(bytes).enumerate() {
            let value = match bytes {
                1 => (s[0] as i16 - 128) as f32 / 128.0,
                _ => i16::from_le_bytes([s[0], s[1]]) as f32 / 32768.0,
            };
            planes[ch].push(value);
        }
    }

    Ok(WavData::new(header.sample_rate, planes))
}

fn parse_header(data: &[u8]) -> Result<WavHeader, WavError> {
    if data.len() < 12 {
        return Err(WavError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(WavError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || pos + 24 > data.len() {
                return Err(WavError::UnexpectedEof);
            }
            let format = read_u16_le(data, pos + 8);
            let channels = read_u16_le(data, pos + 10);
            let rate = read_u32_le(data, pos + 12);
            let bits = read_u16_le(data, pos + 22);
            if format != 1 || (bits != 8 && bits != 16) {
                return Err(WavError::UnsupportedFormat { format, bits });
            }
            fmt = Some((channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((pos + 8, chunk_size));
        }

        pos = pos.saturating_add(8 + chunk_size);
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (num_channels, sample_rate, bits_per_sample) = fmt.ok_or(WavError::MissingChunk("fmt"))?;
    let (data_offset, data_size) = data_chunk.ok_or(WavError::MissingChunk("data"))?;

    if !(1..=2).contains(&num_channels) {
        return Err(WavError::UnsupportedChannels(num_channels));
    }

    Ok(WavHeader { num_channels, sample_rate, bits_per_sample, data_offset, data_size })
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

// --- Writing ---

/// Encode as 16-bit PCM. Samples outside [-1, 1] are clipped.
///
/// Channels of unequal length are cut to the shortest. Payloads that do not
/// fit a RIFF header fail with `InvalidInput`.
pub fn write_wav(w: &mut impl Write, wav: &WavData) -> io::Result<()> {
    let num_channels = wav.num_channels();
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let frames = wav.channels.iter().map(Vec::len).min().unwrap_or(0);
    let data_size = data_chunk_size(frames, block_align)?;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, wav.sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, wav, frames, data_size)
}

/// Byte length of the data chunk, checked so that the RIFF size field
/// (`36 + data_size`) also fits in 32 bits.
fn data_chunk_size(frames: usize, block_align: u16) -> io::Result<u32> {
    frames
        .checked_mul(block_align as usize)
        .and_then(|bytes| u32::try_from(bytes).ok())
        .filter(|bytes| bytes.checked_add(36).is_some())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "audio too long for a WAV file"))
}

pub fn wav_to_bytes(wav: &WavData) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_wav(&mut buf, wav)?;
    Ok(buf)
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(
    w: &mut impl Write,
    wav: &WavData,
    frames: usize,
    data_size: u32,
) -> io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for i in 0..frames {
        for ch in &wav.channels {
            w.write_all(&to_i16(ch[i]).to_le_bytes())?;
        }
    }
    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal valid WAV file from raw parameters.
    fn make_wav(channels: u16, sample_rate: u32, bits: u16, pcm_data: &[u8]) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = sample_rate * block_align as u32;
        let data_size = pcm_data.len() as u32;

        let mut buf = Vec::new();
        buf.extend(b"RIFF");
        buf.extend(&(36 + data_size).to_le_bytes());
        buf.extend(b"WAVE");
        buf.extend(b"fmt ");
        buf.extend(&16u32.to_le_bytes());
        buf.extend(&1u16.to_le_bytes());
        buf.extend(&channels.to_le_bytes());
        buf.extend(&sample_rate.to_le_bytes());
        buf.extend(&byte_rate.to_le_bytes());
        buf.extend(&block_align.to_le_bytes());
        buf.extend(&bits.to_le_bytes());
        buf.extend(b"data");
        buf.extend(&data_size.to_le_bytes());
        buf.extend(pcm_data);
        buf
    }

    fn pcm16(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn load_16bit_stereo_deinterleaves() {
        let wav = make_wav(2, 44100, 16, &pcm16(&[16384, -16384, 0, 32767]));
        let data = load_wav(&wav).unwrap();
        assert_eq!(data.sample_rate, 44100);
        assert_eq!(data.channels, vec![vec![0.5, 0.0], vec![-0.5, 32767.0 / 32768.0]]);
    }

    #[test]
    fn load_8bit_mono_recenters() {
        let data = load_wav(&make_wav(1, 22050, 8, &[128, 192, 64])).unwrap();
        assert_eq!(data.channels, vec![vec![0.0, 0.5, -0.5]]);
    }

    #[test]
    fn skips_unknown_chunks() {
        let mut wav = make_wav(1, 48000, 16, &pcm16(&[100]));
        // insert a LIST chunk between fmt and data
        let list = [b"LIST".as_slice(), &4u32.to_le_bytes(), b"abcd"].concat();
        wav.splice(36..36, list);
        let data = load_wav(&wav).unwrap();
        assert_eq!(data.frames(), 1);
    }

    #[test]
    fn rejects_float_and_24bit() {
        let mut float = make_wav(1, 48000, 32, &[0; 8]);
        float[20] = 3;
        assert_eq!(
            load_wav(&float).unwrap_err(),
            WavError::UnsupportedFormat { format: 3, bits: 32 }
        );
        assert!(matches!(
            load_wav(&make_wav(1, 48000, 24, &[0; 6])),
            Err(WavError::UnsupportedFormat { bits: 24, .. })
        ));
    }

    #[test]
    fn rejects_surround() {
        let wav = make_wav(6, 48000, 16, &[0; 12]);
        assert_eq!(load_wav(&wav).unwrap_err(), WavError::UnsupportedChannels(6));
    }

    #[test]
    fn invalid_header_rejected() {
        assert_eq!(load_wav(b"not a wav file").unwrap_err(), WavError::InvalidHeader);
        assert_eq!(load_wav(&[0; 10]).unwrap_err(), WavError::UnexpectedEof);
    }

    #[test]
    fn missing_data_chunk_is_reported() {
        let mut wav = make_wav(1, 48000, 16, &[]);
        wav.truncate(36);
        assert_eq!(load_wav(&wav).unwrap_err(), WavError::MissingChunk("data"));
    }

    #[test]
    fn written_header_describes_payload() {
        let wav = WavData::new(48000, vec![vec![0.0; 10], vec![0.0; 10]]);
        let bytes = wav_to_bytes(&wav).unwrap();
        assert_eq!(bytes.len(), 44 + 10 * 4);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(read_u16_le(&bytes, 22), 2);
        assert_eq!(read_u32_le(&bytes, 24), 48000);
        assert_eq!(read_u32_le(&bytes, 40), 40);
    }

    #[test]
    fn unequal_channels_are_cut_to_shortest() {
        let wav = WavData::new(8000, vec![vec![0.5; 5], vec![-0.5; 3]]);
        let bytes = wav_to_bytes(&wav).unwrap();
        assert_eq!(bytes.len(), 44 + 3 * 4);
        assert_eq!(read_u32_le(&bytes, 40), 12);
        assert_eq!(load_wav(&bytes).unwrap().frames(), 3);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        // 4 bytes per stereo frame: the RIFF size field would overflow.
        let frames = (u32::MAX as usize - 35) / 4 + 1;
        let err = data_chunk_size(frames, 4).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(data_chunk_size(usize::MAX, 4).is_err());
        assert!(data_chunk_size(frames - 1, 4).is_ok());
        assert_eq!(data_chunk_size(1000, 4).unwrap(), 4000);
    }

    #[test]
    fn writing_clips_out_of_range_samples() {
        let wav = WavData::new(8000, vec![vec![2.0, -2.0, 0.5]]);
        let bytes = wav_to_bytes(&wav).unwrap();
        let s: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(s, vec![32767, -32767, 16384]);
    }
}
