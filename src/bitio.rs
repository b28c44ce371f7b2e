// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bit-level adapters over byte streams.
//!
//! Bits are packed least significant bit first within each byte. The writer
//! pads the last byte with 0 bits; the reader cannot tell padding from data,
//! so callers must know how much to read.

use std::io;
use std::io::prelude::*;

use bv::BitVec;
use bv::Bits;

/// Buffers bits and writes them to `inner` a byte at a time.
pub struct BitWriter<W: Write> {
    inner: W,
    accumulator: BitVec<u8>,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> BitWriter<W> {
        BitWriter {
            inner,
            accumulator: BitVec::new(),
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.accumulator.push(bit);
        self.bits_written += 1;

        if self.accumulator.len() == 8 {
            let block = self.accumulator.get_block(0);
            self.accumulator.clear();
            self.inner.write_all(std::slice::from_ref(&block))?;
        }
        Ok(())
    }

    /// Write every bit of `bits`, in order.
    pub fn write_bits<B: Bits>(&mut self, bits: B) -> io::Result<()> {
        for i in 0..bits.bit_len() {
            self.write_bit(bits.get_bit(i))?;
        }
        Ok(())
    }

    /// Bits written so far, not counting padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the final partial byte with 0 bits, write it, flush, and hand
    /// back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.accumulator.len() > 0 {
            while self.accumulator.len() < 8 {
                self.accumulator.push(false);
            }
            let block = self.accumulator.get_block(0);
            self.inner.write_all(std::slice::from_ref(&block))?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Yields the bits of a byte stream, including any trailing padding.
pub struct BitReader<R: Read> {
    inner: io::Bytes<R>,
    cur: u8,
    bit_index: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> BitReader<R> {
        BitReader {
            inner: inner.bytes(),
            cur: 0,
            bit_index: 8,
        }
    }
}

impl<R: Read> Iterator for BitReader<R> {
    type Item = io::Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bit_index == 8 {
            self.cur = match self.inner.next()? {
                Ok(byte) => byte,
                Err(e) => return Some(Err(e)),
            };
            self.bit_index = 0;
        }

        self.bit_index += 1;
        Some(Ok(self.cur.get_bit(self.bit_index as u64 - 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(bits: &[bool]) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        for &bit in bits {
            writer.write_bit(bit).unwrap();
        }
        assert_eq!(writer.bits_written(), bits.len() as u64);
        writer.finish().unwrap()
    }

    fn read(bytes: &[u8]) -> Vec<bool> {
        BitReader::new(bytes).collect::<io::Result<_>>().unwrap()
    }

    #[test]
    fn packs_lsb_first() {
        assert_eq!(write(&[true, false, false, false, false, false, false, false]), vec![0x01]);
        assert_eq!(write(&[false, false, false, false, false, false, false, true]), vec![0x80]);
    }

    #[test]
    fn pads_partial_byte_with_zeros() {
        assert_eq!(write(&[true, true, true]), vec![0b0000_0111]);
    }

    #[test]
    fn nothing_written_means_no_bytes() {
        assert!(write(&[]).is_empty());
    }

    #[test]
    fn spans_multiple_bytes() {
        let bits: Vec<bool> = (0..20).map(|i| i % 3 == 0).collect();
        let bytes = write(&bits);
        assert_eq!(bytes.len(), 3);
        let back = read(&bytes);
        assert_eq!(&back[..20], &bits[..]);
        assert!(back[20..].iter().all(|&b| !b));
    }

    #[test]
    fn reader_yields_eight_bits_per_byte() {
        assert_eq!(read(&[0xff, 0x00]).len(), 16);
        assert!(read(&[]).is_empty());
    }

    #[test]
    fn write_bits_copies_a_bitvec() {
        let mut bits = BitVec::<u8>::new();
        bits.push(false);
        bits.push(true);
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(&bits).unwrap();
        writer.write_bits(&bits).unwrap();
        assert_eq!(writer.finish().unwrap(), vec![0b1010]);
    }
}
