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

//! Header of a compressed file.
//!
//! ```text
//! magic     "HUFZ"
//! distinct  u16 LE
//! entries   distinct x (symbol: u8, count: u64 LE), ascending symbol
//! ```
//!
//! The code stream follows directly. The decoder rebuilds the tree from the
//! stored counts and stops after as many symbols as they add up to.

use std::io;
use std::io::prelude::*;

use crate::count::SymbolCounts;
use crate::error::Error;
use crate::error::HeaderError;
use crate::error::Result;
use crate::error::Stage;

pub const MAGIC: [u8; 4] = *b"HUFZ";

/// Size in bytes of the header for `counts`.
pub fn header_len(counts: &SymbolCounts) -> usize {
    MAGIC.len() + 2 + counts.distinct() * 9
}

pub fn write_header<W: Write>(output: &mut W, counts: &SymbolCounts) -> Result<()> {
    write_header_impl(output, counts).map_err(Error::io(Stage::WriteHeader))
}

fn write_header_impl<W: Write>(output: &mut W, counts: &SymbolCounts) -> io::Result<()> {
    output.write_all(&MAGIC)?;
    output.write_all(&(counts.distinct() as u16).to_le_bytes())?;
    for (symbol, count) in counts.iter() {
        output.write_all(&[symbol])?;
        output.write_all(&count.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_header<R: Read>(input: &mut R) -> Result<SymbolCounts> {
    let mut magic = [0u8; 4];
    read_exact(input, &mut magic)?;
    if magic != MAGIC {
        return Err(HeaderError::BadMagic(magic).into());
    }

    let mut distinct_bytes = [0u8; 2];
    read_exact(input, &mut distinct_bytes)?;
    let distinct = u16::from_le_bytes(distinct_bytes);
    if distinct > 256 {
        return Err(HeaderError::TooManySymbols(distinct).into());
    }

    let mut counts = SymbolCounts::new();
    let mut previous: Option<u8> = None;
    let mut total: u64 = 0;
    for _ in 0..distinct {
        let mut entry = [0u8; 9];
        read_exact(input, &mut entry)?;
        let symbol = entry[0];
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&entry[1..]);
        let count = u64::from_le_bytes(count_bytes);

        if let Some(previous) = previous {
            if symbol <= previous {
                return Err(HeaderError::Unordered { previous, symbol }.into());
            }
        }
        if count == 0 {
            return Err(HeaderError::ZeroCount(symbol).into());
        }
        total = total.checked_add(count).ok_or(HeaderError::CountOverflow)?;

        counts.add(symbol, count);
        previous = Some(symbol);
    }

    log::debug!("header: {} symbols, {} distinct", total, distinct);
    Ok(counts)
}

fn read_exact<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    input.read_exact(buf).map_err(Error::io(Stage::ReadHeader))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(counts: &SymbolCounts) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_header(&mut bytes, counts).unwrap();
        bytes
    }

    #[test]
    fn layout_is_stable() {
        let bytes = header_bytes(&SymbolCounts::from_bytes(b"aab"));
        let mut expected = b"HUFZ".to_vec();
        expected.extend_from_slice(&[2, 0]);
        expected.extend_from_slice(&[b'a', 2, 0, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[b'b', 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes, expected);
        assert_eq!(header_len(&SymbolCounts::from_bytes(b"aab")), expected.len());
    }

    #[test]
    fn reads_back_what_was_written() {
        let counts = SymbolCounts::from_bytes(b"mississippi river");
        let bytes = header_bytes(&counts);
        assert_eq!(read_header(&mut &bytes[..]).unwrap(), counts);
    }

    #[test]
    fn empty_counts_have_empty_table() {
        let bytes = header_bytes(&SymbolCounts::new());
        assert_eq!(bytes, b"HUFZ\0\0");
        assert!(read_header(&mut &bytes[..]).unwrap().is_empty());
    }

    #[test]
    fn leaves_reader_at_payload() {
        let mut bytes = header_bytes(&SymbolCounts::from_bytes(b"q"));
        bytes.extend_from_slice(&[0xaa, 0xbb]);
        let mut reader = &bytes[..];
        read_header(&mut reader).unwrap();
        assert_eq!(reader, &[0xaa, 0xbb]);
    }

    fn header_error(bytes: &[u8]) -> HeaderError {
        match read_header(&mut &bytes[..]) {
            Err(Error::Header(e)) => e,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(header_error(b"HUFF\0\0"), HeaderError::BadMagic(*b"HUFF"));
    }

    #[test]
    fn rejects_too_many_symbols() {
        assert_eq!(header_error(b"HUFZ\x01\x01"), HeaderError::TooManySymbols(257));
    }

    #[test]
    fn rejects_unordered_symbols() {
        let mut bytes = b"HUFZ\x02\x00".to_vec();
        bytes.extend_from_slice(&[b'b', 1, 0, 0, 0, 0, 0, 0, 0]);
        bytes.extend_from_slice(&[b'a', 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            header_error(&bytes),
            HeaderError::Unordered {
                previous: b'b',
                symbol: b'a'
            }
        );
    }

    #[test]
    fn rejects_zero_count() {
        let mut bytes = b"HUFZ\x01\x00".to_vec();
        bytes.extend_from_slice(&[b'a', 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(header_error(&bytes), HeaderError::ZeroCount(b'a'));
    }

    #[test]
    fn rejects_overflowing_counts() {
        let mut bytes = b"HUFZ\x02\x00".to_vec();
        bytes.push(b'a');
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.push(b'b');
        bytes.extend_from_slice(&1u64.to_le_bytes());
        assert_eq!(header_error(&bytes), HeaderError::CountOverflow);
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        match read_header(&mut &b"HUFZ\x01\x00a"[..]) {
            Err(Error::Io { stage, source }) => {
                assert_eq!(stage, Stage::ReadHeader);
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
