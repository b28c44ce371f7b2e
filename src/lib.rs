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

//! Static Huffman compression of byte streams.
//!
//! The pipeline runs in order: count symbol frequencies over the whole
//! input, build the tree, derive the code table, then encode a second pass
//! over the input. A compressed file stores the frequencies so the decoder
//! can rebuild the same tree.

pub mod bitio;
pub mod code;
pub mod codec;
pub mod container;
pub mod count;
pub mod error;
pub mod tree;
mod util;

use std::io::prelude::*;
use std::io::Cursor;
use std::io::SeekFrom;

pub use code::SymbolCode;
pub use code::SymbolCodes;
pub use codec::decode;
pub use codec::encode;
pub use codec::Symbols;
pub use count::count_symbols;
pub use count::SymbolCounts;
pub use error::Error;
pub use error::HeaderError;
pub use error::Result;
pub use error::Stage;
pub use tree::HuffLeaf;
pub use tree::HuffNode;
pub use tree::HuffParent;
pub use tree::HuffTree;

use bitio::BitWriter;

/// What `compress` produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressStats {
    pub symbols: u64,
    pub distinct: usize,
    pub header_bytes: usize,
    pub payload_bits: u64,
}

impl CompressStats {
    pub fn payload_bytes(&self) -> u64 {
        (self.payload_bits + 7) / 8
    }

    pub fn compressed_bytes(&self) -> u64 {
        self.header_bytes as u64 + self.payload_bytes()
    }
}

/// Compress `input` into `output`, header first. `input` is read twice:
/// once to count, once to encode.
pub fn compress<R: Read + Seek, W: Write>(mut input: R, output: W) -> Result<CompressStats> {
    compress_with_codes(&mut input, output).map(|(stats, _)| stats)
}

/// Like `compress`, also returning the code table that was used.
pub fn compress_with_codes<R: Read + Seek, W: Write>(
    mut input: R,
    mut output: W,
) -> Result<(CompressStats, SymbolCodes)> {
    let counts = count_symbols(&mut input)?;
    input
        .seek(SeekFrom::Start(0))
        .map_err(Error::io(Stage::Rewind))?;

    let tree = HuffTree::build(&counts);
    let codes = tree.codes();

    container::write_header(&mut output, &counts)?;

    let mut bits = BitWriter::new(output);
    let encoded = encode(&mut input, &mut bits, &codes)?;
    if encoded != counts.total() {
        return Err(Error::InputChanged {
            counted: counts.total(),
            encoded,
        });
    }
    let payload_bits = bits.bits_written();
    debug_assert_eq!(payload_bits, codes.encoded_bit_len(&counts));
    bits.finish().map_err(Error::io(Stage::Flush))?;

    let stats = CompressStats {
        symbols: encoded,
        distinct: counts.distinct(),
        header_bytes: container::header_len(&counts),
        payload_bits,
    };
    log::debug!("{:?}", stats);
    Ok((stats, codes))
}

/// Decompress a stream written by `compress`. Returns the number of bytes
/// written to `output`.
pub fn decompress<R: Read, W: Write>(mut input: R, mut output: W) -> Result<u64> {
    let counts = container::read_header(&mut input)?;
    let tree = HuffTree::build(&counts);
    decode(input, &mut output, &tree, counts.total())?;
    Ok(counts.total())
}

pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(Cursor::new(data), &mut out)?;
    Ok(out)
}

pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out)?;
    Ok(out)
}
