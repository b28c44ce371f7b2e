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

use std::io::prelude::*;

use crate::bitio::BitReader;
use crate::bitio::BitWriter;
use crate::code::SymbolCodes;
use crate::error::Error;
use crate::error::Result;
use crate::error::Stage;
use crate::tree::HuffNode;
use crate::tree::HuffTree;

/// Encode the input with a precomputed Huffman code. Returns the number of
/// symbols encoded. The bit sink is left open; call `finish` on it.
pub fn encode<R: Read, W: Write>(
    input: R,
    output: &mut BitWriter<W>,
    symbol_codes: &SymbolCodes,
) -> Result<u64> {
    let mut symbols = 0;
    for byte in input.bytes() {
        let byte = byte.map_err(Error::io(Stage::Encode))?;
        let code = symbol_codes
            .get(byte)
            .ok_or(Error::MissingCode { symbol: byte })?;
        output.write_bits(*code).map_err(Error::io(Stage::Encode))?;
        symbols += 1;
    }
    Ok(symbols)
}

/// Decode exactly `expected` symbols from `input` into `output`.
///
/// Bits left over once `expected` symbols are out are padding and are never
/// read.
pub fn decode<R: Read, W: Write>(
    input: R,
    output: &mut W,
    tree: &HuffTree,
    expected: u64,
) -> Result<()> {
    let mut symbols = Symbols::new(input, tree);
    let mut decoded = 0;
    while decoded < expected {
        let symbol = match symbols.next() {
            Some(symbol) => symbol?,
            None => return Err(Error::Truncated { decoded, expected }),
        };
        output
            .write_all(std::slice::from_ref(&symbol))
            .map_err(Error::io(Stage::Decode))?;
        decoded += 1;
    }
    output.flush().map_err(Error::io(Stage::Flush))
}

/// Decodes symbols for as long as the bit source lasts.
///
/// Nothing bounds the output, so padding bits at the end of a stream may
/// decode to extra symbols; a code cut off by the end of the stream is
/// dropped. The tree built from empty input decodes nothing.
pub struct Symbols<'t, R: Read> {
    bits: BitReader<R>,
    tree: &'t HuffTree,
    position: u64,
}

impl<'t, R: Read> Symbols<'t, R> {
    pub fn new(input: R, tree: &'t HuffTree) -> Symbols<'t, R> {
        Symbols {
            bits: BitReader::new(input),
            tree,
            position: 0,
        }
    }

    /// Bits consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<'t, R: Read> Iterator for Symbols<'t, R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tree.is_empty() {
            return None;
        }

        let mut cursor = self.tree.root();
        loop {
            let bit = match self.bits.next()? {
                Ok(bit) => bit,
                Err(e) => return Some(Err(Error::Io {
                    stage: Stage::Decode,
                    source: e,
                })),
            };
            let position = self.position;
            self.position += 1;

            cursor = match cursor.child(bit) {
                Some(child) => child,
                None => return Some(Err(Error::InvalidCode { position })),
            };
            match cursor {
                HuffNode::Leaf(l) => return Some(Ok(l.symbol)),
                HuffNode::Placeholder => return Some(Err(Error::InvalidCode { position })),
                HuffNode::Parent(_) => {}
            }
        }
    }
}
