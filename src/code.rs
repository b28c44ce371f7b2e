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

use std::fmt;

use bv::BitVec;
use bv::Bits;

use crate::count::SymbolCounts;
use crate::tree::HuffNode;
use crate::tree::HuffTree;

/// Stores the bit strings for each symbol (in this case, any byte). Symbols
/// without a code have an empty entry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SymbolCodes {
    codes: [SymbolCode; 256],
}

/// A single code word of up to 255 bits, packed least significant bit first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolCode {
    packed_bits: [u8; 32],
    length: u8,
}

impl SymbolCodes {
    pub fn get(&self, symbol: u8) -> Option<&SymbolCode> {
        let code = &self.codes[symbol as usize];
        if code.length == 0 {
            None
        } else {
            Some(code)
        }
    }

    /// Symbols that have a code, with their codes, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &SymbolCode)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.length > 0)
            .map(|(symbol, code)| (symbol as u8, code))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact size in bits of the code stream for input with `counts`.
    pub fn encoded_bit_len(&self, counts: &SymbolCounts) -> u64 {
        counts
            .iter()
            .map(|(symbol, count)| count * self.codes[symbol as usize].bit_len())
            .sum()
    }
}

impl fmt::Debug for SymbolCodes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(symbol, code)| (symbol, code.to_string())))
            .finish()
    }
}

impl HuffTree {
    /// Derive the code table by a depth-first walk: a `zero` branch appends
    /// a 0 bit, a `one` branch a 1 bit, and each real leaf records the path
    /// that reached it. The placeholder gets no code.
    pub fn codes(&self) -> SymbolCodes {
        let mut codes = [SymbolCode::default(); 256];

        let mut cur_bits = BitVec::new();
        codes_from_tree_impl(self.root(), &mut codes, &mut cur_bits);
        debug_assert_eq!(cur_bits.len(), 0);

        for (symbol, code) in codes.iter().enumerate().filter(|(_, c)| c.length > 0) {
            log::trace!("code {:#04x} -> {}", symbol, code);
        }

        SymbolCodes { codes }
    }
}

fn codes_from_tree_impl(node: &HuffNode, codes: &mut [SymbolCode; 256], cur_bits: &mut BitVec<u8>) {
    match node {
        HuffNode::Parent(p) => {
            cur_bits.push(false);
            codes_from_tree_impl(&p.zero, codes, cur_bits);
            cur_bits.pop();
            cur_bits.push(true);
            codes_from_tree_impl(&p.one, codes, cur_bits);
            cur_bits.pop();
        }
        HuffNode::Leaf(l) => {
            // A built tree never has a leaf at its root, so every path here
            // holds at least one bit.
            debug_assert!(cur_bits.len() > 0);
            codes[l.symbol as usize] = SymbolCode::from_bits(&*cur_bits);
        }
        HuffNode::Placeholder => {}
    }
}

impl SymbolCode {
    pub fn from_bits<B: Bits<Block = u8>>(bits: B) -> SymbolCode {
        assert!(bits.bit_len() <= 255);

        let mut packed_bits = [0; 32];
        for i in 0..bits.bit_len() {
            if bits.get_bit(i) {
                packed_bits[(i / 8) as usize] |= 1 << (i % 8);
            }
        }

        SymbolCode {
            packed_bits,
            length: bits.bit_len() as u8,
        }
    }

    pub fn is_prefix_of(&self, other: &SymbolCode) -> bool {
        self.bit_len() <= other.bit_len()
            && (0..self.bit_len()).all(|i| self.get_bit(i) == other.get_bit(i))
    }
}

impl Bits for SymbolCode {
    type Block = u8;

    fn bit_len(&self) -> u64 {
        self.length as u64
    }

    fn get_block(&self, position: usize) -> Self::Block {
        self.packed_bits[position]
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.bit_len() {
            f.write_str(if self.get_bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes_for(input: &[u8]) -> SymbolCodes {
        HuffTree::build(&SymbolCounts::from_bytes(input)).codes()
    }

    fn code_string(codes: &SymbolCodes, symbol: u8) -> String {
        codes.get(symbol).map(|c| c.to_string()).unwrap_or_default()
    }

    #[test]
    fn empty_tree_has_no_codes() {
        let codes = codes_for(b"");
        assert!(codes.is_empty());
        assert_eq!(codes.get(0), None);
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let codes = codes_for(b"qqqqq");
        assert_eq!(codes.len(), 1);
        assert_eq!(code_string(&codes, b'q'), "0");
        assert_eq!(codes.encoded_bit_len(&SymbolCounts::from_bytes(b"qqqqq")), 5);
    }

    #[test]
    fn aaab_codes_are_one_bit_each() {
        let codes = codes_for(b"aaab");
        assert_eq!(code_string(&codes, b'b'), "0");
        assert_eq!(code_string(&codes, b'a'), "1");
        assert_eq!(codes.encoded_bit_len(&SymbolCounts::from_bytes(b"aaab")), 4);
    }

    #[test]
    fn abc_code_lengths() {
        let codes = codes_for(b"abc");
        assert_eq!(code_string(&codes, b'c'), "0");
        assert_eq!(code_string(&codes, b'a'), "10");
        assert_eq!(code_string(&codes, b'b'), "11");
        assert_eq!(codes.encoded_bit_len(&SymbolCounts::from_bytes(b"abc")), 5);
    }

    #[test]
    fn frequent_symbols_get_shorter_codes() {
        let codes = codes_for(b"eeeeeeeeeettttaoi");
        let len = |s: u8| codes.get(s).map(|c| c.bit_len()).unwrap_or(0);
        assert!(len(b'e') <= len(b't'));
        assert!(len(b't') <= len(b'a'));
        assert!(len(b't') <= len(b'o'));
    }

    #[test]
    fn from_bits_round_trips_through_bits() {
        let mut bits = BitVec::<u8>::new();
        for &b in &[true, false, true, true, false, false, false, false, true, true] {
            bits.push(b);
        }
        let code = SymbolCode::from_bits(&bits);
        assert_eq!(code.bit_len(), 10);
        assert_eq!(code.to_string(), "1011000011");
    }

    #[test]
    fn prefix_detection() {
        let mut short = BitVec::<u8>::new();
        short.push(true);
        let mut long = short.clone();
        long.push(false);
        let short = SymbolCode::from_bits(&short);
        let long = SymbolCode::from_bits(&long);
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
    }

    #[test]
    fn skewed_counts_reach_long_codes() {
        // Fibonacci weights produce a maximally unbalanced tree.
        let mut counts = SymbolCounts::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..40u8 {
            counts.add(symbol, a);
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffTree::build(&counts);
        let codes = tree.codes();
        let longest = codes.iter().map(|(_, c)| c.bit_len()).max().unwrap();
        assert_eq!(longest, 39);
        assert_eq!(tree.depth(), 39);
    }
}
