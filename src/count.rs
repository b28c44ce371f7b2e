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

use crate::error::Error;
use crate::error::Result;
use crate::error::Stage;

/// Stores the number of occurrences of each possible input symbol. In this
/// case, a symbol is any byte. Symbols that never occurred have count 0 and
/// are skipped by `iter`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SymbolCounts {
    counts: [u64; 256],
}

impl SymbolCounts {
    pub fn new() -> SymbolCounts {
        SymbolCounts { counts: [0; 256] }
    }

    pub fn from_bytes(bytes: &[u8]) -> SymbolCounts {
        let mut counts = SymbolCounts::new();
        for &b in bytes {
            counts.add(b, 1);
        }
        counts
    }

    pub fn add(&mut self, symbol: u8, count: u64) {
        self.counts[symbol as usize] += count;
    }

    /// Occurrences of `symbol`, or `None` if it never occurred.
    pub fn get(&self, symbol: u8) -> Option<u64> {
        match self.counts[symbol as usize] {
            0 => None,
            n => Some(n),
        }
    }

    /// Present symbols and their counts, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Number of distinct symbols seen.
    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    /// Length of the counted input.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl Default for SymbolCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymbolCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Count every symbol of `input` in a single pass, consuming it to the end.
pub fn count_symbols<R: Read>(input: R) -> Result<SymbolCounts> {
    let mut counts = SymbolCounts::new();
    for b in input.bytes() {
        counts.add(b.map_err(Error::io(Stage::Count))?, 1);
    }

    log::debug!(
        "counted {} symbols, {} distinct",
        counts.total(),
        counts.distinct()
    );
    Ok(counts)
}
