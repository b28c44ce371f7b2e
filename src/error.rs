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
use std::io;

use thiserror::Error;

/// Pipeline stage during which an I/O failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Count,
    Rewind,
    WriteHeader,
    Encode,
    ReadHeader,
    Decode,
    Flush,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Count => "counting symbols",
            Stage::Rewind => "rewinding input",
            Stage::WriteHeader => "writing header",
            Stage::Encode => "encoding",
            Stage::ReadHeader => "reading header",
            Stage::Decode => "decoding",
            Stage::Flush => "flushing output",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error while {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// The input held a byte the code table has no entry for. Only happens
    /// if the table was derived from different data than what is encoded.
    #[error("symbol {symbol:#04x} has no code")]
    MissingCode { symbol: u8 },

    #[error("input changed between passes: counted {counted} symbols, encoded {encoded}")]
    InputChanged { counted: u64, encoded: u64 },

    #[error("compressed stream ended after {decoded} of {expected} symbols")]
    Truncated { decoded: u64, expected: u64 },

    #[error("bit {position} does not lead to a symbol")]
    InvalidCode { position: u64 },

    #[error("invalid header: {0}")]
    Header(#[from] HeaderError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("bad magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("{0} distinct symbols, at most 256 allowed")]
    TooManySymbols(u16),

    #[error("symbol {symbol:#04x} out of order after {previous:#04x}")]
    Unordered { previous: u8, symbol: u8 },

    #[error("symbol {0:#04x} stored with a zero count")]
    ZeroCount(u8),

    #[error("symbol counts overflow")]
    CountOverflow,
}

impl Error {
    pub(crate) fn io(stage: Stage) -> impl FnOnce(io::Error) -> Error {
        move |source| Error::Io { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
