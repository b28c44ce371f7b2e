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

use std::cmp;
use std::collections::BinaryHeap;

/// `Keyed` stores a key-value pair and forwards comparisons to the key.
///
/// This lets a `std::collections::BinaryHeap` order values by a priority
/// extracted from them instead of by the values themselves.
#[derive(Clone, Copy, Debug)]
struct Keyed<K, T> {
    key: K,
    value: T,
}

impl<K: PartialEq, T> PartialEq for Keyed<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, T> Eq for Keyed<K, T> {}

impl<K: Ord, T> Ord for Keyed<K, T> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl<K: PartialOrd, T> PartialOrd for Keyed<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

/// A min-priority queue over `BinaryHeap`.
///
/// Equal keys pop in insertion order: every entry is keyed by
/// `(key, sequence)` where the sequence number increases on each push.
#[derive(Debug)]
pub struct MinQueue<K, T> {
    heap: BinaryHeap<cmp::Reverse<Keyed<(K, u64), T>>>,
    next_seq: u64,
}

impl<K: Ord, T> MinQueue<K, T> {
    pub fn new() -> MinQueue<K, T> {
        MinQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, key: K, value: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(cmp::Reverse(Keyed {
            key: (key, seq),
            value,
        }));
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|cmp::Reverse(keyed)| keyed.value)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_smallest_key_first() {
        let mut queue = MinQueue::new();
        queue.push(5, 'e');
        queue.push(1, 'a');
        queue.push(3, 'c');

        assert_eq!(queue.pop(), Some('a'));
        assert_eq!(queue.pop(), Some('c'));
        assert_eq!(queue.pop(), Some('e'));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let mut queue = MinQueue::new();
        for value in ['x', 'y', 'z'] {
            queue.push(7u64, value);
        }
        queue.push(2, 'w');

        let order: Vec<char> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(order, vec!['w', 'x', 'y', 'z']);
    }

    #[test]
    fn len_tracks_pushes_and_pops() {
        let mut queue = MinQueue::new();
        assert_eq!(queue.len(), 0);
        queue.push(1u32, ());
        queue.push(1u32, ());
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }
}
