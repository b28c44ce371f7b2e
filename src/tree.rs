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

use crate::count::SymbolCounts;
use crate::util::MinQueue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffParent {
    pub weight: u64,
    pub zero: Box<HuffNode>,
    pub one: Box<HuffNode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HuffLeaf {
    pub symbol: u8,
    pub weight: u64,
}

/// A node of a Huffman tree.
///
/// `Placeholder` is a zero-weight leaf with no symbol. It fills the root of
/// the tree built from empty input, and the unused branch of the tree built
/// from a single distinct symbol. No code word ever leads to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HuffNode {
    Parent(HuffParent),
    Leaf(HuffLeaf),
    Placeholder,
}

impl HuffNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Parent(p) => p.weight,
            HuffNode::Leaf(l) => l.weight,
            HuffNode::Placeholder => 0,
        }
    }

    fn parent(zero: HuffNode, one: HuffNode) -> HuffNode {
        HuffNode::Parent(HuffParent {
            weight: zero.weight() + one.weight(),
            zero: Box::new(zero),
            one: Box::new(one),
        })
    }

    /// The child reached by following `bit` from this node, if any.
    pub fn child(&self, bit: bool) -> Option<&HuffNode> {
        match self {
            HuffNode::Parent(p) if bit => Some(&*p.one),
            HuffNode::Parent(p) => Some(&*p.zero),
            _ => None,
        }
    }
}

/// A complete Huffman tree. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffTree {
    root: HuffNode,
}

impl HuffTree {
    /// Build the minimum-redundancy tree for `symbol_counts`.
    ///
    /// The two lightest trees are merged repeatedly, the first one removed
    /// becoming the `zero` branch. Ties go to whichever tree entered the
    /// queue first; leaves enter in ascending symbol order, so the result
    /// depends only on the counts.
    pub fn build(symbol_counts: &SymbolCounts) -> HuffTree {
        let mut node_queue = MinQueue::new();
        for (symbol, count) in symbol_counts.iter() {
            let leaf = HuffNode::Leaf(HuffLeaf {
                symbol,
                weight: count,
            });
            node_queue.push(leaf.weight(), leaf);
        }

        let root = match node_queue.len() {
            0 => HuffNode::Placeholder,
            1 => match node_queue.pop() {
                Some(only) => HuffNode::parent(only, HuffNode::Placeholder),
                None => unreachable!("queue holds exactly one tree"),
            },
            _ => loop {
                let (first, second) = match (node_queue.pop(), node_queue.pop()) {
                    (Some(first), Some(second)) => (first, second),
                    (Some(last), None) => break last,
                    _ => unreachable!("queue started with at least two trees"),
                };
                let merged = HuffNode::parent(first, second);
                node_queue.push(merged.weight(), merged);
            },
        };

        let tree = HuffTree { root };
        debug_assert!(tree.check_invariants().is_ok());
        log::debug!(
            "built tree: weight {}, {} leaves, depth {}",
            tree.weight(),
            tree.leaf_count(),
            tree.depth()
        );
        tree
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Total weight, i.e. the number of symbols the tree was built from.
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// True for the tree built from empty input.
    pub fn is_empty(&self) -> bool {
        self.root == HuffNode::Placeholder
    }

    /// Number of real (symbol-carrying) leaves.
    pub fn leaf_count(&self) -> usize {
        fn walk(node: &HuffNode) -> usize {
            match node {
                HuffNode::Parent(p) => walk(&p.zero) + walk(&p.one),
                HuffNode::Leaf(_) => 1,
                HuffNode::Placeholder => 0,
            }
        }
        walk(&self.root)
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(node: &HuffNode) -> usize {
            match node {
                HuffNode::Parent(p) => 1 + walk(&p.zero).max(walk(&p.one)),
                _ => 0,
            }
        }
        walk(&self.root)
    }

    /// Verify the structural invariants every built tree satisfies: parent
    /// weights are the sum of their children, real leaves have nonzero
    /// weight, and a placeholder only appears as the whole tree or as the
    /// `one` branch of a root whose `zero` branch is the only real leaf.
    pub fn check_invariants(&self) -> Result<(), String> {
        fn walk(node: &HuffNode, is_root: bool) -> Result<(), String> {
            match node {
                HuffNode::Parent(p) => {
                    if p.weight != p.zero.weight() + p.one.weight() {
                        return Err(format!(
                            "parent weight {} != {} + {}",
                            p.weight,
                            p.zero.weight(),
                            p.one.weight()
                        ));
                    }
                    if *p.zero == HuffNode::Placeholder {
                        return Err("placeholder on a zero branch".into());
                    }
                    if *p.one == HuffNode::Placeholder {
                        if !is_root {
                            return Err("placeholder below the root".into());
                        }
                        if !matches!(*p.zero, HuffNode::Leaf(_)) {
                            return Err("placeholder beside a subtree".into());
                        }
                    }
                    walk(&p.zero, false)?;
                    walk(&p.one, false)
                }
                HuffNode::Leaf(l) if l.weight == 0 => {
                    Err(format!("leaf {:#04x} has zero weight", l.symbol))
                }
                HuffNode::Leaf(_) | HuffNode::Placeholder => Ok(()),
            }
        }
        if let HuffNode::Leaf(_) = self.root {
            return Err("leaf at the root has an empty code".into());
        }
        walk(&self.root, true)
    }
}
