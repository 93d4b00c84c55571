//! Height-balanced ordered map.
//!
//! [`AvlMap`] keeps its entries ordered by key, and supports insertion,
//! removal and neighbour queries (predecessor / successor) in
//! logarithmic time. Nodes are stored in a [`Slab`] arena owned by the
//! map, and refer to their children by slab key.
//!
//! Besides the usual `K: Ord` interface, every operation has a `_by`
//! variant that takes a probe closure instead of a key, in the manner
//! of [`slice::binary_search_by`]. The closure receives a stored entry
//! and must return the ordering of that entry relative to the target.
//! This lets callers order entries by a criterion that depends on
//! external state (such as the position of a sweep line), as long as
//! the criterion is consistent with the current shape of the tree.
use std::{cmp::Ordering, fmt::Debug, iter::FusedIterator, mem};

use slab::Slab;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<usize>,
    right: Option<usize>,
    height: usize,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// An ordered map backed by an AVL tree.
#[derive(Debug, Clone)]
pub struct AvlMap<K, V> {
    nodes: Slab<Node<K, V>>,
    root: Option<usize>,
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        AvlMap {
            nodes: Slab::new(),
            root: None,
        }
    }
}

impl<K, V> AvlMap<K, V> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(size: usize) -> Self {
        AvlMap {
            nodes: Slab::with_capacity(size),
            root: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree; `0` when empty.
    #[inline]
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Insert an entry positioned by `cmp`.
    ///
    /// If an entry compares equal, it is replaced (key included) and the
    /// old value is returned.
    pub fn insert_by<F>(&mut self, key: K, value: V, mut cmp: F) -> Option<V>
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let (root, replaced) =
            self.insert_at(self.root, key, value, &mut |k, v, _, _| cmp(k, v));
        self.root = Some(root);
        replaced
    }

    /// Remove the entry for which `cmp` returns `Equal`, if any.
    pub fn remove_by<F>(&mut self, mut cmp: F) -> Option<(K, V)>
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let (root, removed) = self.remove_at(self.root, &mut cmp);
        self.root = root;
        removed.map(|idx| {
            let node = self.nodes.remove(idx);
            (node.key, node.value)
        })
    }

    /// Get the entry for which `cmp` returns `Equal`, if any.
    pub fn get_by<F>(&self, mut cmp: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            current = match cmp(&node.key, &node.value) {
                Ordering::Less => node.right,
                Ordering::Greater => node.left,
                Ordering::Equal => return Some((&node.key, &node.value)),
            };
        }
        None
    }

    /// The greatest entry ordered strictly before the target.
    pub fn predecessor_by<F>(&self, mut cmp: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if cmp(&node.key, &node.value) == Ordering::Less {
                best = Some(idx);
                current = node.right;
            } else {
                current = node.left;
            }
        }
        best.map(|idx| self.entry(idx))
    }

    /// The least entry ordered strictly after the target.
    pub fn successor_by<F>(&self, mut cmp: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if cmp(&node.key, &node.value) == Ordering::Greater {
                best = Some(idx);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        best.map(|idx| self.entry(idx))
    }

    /// The smallest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut idx = self.root?;
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        Some(self.entry(idx))
    }

    /// The largest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut idx = self.root?;
        while let Some(right) = self.nodes[idx].right {
            idx = right;
        }
        Some(self.entry(idx))
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            map: self,
            stack: Vec::with_capacity(self.height()),
            remaining: self.len(),
        };
        iter.push_left(self.root);
        iter
    }

    #[inline]
    fn entry(&self, idx: usize) -> (&K, &V) {
        let node = &self.nodes[idx];
        (&node.key, &node.value)
    }

    #[inline]
    fn height_of(&self, node: Option<usize>) -> usize {
        node.map_or(0, |idx| self.nodes[idx].height)
    }

    #[inline]
    fn update_height(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[idx].height = height;
    }

    /// Height of the left subtree minus that of the right subtree.
    #[inline]
    fn balance_factor(&self, idx: usize) -> isize {
        let node = &self.nodes[idx];
        self.height_of(node.left) as isize - self.height_of(node.right) as isize
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let pivot = self.nodes[idx]
            .left
            .expect("right rotation requires a left child");
        self.nodes[idx].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let pivot = self.nodes[idx]
            .right
            .expect("left rotation requires a right child");
        self.nodes[idx].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    /// Restore the AVL invariant at `idx`, assuming both subtrees are
    /// balanced and their heights differ by at most two. Returns the
    /// new root of the subtree.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);
        debug_assert!(balance.abs() <= 2, "subtree went out of balance by {}", balance);

        if balance > 1 {
            let left = self.nodes[idx].left.expect("left-heavy node without a left child");
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes[idx].left = Some(left);
            }
            self.rotate_right(idx)
        } else if balance < -1 {
            let right = self.nodes[idx].right.expect("right-heavy node without a right child");
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes[idx].right = Some(right);
            }
            self.rotate_left(idx)
        } else {
            idx
        }
    }

    /// Insert below `node`. The comparator receives the stored entry
    /// followed by the entry being inserted.
    fn insert_at<F>(
        &mut self,
        node: Option<usize>,
        key: K,
        value: V,
        cmp: &mut F,
    ) -> (usize, Option<V>)
    where
        F: FnMut(&K, &V, &K, &V) -> Ordering,
    {
        let idx = match node {
            Some(idx) => idx,
            None => return (self.nodes.insert(Node::leaf(key, value)), None),
        };

        let current = &self.nodes[idx];
        let (left, right) = (current.left, current.right);
        let replaced = match cmp(&current.key, &current.value, &key, &value) {
            Ordering::Greater => {
                let (child, replaced) = self.insert_at(left, key, value, cmp);
                self.nodes[idx].left = Some(child);
                replaced
            }
            Ordering::Less => {
                let (child, replaced) = self.insert_at(right, key, value, cmp);
                self.nodes[idx].right = Some(child);
                replaced
            }
            Ordering::Equal => {
                let current = &mut self.nodes[idx];
                current.key = key;
                return (idx, Some(mem::replace(&mut current.value, value)));
            }
        };
        (self.rebalance(idx), replaced)
    }

    /// Unlink the matching node from the subtree at `node`. Returns the
    /// new subtree root and the slab key of the unlinked node; the
    /// caller frees it.
    fn remove_at<F>(&mut self, node: Option<usize>, cmp: &mut F) -> (Option<usize>, Option<usize>)
    where
        F: FnMut(&K, &V) -> Ordering,
    {
        let idx = match node {
            Some(idx) => idx,
            None => return (None, None),
        };

        let current = &self.nodes[idx];
        let (left, right) = (current.left, current.right);
        match cmp(&current.key, &current.value) {
            Ordering::Greater => {
                let (child, removed) = self.remove_at(left, cmp);
                if removed.is_none() {
                    return (Some(idx), None);
                }
                self.nodes[idx].left = child;
                (Some(self.rebalance(idx)), removed)
            }
            Ordering::Less => {
                let (child, removed) = self.remove_at(right, cmp);
                if removed.is_none() {
                    return (Some(idx), None);
                }
                self.nodes[idx].right = child;
                (Some(self.rebalance(idx)), removed)
            }
            Ordering::Equal => {
                let replacement = match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(left), Some(right)) => {
                        let (right, min) = self.take_min(right);
                        let successor = &mut self.nodes[min];
                        successor.left = Some(left);
                        successor.right = right;
                        Some(self.rebalance(min))
                    }
                };
                (replacement, Some(idx))
            }
        }
    }

    /// Unlink the minimum node of the subtree at `idx`. Returns the new
    /// subtree root and the unlinked node.
    fn take_min(&mut self, idx: usize) -> (Option<usize>, usize) {
        match self.nodes[idx].left {
            None => (self.nodes[idx].right, idx),
            Some(left) => {
                let (child, min) = self.take_min(left);
                self.nodes[idx].left = child;
                (Some(self.rebalance(idx)), min)
            }
        }
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Insert a pair. An existing entry with an equal key is
    /// overwritten and its value returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, replaced) =
            self.insert_at(self.root, key, value, &mut |k, _, probe, _| k.cmp(probe));
        self.root = Some(root);
        replaced
    }

    /// Remove the entry with the given key. Absent keys are not an
    /// error; `None` is returned.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        self.remove_by(|k, _| k.cmp(key))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_by(|k, _| k.cmp(key)).map(|(_, v)| v)
    }

    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// The entry with the greatest key strictly less than `key`.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        self.predecessor_by(|k, _| k.cmp(key))
    }

    /// The entry with the least key strictly greater than `key`.
    pub fn successor(&self, key: &K) -> Option<(&K, &V)> {
        self.successor_by(|k, _| k.cmp(key))
    }
}

/// In-order iterator over an [`AvlMap`].
pub struct Iter<'a, K, V> {
    map: &'a AvlMap<K, V>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut node: Option<usize>) {
        while let Some(idx) = node {
            self.stack.push(idx);
            node = self.map.nodes[idx].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        let idx = self.stack.pop()?;
        self.push_left(map.nodes[idx].right);
        self.remaining -= 1;
        let node = &map.nodes[idx];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
impl<K: Debug, V> AvlMap<K, V> {
    /// Walk the tree and check heights, balance, and the slab
    /// bookkeeping. Returns the height of the tree.
    pub(crate) fn assert_invariants(&self) -> usize {
        fn walk<K: Debug, V>(map: &AvlMap<K, V>, node: Option<usize>, count: &mut usize) -> usize {
            let idx = match node {
                Some(idx) => idx,
                None => return 0,
            };
            *count += 1;
            let n = &map.nodes[idx];
            let lh = walk(map, n.left, count);
            let rh = walk(map, n.right, count);
            assert!(
                (lh as isize - rh as isize).abs() <= 1,
                "unbalanced node at {:?}: {} vs {}",
                n.key,
                lh,
                rh
            );
            assert_eq!(n.height, 1 + lh.max(rh), "stale height at {:?}", n.key);
            n.height
        }
        let mut count = 0;
        let height = walk(self, self.root, &mut count);
        assert_eq!(count, self.nodes.len(), "slab has unlinked nodes");
        height
    }
}

#[cfg(test)]
mod tests {
    use rand::{prelude::SliceRandom, rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeMap;

    use super::*;

    fn assert_ordered<K: Ord + Debug, V>(map: &AvlMap<K, V>) {
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", keys);

        // Neighbour queries agree with the traversal.
        for w in keys.windows(2) {
            assert_eq!(map.successor(w[0]).map(|(k, _)| k), Some(w[1]));
            assert_eq!(map.predecessor(w[1]).map(|(k, _)| k), Some(w[0]));
        }
        if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
            assert!(map.predecessor(first).is_none());
            assert!(map.successor(last).is_none());
        }
    }

    #[test]
    fn test_empty() {
        let mut map = AvlMap::<i32, usize>::new();
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
        assert!(map.predecessor(&3).is_none());
        assert!(map.successor(&3).is_none());
        assert!(map.first().is_none());
        assert!(map.remove(&3).is_none());
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_neighbours() {
        let map: AvlMap<i32, &str> = vec![(10, "a"), (20, "b"), (30, "c")].into_iter().collect();

        assert_eq!(map.predecessor(&20), Some((&10, &"a")));
        assert_eq!(map.successor(&20), Some((&30, &"c")));
        assert!(map.predecessor(&10).is_none());
        assert!(map.successor(&30).is_none());

        // Keys need not be present.
        assert_eq!(map.predecessor(&25), Some((&20, &"b")));
        assert_eq!(map.successor(&25), Some((&30, &"c")));
        assert_eq!(map.successor(&-5), Some((&10, &"a")));
        assert_eq!(map.predecessor(&99), Some((&30, &"c")));

        assert_eq!(map.first(), Some((&10, &"a")));
        assert_eq!(map.last(), Some((&30, &"c")));
    }

    #[test]
    fn test_duplicate_overwrites() {
        let mut map = AvlMap::new();
        assert_eq!(map.insert(1, 'a'), None);
        assert_eq!(map.insert(1, 'b'), Some('a'));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&'b'));
    }

    #[test]
    fn test_idempotent_remove() {
        let mut map: AvlMap<i32, i32> = (0..10).map(|i| (i, i * i)).collect();
        assert_eq!(map.remove(&4), Some((4, 16)));
        let height = map.height();
        assert_eq!(map.remove(&4), None);
        assert_eq!(map.len(), 9);
        assert_eq!(map.height(), height);
        assert!(!map.contains_key(&4));
        map.assert_invariants();
        assert_ordered(&map);
    }

    #[test]
    fn test_sequential_is_balanced() {
        let mut map = AvlMap::new();
        for i in 0..1023 {
            map.insert(i, ());
            map.assert_invariants();
        }
        // A perfectly balanced tree of 1023 nodes has height 10; an
        // AVL tree stays within 1.44 log2(n).
        assert!(map.height() <= 14);
        assert_ordered(&map);

        for i in (0..1023).step_by(2) {
            assert!(map.remove(&i).is_some());
            map.assert_invariants();
        }
        assert_eq!(map.len(), 511);
        assert_ordered(&map);
    }

    #[test]
    fn test_random_ops() {
        let mut rng = StdRng::seed_from_u64(0xA71);
        let mut map = AvlMap::new();
        let mut reference = BTreeMap::new();

        for _ in 0..5_000 {
            let key: i32 = rng.gen_range(0..200);
            if rng.gen_bool(0.6) {
                assert_eq!(map.insert(key, key * 2), reference.insert(key, key * 2));
            } else {
                assert_eq!(
                    map.remove(&key).map(|(_, v)| v),
                    reference.remove(&key)
                );
            }
            map.assert_invariants();
        }

        assert_eq!(map.len(), reference.len());
        assert!(map.iter().map(|(k, v)| (*k, *v)).eq(reference.iter().map(|(k, v)| (*k, *v))));
        assert_ordered(&map);

        for probe in -1..201 {
            assert_eq!(
                map.predecessor(&probe).map(|(k, _)| *k),
                reference.range(..probe).next_back().map(|(k, _)| *k)
            );
            assert_eq!(
                map.successor(&probe).map(|(k, _)| *k),
                reference.range(probe + 1..).next().map(|(k, _)| *k)
            );
        }
    }

    #[test]
    fn test_drain_in_random_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<u32> = (0..300).collect();
        keys.shuffle(&mut rng);
        let mut map: AvlMap<u32, ()> = keys.iter().map(|k| (*k, ())).collect();
        map.assert_invariants();

        keys.shuffle(&mut rng);
        for k in keys {
            assert!(map.remove(&k).is_some());
            map.assert_invariants();
        }
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
    }

    #[test]
    fn test_probe_by_value() {
        // Entries ordered by a derived quantity, with the value as a
        // tie-break.
        let mut map = AvlMap::new();
        for (key, value) in [(1.5f64, 0usize), (0.5, 1), (1.5, 2), (-2., 3)] {
            map.insert_by(key, value, |k, v| {
                k.partial_cmp(&key).unwrap().then(v.cmp(&value))
            });
        }
        assert_eq!(map.len(), 4);
        let order: Vec<_> = map.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, vec![3, 1, 0, 2]);

        let probe = |k: &f64, v: &usize| k.partial_cmp(&1.5).unwrap().then(v.cmp(&0));
        assert_eq!(map.predecessor_by(probe).map(|(_, v)| *v), Some(1));
        assert_eq!(map.successor_by(probe).map(|(_, v)| *v), Some(2));
        assert_eq!(map.get_by(probe).map(|(_, v)| *v), Some(0));
        assert_eq!(map.remove_by(probe), Some((1.5, 0)));
        assert!(map.get_by(probe).is_none());
        map.assert_invariants();
    }

    #[test]
    fn test_clear() {
        let mut map: AvlMap<i32, ()> = (0..50).map(|k| (k, ())).collect();
        map.clear();
        assert!(map.is_empty());
        assert!(map.first().is_none());
        map.insert(3, ());
        assert_eq!(map.len(), 1);
        map.assert_invariants();
    }
}
