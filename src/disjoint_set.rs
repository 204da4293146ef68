//! Union-find over pixel indices.

/// Disjoint-set forest with path compression and union by size.
///
/// `size` is only meaningful at roots.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// One singleton set per element.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    #[inline]
    pub fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        while x != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    /// Merge the sets holding `a` and `b`.
    ///
    /// The larger set's root survives; on equal sizes `a`'s root does.
    /// Returns the surviving root, or `None` if both were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> Option<usize> {
        let mut root_a = self.find(a);
        let mut root_b = self.find(b);
        if root_a == root_b {
            return None;
        }

        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
        Some(root_a)
    }

    /// Number of elements in the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find() {
        let mut ds = DisjointSet::new(5);
        assert_eq!(ds.len(), 5);
        assert!(!ds.is_empty());
        assert!(DisjointSet::new(0).is_empty());

        assert_ne!(ds.find(0), ds.find(1));

        assert!(ds.union(0, 1).is_some());
        assert_eq!(ds.find(0), ds.find(1));

        ds.union(2, 3);
        assert_eq!(ds.find(2), ds.find(3));
        assert_ne!(ds.find(0), ds.find(2));

        ds.union(1, 2);
        assert_eq!(ds.find(0), ds.find(3));
        assert_eq!(ds.set_size(3), 4);
        assert_eq!(ds.set_size(4), 1);
    }

    #[test]
    fn test_union_same_set_is_noop() {
        let mut ds = DisjointSet::new(3);
        ds.union(0, 1);
        assert_eq!(ds.union(1, 0), None);
        assert_eq!(ds.set_size(0), 2);
    }

    #[test]
    fn test_larger_root_survives() {
        let mut ds = DisjointSet::new(4);
        // Equal sizes: the first argument's root wins.
        assert_eq!(ds.union(1, 2), Some(1));
        // {1, 2} is larger than {3}, so 1 stays root even as second argument.
        assert_eq!(ds.union(3, 2), Some(1));
        assert_eq!(ds.find(3), 1);
    }

    #[test]
    fn test_path_compression_flattens() {
        let mut ds = DisjointSet::new(4);
        ds.union(0, 1);
        ds.union(2, 3);
        ds.union(0, 2);
        let root = ds.find(3);
        assert_eq!(ds.parent[3], root);
    }
}
