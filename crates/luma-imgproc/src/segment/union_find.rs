/// A disjoint-set (union-find) data structure whose roots are the lowest ids.
///
/// Uniting two sets always keeps the root that was created first, so callers can
/// rely on the earliest member representing the merged set.
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    /// Creates a new UnionFind structure with length `len`.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    /// Returns the representative (root) of the set containing `id`, with path compression.
    pub fn get_representative(&mut self, mut id: usize) -> usize {
        let mut root = id;

        // Chase down the root
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Go back and collapse the tree
        while self.parent[id] != root {
            let tmp = self.parent[id];
            self.parent[id] = root;
            id = tmp;
        }

        root
    }

    /// Unites the sets containing `aid` and `bid`, returning the surviving (lowest) root.
    pub fn connect(&mut self, aid: usize, bid: usize) -> usize {
        let aroot = self.get_representative(aid);
        let broot = self.get_representative(bid);

        let (keep, merged) = if aroot <= broot {
            (aroot, broot)
        } else {
            (broot, aroot)
        };
        self.parent[merged] = keep;
        keep
    }

    /// Returns the number of elements in the UnionFind structure.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the structure holds no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_representative() {
        let mut uf = UnionFind::new(10);

        assert_eq!(uf.get_representative(0), 0);
        assert_eq!(uf.get_representative(5), 5);
        assert_eq!(uf.len(), 10);
        assert!(!uf.is_empty());
        assert!(UnionFind::new(0).is_empty());
    }

    #[test]
    fn test_union_keeps_lowest_root() {
        let mut uf = UnionFind::new(10);

        assert_eq!(uf.connect(4, 1), 1);
        assert_eq!(uf.get_representative(4), 1);

        assert_eq!(uf.connect(7, 8), 7);
        assert_eq!(uf.connect(8, 4), 1);
        assert_eq!(uf.get_representative(7), 1);

        assert_eq!(uf.connect(0, 7), 0);
        assert_eq!(uf.get_representative(8), 0);
        assert_eq!(uf.get_representative(9), 9);
    }
}
