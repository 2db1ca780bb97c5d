//! Connectivity bookkeeping over room indices
//!
//! A disjoint-set forest with union by size. Finds do not compress paths, so
//! queries take `&self`.

/// Tracks which rooms belong to the same connected component
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    parent: Vec<usize>,
    size: Vec<usize>,
    components: usize,
}

impl ConnectivityTracker {
    /// Every room starts in its own component
    pub fn new(num_rooms: usize) -> Self {
        Self {
            parent: (0..num_rooms).collect(),
            size: vec![1; num_rooms],
            components: num_rooms,
        }
    }

    fn root(&self, mut room: usize) -> usize {
        while self.parent[room] != room {
            room = self.parent[room];
        }
        room
    }

    /// Same component. Out-of-range rooms are never connected.
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        a < self.parent.len() && b < self.parent.len() && self.root(a) == self.root(b)
    }

    /// Join the components of `a` and `b`. Returns false if they already
    /// shared one or either index is out of range.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        if a >= self.parent.len() || b >= self.parent.len() {
            return false;
        }
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.components -= 1;
        true
    }

    pub fn all_connected(&self) -> bool {
        self.components <= 1
    }

    pub fn component_count(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_query() {
        let mut tracker = ConnectivityTracker::new(5);
        assert!(!tracker.are_connected(0, 1));
        assert_eq!(tracker.component_count(), 5);

        assert!(tracker.merge(0, 1));
        assert!(tracker.are_connected(1, 0));
        assert!(!tracker.are_connected(0, 2));

        tracker.merge(2, 3);
        tracker.merge(1, 3);
        assert!(tracker.are_connected(0, 2));
        assert!(!tracker.merge(0, 3));
        assert!(!tracker.all_connected());
        assert_eq!(tracker.component_count(), 2);

        tracker.merge(4, 0);
        assert!(tracker.all_connected());
        assert_eq!(tracker.component_count(), 1);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut tracker = ConnectivityTracker::new(2);
        assert!(!tracker.merge(0, 9));
        assert!(!tracker.are_connected(0, 9));
        assert_eq!(tracker.component_count(), 2);
        assert!(ConnectivityTracker::new(0).all_connected());
        assert!(ConnectivityTracker::new(1).all_connected());
    }
}
