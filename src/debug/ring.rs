/// Fixed-capacity circular buffer. Allocated once, overwrites the oldest
/// entry when full.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![T::default(); capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        let cap = self.buf.len();
        self.buf[self.head] = value;
        self.head = (self.head + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let cap = self.buf.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| &self.buf[(start + i) % cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_keeps_order() {
        let mut ring = RingBuffer::new(3);
        assert!(ring.is_empty());
        for v in 1..=5 {
            ring.push(v);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().copied().collect::<Vec<i32>>(), vec![3, 4, 5]);
    }

    #[test]
    fn partial_fill() {
        let mut ring = RingBuffer::new(4);
        ring.push(1.5f64);
        ring.push(2.5);
        assert_eq!(ring.iter().copied().collect::<Vec<f64>>(), vec![1.5, 2.5]);
    }
}
