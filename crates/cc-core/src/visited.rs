/// Per-frame visited state, one byte per pixel.
///
/// The mask only grows between [`VisitedMask::clear`] calls; marking an
/// already-marked pixel is a no-op. Scoped to a single frame's processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedMask {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    marked: usize,
}

impl VisitedMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width.checked_mul(height).expect("mask size overflow")],
            marked: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of marked pixels.
    pub fn len(&self) -> usize {
        self.marked
    }

    pub fn is_empty(&self) -> bool {
        self.marked == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x] != 0
    }

    /// Marks a pixel; returns true if it was newly marked.
    pub fn mark(&mut self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height, "mark out of bounds");
        let cell = &mut self.cells[y * self.width + x];
        if *cell != 0 {
            return false;
        }
        *cell = 1;
        self.marked += 1;
        true
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.marked = 0;
    }

    pub fn iter_marked(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .map(move |(i, _)| (i % width, i / width))
    }
}
