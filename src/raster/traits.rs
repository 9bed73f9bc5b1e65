/// Row access over a raster, one contiguous slice per row.
pub trait RasterView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Visible pixels of row `y`, exactly `width()` long.
    fn row(&self, y: usize) -> &[Self::Pixel];

    fn rows(&self) -> RowIter<'_, Self>
    where
        Self: Sized,
    {
        RowIter { raster: self, y: 0 }
    }
}

pub trait RasterViewMut: RasterView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}

/// Top-to-bottom iterator over the rows of a [`RasterView`].
pub struct RowIter<'a, R: RasterView> {
    raster: &'a R,
    y: usize,
}

impl<'a, R: RasterView> Iterator for RowIter<'a, R> {
    type Item = &'a [R::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.raster.height() {
            return None;
        }
        let row = self.raster.row(self.y);
        self.y += 1;
        Some(row)
    }
}
