use super::error::PackError;

const WORD_BITS: usize = 64;

/// Fixed-size row-major bit grid packed into `u64` words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: usize,
    height: usize,
    words: Vec<u64>,
}

impl BitGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len());
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        self.get(y * self.width + x)
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len());
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    pub fn set_xy(&mut self, x: usize, y: usize) {
        self.set(y * self.width + x);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn first_set(&self) -> Option<usize> {
        for (word_idx, word) in self.words.iter().enumerate() {
            if *word != 0 {
                let index = word_idx * WORD_BITS + word.trailing_zeros() as usize;
                return (index < self.len()).then_some(index);
            }
        }
        None
    }

    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.len();
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, word)| {
                let mut rest = *word;
                std::iter::from_fn(move || {
                    if rest == 0 {
                        return None;
                    }
                    let bit = rest.trailing_zeros() as usize;
                    rest &= rest - 1;
                    Some(word_idx * WORD_BITS + bit)
                })
            })
            .take_while(move |idx| *idx < len)
    }
}

/// Rasterized silhouette of one word. A set bit is an opaque pixel.
///
/// Masks are immutable once built; the index of the first opaque pixel is
/// computed up front so collision scans can skip leading transparent rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMask {
    bits: BitGrid,
    first_set: Option<usize>,
}

impl WordMask {
    pub fn from_bools(width: usize, height: usize, pixels: &[bool]) -> Result<Self, PackError> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(PackError::InvalidArgument(format!(
                "mask has {} pixels, expected {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        let mut bits = BitGrid::new(width, height);
        for (idx, opaque) in pixels.iter().enumerate() {
            if *opaque {
                bits.set(idx);
            }
        }
        Ok(Self::from_grid(bits))
    }

    /// Threshold an 8-bit coverage buffer (one byte per pixel).
    pub fn from_alpha(
        width: usize,
        height: usize,
        alpha: &[u8],
        threshold: u8,
    ) -> Result<Self, PackError> {
        check_dimensions(width, height)?;
        if alpha.len() != width * height {
            return Err(PackError::InvalidArgument(format!(
                "alpha buffer has {} bytes, expected {}x{}",
                alpha.len(),
                width,
                height
            )));
        }
        let mut bits = BitGrid::new(width, height);
        for (idx, value) in alpha.iter().enumerate() {
            if *value > threshold {
                bits.set(idx);
            }
        }
        Ok(Self::from_grid(bits))
    }

    pub fn filled(width: usize, height: usize) -> Result<Self, PackError> {
        check_dimensions(width, height)?;
        let mut bits = BitGrid::new(width, height);
        for idx in 0..width * height {
            bits.set(idx);
        }
        Ok(Self::from_grid(bits))
    }

    fn from_grid(bits: BitGrid) -> Self {
        let first_set = bits.first_set();
        Self { bits, first_set }
    }

    pub fn width(&self) -> usize {
        self.bits.width()
    }

    pub fn height(&self) -> usize {
        self.bits.height()
    }

    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        self.bits.get_xy(x, y)
    }

    pub fn opaque_count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn first_set(&self) -> Option<usize> {
        self.first_set
    }

    pub(crate) fn bits(&self) -> &BitGrid {
        &self.bits
    }

    /// Rotate a quarter turn clockwise; width and height swap.
    pub fn rotated_cw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut bits = BitGrid::new(h, w);
        for idx in self.bits.iter_ones() {
            let (x, y) = (idx % w, idx / w);
            bits.set_xy(h - 1 - y, x);
        }
        Self::from_grid(bits)
    }

    /// Crop to the tight box around opaque pixels, returning the offset of
    /// the crop inside the original. Fully transparent masks come back
    /// unchanged with a zero offset.
    pub fn trimmed(&self) -> (Self, (usize, usize)) {
        let (w, h) = (self.width(), self.height());
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (w, h, 0, 0);
        let mut any = false;
        for idx in self.bits.iter_ones() {
            let (x, y) = (idx % w, idx / w);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            any = true;
        }
        if !any {
            return (self.clone(), (0, 0));
        }
        let new_w = max_x - min_x + 1;
        let new_h = max_y - min_y + 1;
        let mut bits = BitGrid::new(new_w, new_h);
        for y in 0..new_h {
            for x in 0..new_w {
                if self.bits.get_xy(min_x + x, min_y + y) {
                    bits.set_xy(x, y);
                }
            }
        }
        (Self::from_grid(bits), (min_x, min_y))
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), PackError> {
    if width == 0 || height == 0 {
        return Err(PackError::InvalidArgument(format!(
            "mask dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}
