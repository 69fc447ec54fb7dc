/// A caller-owned byte array paired with a cursor.
///
/// The codec borrows a `Region` for the duration of one call, reads or
/// writes starting at `index`, and on success moves `index` past the bytes
/// it consumed or produced. On failure the cursor is left unspecified.
#[derive(Debug)]
pub struct Region<B> {
    pub array: B,
    pub index: usize,
}

impl<B: AsRef<[u8]>> Region<B> {
    pub fn new(array: B) -> Region<B> {
        Region { array, index: 0 }
    }

    pub fn with_index(array: B, index: usize) -> Region<B> {
        Region { array, index }
    }

    /// Bytes between the cursor and the end of the array.
    pub fn remaining(&self) -> usize {
        self.array.as_ref().len().saturating_sub(self.index)
    }
}
