//! Growable scratch byte buffer.
//!
//! Used to amortize allocations across repeated probe-then-fill OS calls
//! (adapter enumeration grows this until the kernel accepts the size).
//! Move-only by virtue of wrapping `Vec<u8>`.

////////////////////////////////////////////////////////////////////////////////
//// Structures

#[derive(Default, Debug)]
pub struct Buffer(Vec<u8>);

////////////////////////////////////////////////////////////////////////////////
//// Implementations

impl Buffer {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_size(size: usize) -> Self {
        Self(vec![0u8; size])
    }

    /// Resizing to 0 deallocates the backing storage.
    pub fn resize(&mut self, size: usize) {
        if size == 0 {
            self.0 = Vec::new();
        } else {
            self.0.resize(size, 0);
        }
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.0
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.0.as_mut_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_and_shrinks() {
        let mut buf = Buffer::new();
        assert_eq!(buf.size(), 0);

        buf.resize(128);
        assert_eq!(buf.size(), 128);
        assert_eq!(buf.data().len(), 128);

        buf.resize(0);
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn with_size_is_zeroed() {
        let buf = Buffer::with_size(16);
        assert!(buf.data().iter().all(|&b| b == 0));
    }
}
