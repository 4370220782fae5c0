//! Weak rolling checksum used to find candidate blocks
//!
//! The checksum is Adler-32 style without the modulus:
//! - a = sum of all bytes
//! - b = n*byte[0] + (n-1)*byte[1] + ... + 1*byte[n-1]
//! - result = (b << 16) | (a & 0xffff)
//!
//! All arithmetic wraps, so sliding the window is two additions and a
//! multiplication regardless of the window length.

/// Compute the weak checksum of a block in one pass
#[inline]
pub fn weak_checksum(data: &[u8]) -> u32 {
    let mut a: u32 = 0;
    let mut b: u32 = 0;

    for &byte in data {
        a = a.wrapping_add(byte as u32);
        b = b.wrapping_add(a);
    }

    (b << 16) | (a & 0xffff)
}

/// Rolling checksum state for O(1) updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
    len: usize,
}

impl RollingChecksum {
    /// Create a new rolling checksum over a window
    pub fn new(window: &[u8]) -> Self {
        let mut a: u32 = 0;
        let mut b: u32 = 0;

        for &byte in window {
            a = a.wrapping_add(byte as u32);
            b = b.wrapping_add(a);
        }

        Self {
            a,
            b,
            len: window.len(),
        }
    }

    /// Get the current checksum value
    #[inline]
    pub fn value(&self) -> u32 {
        (self.b << 16) | (self.a & 0xffff)
    }

    /// Number of bytes currently covered
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slide the window by one byte: remove `old_byte`, append `new_byte`
    #[inline]
    pub fn roll(&mut self, old_byte: u8, new_byte: u8) {
        let old = old_byte as u32;
        let new = new_byte as u32;

        self.a = self.a.wrapping_sub(old).wrapping_add(new);
        // b loses (len * old) and every remaining byte gains one weight step
        self.b = self
            .b
            .wrapping_sub((self.len as u32).wrapping_mul(old))
            .wrapping_add(self.a);
    }

    /// Drop the leading byte without a replacement (end of stream)
    #[inline]
    pub fn roll_out(&mut self, old_byte: u8) {
        let old = old_byte as u32;

        self.a = self.a.wrapping_sub(old);
        self.b = self.b.wrapping_sub((self.len as u32).wrapping_mul(old));
        self.len -= 1;
    }
}
