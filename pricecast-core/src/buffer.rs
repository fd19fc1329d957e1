//! Buffer traits and implementations for zero-copy codec operations.
//!
//! This module provides:
//! - [`ReadBuffer`] trait for read-only buffer access
//! - [`WriteBuffer`] trait for read-write buffer access
//! - [`AlignedBuffer`] for cache-line aligned buffers
//! - [`BufferPool`] for reusable encode buffers

use crossbeam_queue::ArrayQueue;
use std::sync::Arc;

/// Trait for read-only buffer access with optimized primitive reads.
///
/// All multi-byte reads use little-endian byte order; this is the wire
/// byte order for the whole protocol.
pub trait ReadBuffer {
    /// Returns the buffer as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Returns the length of the buffer in bytes.
    fn len(&self) -> usize;

    /// Returns true if the buffer is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a u8 at the given offset.
    #[inline(always)]
    fn get_u8(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    /// Reads a u16 in little-endian at the given offset.
    #[inline(always)]
    fn get_u16_le(&self, offset: usize) -> u16 {
        let bytes = &self.as_slice()[offset..offset + 2];
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Reads a u32 in little-endian at the given offset.
    #[inline(always)]
    fn get_u32_le(&self, offset: usize) -> u32 {
        let bytes = &self.as_slice()[offset..offset + 4];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a u64 in little-endian at the given offset.
    #[inline(always)]
    fn get_u64_le(&self, offset: usize) -> u64 {
        let bytes = &self.as_slice()[offset..offset + 8];
        u64::from_le_bytes(bytes.try_into().unwrap())
    }

    /// Reads an i64 in little-endian at the given offset.
    #[inline(always)]
    fn get_i64_le(&self, offset: usize) -> i64 {
        let bytes = &self.as_slice()[offset..offset + 8];
        i64::from_le_bytes(bytes.try_into().unwrap())
    }

    /// Returns a slice of bytes at the given offset and length.
    #[inline(always)]
    fn get_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.as_slice()[offset..offset + len]
    }
}

/// Trait for read-write buffer access with optimized primitive writes.
///
/// All multi-byte writes use little-endian byte order.
pub trait WriteBuffer: ReadBuffer {
    /// Returns the buffer as a mutable byte slice.
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Writes a u8 at the given offset.
    #[inline(always)]
    fn put_u8(&mut self, offset: usize, value: u8) {
        self.as_mut_slice()[offset] = value;
    }

    /// Writes a u16 in little-endian at the given offset.
    #[inline(always)]
    fn put_u16_le(&mut self, offset: usize, value: u16) {
        let bytes = value.to_le_bytes();
        self.as_mut_slice()[offset..offset + 2].copy_from_slice(&bytes);
    }

    /// Writes a u32 in little-endian at the given offset.
    #[inline(always)]
    fn put_u32_le(&mut self, offset: usize, value: u32) {
        let bytes = value.to_le_bytes();
        self.as_mut_slice()[offset..offset + 4].copy_from_slice(&bytes);
    }

    /// Writes a u64 in little-endian at the given offset.
    #[inline(always)]
    fn put_u64_le(&mut self, offset: usize, value: u64) {
        let bytes = value.to_le_bytes();
        self.as_mut_slice()[offset..offset + 8].copy_from_slice(&bytes);
    }

    /// Writes an i64 in little-endian at the given offset.
    #[inline(always)]
    fn put_i64_le(&mut self, offset: usize, value: i64) {
        let bytes = value.to_le_bytes();
        self.as_mut_slice()[offset..offset + 8].copy_from_slice(&bytes);
    }

    /// Writes a byte slice at the given offset.
    #[inline(always)]
    fn put_bytes(&mut self, offset: usize, src: &[u8]) {
        self.as_mut_slice()[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Fills a range with zeros.
    #[inline]
    fn zero(&mut self, offset: usize, len: usize) {
        self.as_mut_slice()[offset..offset + len].fill(0);
    }
}

/// Implement ReadBuffer for byte slices.
impl ReadBuffer for [u8] {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }

    #[inline(always)]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

/// Implement WriteBuffer for byte slices.
impl WriteBuffer for [u8] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

/// Implement ReadBuffer for fixed-size byte arrays, so frames with a known
/// length encode into stack buffers.
impl<const N: usize> ReadBuffer for [u8; N] {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }

    #[inline(always)]
    fn len(&self) -> usize {
        N
    }
}

/// Implement WriteBuffer for fixed-size byte arrays.
impl<const N: usize> WriteBuffer for [u8; N] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

/// Implement ReadBuffer for `Vec<u8>`.
impl ReadBuffer for Vec<u8> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }

    #[inline(always)]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Implement WriteBuffer for `Vec<u8>`.
impl WriteBuffer for Vec<u8> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

/// Cache-line aligned buffer for optimal CPU cache performance.
///
/// The buffer is aligned to 64 bytes (typical cache line size) to prevent
/// false sharing on the encode path.
///
/// # Type Parameters
/// * `N` - Buffer size in bytes
#[repr(C, align(64))]
#[derive(Clone)]
pub struct AlignedBuffer<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> AlignedBuffer<N> {
    /// Creates a new zeroed aligned buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0u8; N] }
    }

    /// Returns the capacity of the buffer in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for AlignedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReadBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    fn len(&self) -> usize {
        N
    }
}

impl<const N: usize> WriteBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> AsRef<[u8]> for AlignedBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> AsMut<[u8]> for AlignedBuffer<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> std::fmt::Debug for AlignedBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("capacity", &N)
            .finish()
    }
}

/// Default buffer size for the pool (64KB).
///
/// Large enough for a snapshot response over the full default instrument
/// universe without reallocation.
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Pool of reusable aligned buffers to avoid allocation on the publish path.
///
/// The pool uses a lock-free queue for thread-safe buffer acquisition
/// and release with minimal contention.
pub struct BufferPool {
    buffers: Arc<ArrayQueue<Box<AlignedBuffer<DEFAULT_BUFFER_SIZE>>>>,
    capacity: usize,
}

impl BufferPool {
    /// Creates a new buffer pool with the specified capacity.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of buffers in the pool
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let buffers = ArrayQueue::new(capacity);
        for _ in 0..capacity {
            let _ = buffers.push(Box::new(AlignedBuffer::new()));
        }
        Self {
            buffers: Arc::new(buffers),
            capacity,
        }
    }

    /// Acquires a buffer from the pool.
    ///
    /// Returns `None` if the pool is empty.
    #[inline]
    #[must_use]
    pub fn acquire(&self) -> Option<Box<AlignedBuffer<DEFAULT_BUFFER_SIZE>>> {
        self.buffers.pop()
    }

    /// Releases a buffer back to the pool.
    ///
    /// # Arguments
    /// * `buffer` - Buffer to release
    #[inline]
    pub fn release(&self, mut buffer: Box<AlignedBuffer<DEFAULT_BUFFER_SIZE>>) {
        buffer.as_mut_slice().fill(0);
        let _ = self.buffers.push(buffer);
    }

    /// Returns the capacity of the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of available buffers in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.buffers.len()
    }
}

impl Clone for BufferPool {
    fn clone(&self) -> Self {
        Self {
            buffers: Arc::clone(&self.buffers),
            capacity: self.capacity,
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &self.capacity)
            .field("available", &self.buffers.len())
            .finish()
    }
}
