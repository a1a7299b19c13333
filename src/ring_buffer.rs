//! Single-producer, single-consumer byte ring buffer backed by the library.

use crate::{Error, Result};
use sio_sys::{SoundIo, SoundIoApi, SoundIoRingBuffer};
use std::os::raw::c_int;
use std::ptr::NonNull;
use std::slice;
use std::sync::Arc;

struct RawRing {
    raw: NonNull<SoundIoRingBuffer>,
    api: &'static SoundIoApi,
}

// The native buffer keeps its offsets in atomics; one writer and one reader
// may use it from different threads.
unsafe impl Send for RawRing {}
unsafe impl Sync for RawRing {}

impl RawRing {
    fn capacity(&self) -> usize {
        unsafe { (self.api.ring_buffer_capacity)(self.raw.as_ptr()) }.max(0) as usize
    }

    fn fill_count(&self) -> usize {
        unsafe { (self.api.ring_buffer_fill_count)(self.raw.as_ptr()) }.max(0) as usize
    }

    fn free_count(&self) -> usize {
        unsafe { (self.api.ring_buffer_free_count)(self.raw.as_ptr()) }.max(0) as usize
    }

    fn write_ptr(&self) -> *mut u8 {
        unsafe { (self.api.ring_buffer_write_ptr)(self.raw.as_ptr()) as *mut u8 }
    }

    fn read_ptr(&self) -> *mut u8 {
        unsafe { (self.api.ring_buffer_read_ptr)(self.raw.as_ptr()) as *mut u8 }
    }

    fn advance_write_ptr(&self, count: usize) -> Result<()> {
        if count > self.free_count() {
            return Err(Error::Invalid);
        }
        unsafe { (self.api.ring_buffer_advance_write_ptr)(self.raw.as_ptr(), count as c_int) };
        Ok(())
    }

    fn advance_read_ptr(&self, count: usize) -> Result<()> {
        if count > self.fill_count() {
            return Err(Error::Invalid);
        }
        unsafe { (self.api.ring_buffer_advance_read_ptr)(self.raw.as_ptr(), count as c_int) };
        Ok(())
    }

    /// # Safety
    /// Only the writer side may call this.
    unsafe fn write_region(&self) -> &mut [u8] {
        let len = self.free_count();
        let ptr = self.write_ptr();
        if ptr.is_null() || len == 0 {
            return &mut [];
        }
        slice::from_raw_parts_mut(ptr, len)
    }

    /// # Safety
    /// Only the reader side may call this.
    unsafe fn read_region(&self) -> &[u8] {
        let len = self.fill_count();
        let ptr = self.read_ptr();
        if ptr.is_null() || len == 0 {
            return &[];
        }
        slice::from_raw_parts(ptr, len)
    }

    /// # Safety
    /// Only the writer side may call this.
    unsafe fn write(&self, data: &[u8]) -> usize {
        let region = self.write_region();
        let count = data.len().min(region.len());
        region[..count].copy_from_slice(&data[..count]);
        // `count` is at most the free count just read, so this cannot fail.
        let _ = self.advance_write_ptr(count);
        count
    }

    /// # Safety
    /// Only the reader side may call this.
    unsafe fn read(&self, out: &mut [u8]) -> usize {
        let region = self.read_region();
        let count = out.len().min(region.len());
        out[..count].copy_from_slice(&region[..count]);
        let _ = self.advance_read_ptr(count);
        count
    }

    fn clear(&self) {
        unsafe { (self.api.ring_buffer_clear)(self.raw.as_ptr()) }
    }
}

impl Drop for RawRing {
    fn drop(&mut self) {
        unsafe { (self.api.ring_buffer_destroy)(self.raw.as_ptr()) };
    }
}

/// A byte ring buffer whose regions are always contiguous, so a whole
/// [`Self::write_region`] or [`Self::read_region`] can be used at once.
///
/// Used directly from one thread, or [split](Self::split) into a producer
/// and a consumer that can live on different threads (typically the audio
/// callback and the application).
pub struct RingBuffer {
    ring: RawRing,
}

impl RingBuffer {
    /// Loads the library if needed. `capacity` is a minimum; the library
    /// rounds it up to whole pages.
    pub fn new(capacity: usize) -> Result<Self> {
        let api = sio_sys::load()?;
        unsafe { Self::create(api, std::ptr::null_mut(), capacity) }
    }

    /// # Safety
    /// `soundio` must be null or a live context handle of `api`'s library.
    pub(crate) unsafe fn create(
        api: &'static SoundIoApi,
        soundio: *mut SoundIo,
        capacity: usize,
    ) -> Result<Self> {
        let requested = match c_int::try_from(capacity) {
            Ok(requested) if requested > 0 => requested,
            _ => return Err(Error::Invalid),
        };
        let raw = (api.ring_buffer_create)(soundio, requested);
        let raw = NonNull::new(raw).ok_or(Error::NoMem)?;
        let ring = RawRing { raw, api };
        tracing::debug!("ring buffer allocated: {} bytes", ring.capacity());
        Ok(Self { ring })
    }

    pub fn as_raw(&self) -> *mut SoundIoRingBuffer {
        self.ring.raw.as_ptr()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Bytes ready to read.
    pub fn fill_count(&self) -> usize {
        self.ring.fill_count()
    }

    /// Bytes that can be written.
    pub fn free_count(&self) -> usize {
        self.ring.free_count()
    }

    /// Start of [`Self::free_count`] writable bytes.
    pub fn write_ptr(&mut self) -> *mut u8 {
        self.ring.write_ptr()
    }

    /// Publishes `count` bytes written at [`Self::write_ptr`].
    pub fn advance_write_ptr(&mut self, count: usize) -> Result<()> {
        self.ring.advance_write_ptr(count)
    }

    /// Start of [`Self::fill_count`] readable bytes.
    pub fn read_ptr(&self) -> *const u8 {
        self.ring.read_ptr()
    }

    /// Releases `count` bytes read at [`Self::read_ptr`].
    pub fn advance_read_ptr(&mut self, count: usize) -> Result<()> {
        self.ring.advance_read_ptr(count)
    }

    pub fn write_region(&mut self) -> &mut [u8] {
        unsafe { self.ring.write_region() }
    }

    pub fn read_region(&self) -> &[u8] {
        unsafe { self.ring.read_region() }
    }

    /// Copies in as much of `data` as fits; returns the byte count.
    pub fn write(&mut self, data: &[u8]) -> usize {
        unsafe { self.ring.write(data) }
    }

    /// Copies out up to `out.len()` bytes; returns the byte count.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        unsafe { self.ring.read(out) }
    }

    /// Discards everything unread.
    pub fn clear(&mut self) {
        self.ring.clear()
    }

    pub fn split(self) -> (RingProducer, RingConsumer) {
        let ring = Arc::new(self.ring);
        (
            RingProducer { ring: ring.clone() },
            RingConsumer { ring },
        )
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("fill_count", &self.fill_count())
            .finish()
    }
}

/// Writer half of a split [`RingBuffer`].
pub struct RingProducer {
    ring: Arc<RawRing>,
}

impl RingProducer {
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.ring.free_count()
    }

    pub fn write_region(&mut self) -> &mut [u8] {
        unsafe { self.ring.write_region() }
    }

    pub fn advance_write_ptr(&mut self, count: usize) -> Result<()> {
        self.ring.advance_write_ptr(count)
    }

    #[inline]
    pub fn write(&mut self, data: &[u8]) -> usize {
        unsafe { self.ring.write(data) }
    }

    /// Drops unread bytes. Only the writer may clear.
    pub fn clear(&mut self) {
        self.ring.clear()
    }
}

/// Reader half of a split [`RingBuffer`].
pub struct RingConsumer {
    ring: Arc<RawRing>,
}

impl RingConsumer {
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    #[inline]
    pub fn fill_count(&self) -> usize {
        self.ring.fill_count()
    }

    pub fn read_region(&self) -> &[u8] {
        unsafe { self.ring.read_region() }
    }

    pub fn advance_read_ptr(&mut self, count: usize) -> Result<()> {
        self.ring.advance_read_ptr(count)
    }

    #[inline]
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        unsafe { self.ring.read(out) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_capacity() {
        let Ok(api) = sio_sys::load() else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let zero = unsafe { RingBuffer::create(api, std::ptr::null_mut(), 0) };
        assert!(matches!(zero, Err(Error::Invalid)));
        let huge = unsafe { RingBuffer::create(api, std::ptr::null_mut(), usize::MAX) };
        assert!(matches!(huge, Err(Error::Invalid)));
    }

    #[test]
    fn test_write_read() {
        let Ok(mut rb) = RingBuffer::new(1000) else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        assert!(rb.capacity() >= 1000);
        assert_eq!(rb.fill_count(), 0);
        assert_eq!(rb.free_count(), rb.capacity());

        assert_eq!(rb.write(b"hello"), 5);
        assert_eq!(rb.fill_count(), 5);
        assert_eq!(rb.read_region(), b"hello");

        let mut out = [0u8; 3];
        assert_eq!(rb.read(&mut out), 3);
        assert_eq!(&out, b"hel");
        assert_eq!(rb.fill_count(), 2);

        rb.clear();
        assert_eq!(rb.fill_count(), 0);
    }

    #[test]
    fn test_write_is_bounded_by_free_space() {
        let Ok(mut rb) = RingBuffer::new(1) else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let data = vec![7u8; rb.capacity() + 10];
        assert_eq!(rb.write(&data), rb.capacity());
        assert_eq!(rb.free_count(), 0);
        assert_eq!(rb.write(b"x"), 0);
    }

    #[test]
    fn test_advance_past_counts_is_invalid() {
        let Ok(mut rb) = RingBuffer::new(64) else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        assert!(matches!(rb.advance_read_ptr(1), Err(Error::Invalid)));
        let too_far = rb.free_count() + 1;
        assert!(matches!(rb.advance_write_ptr(too_far), Err(Error::Invalid)));

        let region = rb.write_region();
        region[..4].copy_from_slice(&[1, 2, 3, 4]);
        rb.advance_write_ptr(4).unwrap();
        assert_eq!(unsafe { *rb.read_ptr().add(3) }, 4);
        rb.advance_read_ptr(4).unwrap();
        assert_eq!(rb.fill_count(), 0);
    }

    #[test]
    fn test_split_across_threads() {
        let Ok(rb) = RingBuffer::new(4096) else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let (mut producer, mut consumer) = rb.split();
        let total: usize = 64 * 1024;

        let writer = std::thread::spawn(move || {
            let mut sent = 0usize;
            while sent < total {
                let chunk: Vec<u8> = (sent..(sent + 256).min(total)).map(|i| i as u8).collect();
                let mut offset = 0;
                while offset < chunk.len() {
                    offset += producer.write(&chunk[offset..]);
                    std::thread::yield_now();
                }
                sent += chunk.len();
            }
        });

        let mut received = 0usize;
        let mut buf = [0u8; 512];
        while received < total {
            let n = consumer.read(&mut buf);
            for (i, byte) in buf[..n].iter().enumerate() {
                assert_eq!(*byte, (received + i) as u8);
            }
            received += n;
            if n == 0 {
                std::thread::yield_now();
            }
        }
        writer.join().unwrap();
        assert_eq!(consumer.fill_count(), 0);
    }
}
