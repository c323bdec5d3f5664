//! Memory regions used to move variable-length binary data across the host/guest boundary.
//!
//! Every buffer handed to the host, or reserved for the host to fill, is owned by a
//! process-local table and addressed by an opaque [`RegionHandle`]. Reading a region
//! removes it from the table, so a consumed or foreign handle is reported as a
//! [`RegionError`] instead of touching stale memory.
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::{DecodeError, RegionError};

/// Span of guest memory as seen by the host: the host reads `len` bytes starting at
/// `offset`, or writes up to `capacity` bytes there and updates `len`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub offset: u32,
    pub len: u32,
    pub capacity: u32,
}

impl Region {
    /// Size of the little-endian wire record.
    pub const SIZE: usize = 12;

    /// Encodes the region as three little-endian `u32` words.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.offset.to_le_bytes());
        out[4..8].copy_from_slice(&self.len.to_le_bytes());
        out[8..12].copy_from_slice(&self.capacity.to_le_bytes());
        out
    }

    /// Decodes a region record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Length`] if `bytes` is not exactly [`Region::SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let record: &[u8; Self::SIZE] = bytes.try_into().map_err(|_| DecodeError::Length {
            expected: Self::SIZE,
            actual: bytes.len(),
        })?;
        let word = |i: usize| {
            u32::from_le_bytes([record[i], record[i + 1], record[i + 2], record[i + 3]])
        };
        Ok(Self {
            offset: word(0),
            len: word(4),
            capacity: word(8),
        })
    }
}

/// Opaque handle to a region owned by the region table. This is the `u32` that crosses
/// the ABI; `0` is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionHandle(u32);

impl RegionHandle {
    pub const NULL: RegionHandle = RegionHandle(0);

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn into_raw(self) -> u32 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

struct Slot {
    // Boxed so the record keeps its address while the table rebalances.
    region: Box<Region>,
    data: Vec<u8>,
}

#[derive(Default)]
struct RegionTable {
    slots: BTreeMap<u32, Slot>,
    #[cfg(not(target_arch = "wasm32"))]
    next: u32,
}

impl RegionTable {
    fn insert(&mut self, data: Vec<u8>, len: u32) -> RegionHandle {
        let capacity = to_u32(data.len());
        let region = Box::new(Region {
            offset: data.as_ptr() as usize as u32,
            len,
            capacity,
        });
        let raw = self.next_raw(&region);
        self.slots.insert(raw, Slot { region, data });
        RegionHandle(raw)
    }

    // The host dereferences the handle, so on wasm it must be the record's address.
    #[cfg(target_arch = "wasm32")]
    fn next_raw(&mut self, region: &Region) -> u32 {
        region as *const Region as usize as u32
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn next_raw(&mut self, _region: &Region) -> u32 {
        self.next += 1;
        self.next
    }

    fn slot_mut(&mut self, handle: RegionHandle) -> Result<&mut Slot, RegionError> {
        if handle.is_null() {
            return Err(RegionError::Null);
        }
        self.slots
            .get_mut(&handle.0)
            .ok_or(RegionError::Unknown(handle.0))
    }

    fn write(&mut self, handle: RegionHandle, bytes: &[u8]) -> Result<(), RegionError> {
        let slot = self.slot_mut(handle)?;
        let len = to_u32(bytes.len());
        if len > slot.region.capacity {
            return Err(RegionError::Overflow {
                len,
                capacity: slot.region.capacity,
            });
        }
        slot.data[..bytes.len()].copy_from_slice(bytes);
        slot.region.len = len;
        Ok(())
    }

    fn take(&mut self, handle: RegionHandle) -> Result<Vec<u8>, RegionError> {
        self.slot_mut(handle)?;
        let Slot { region, mut data } = self
            .slots
            .remove(&handle.0)
            .ok_or(RegionError::Unknown(handle.0))?;
        if region.len > region.capacity {
            return Err(RegionError::Overflow {
                len: region.len,
                capacity: region.capacity,
            });
        }
        data.truncate(region.len as usize);
        Ok(data)
    }
}

fn to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| crate::abort())
}

thread_local! {
    static REGIONS: RefCell<RegionTable> = RefCell::new(RegionTable::default());
}

/// Reserves `size` bytes for the host to write into.
pub fn allocate(size: u32) -> RegionHandle {
    REGIONS.with(|table| table.borrow_mut().insert(vec![0; size as usize], size))
}

/// Places a copy of `data` in a new region for the host to read.
pub fn store(data: &[u8]) -> RegionHandle {
    let len = to_u32(data.len());
    REGIONS.with(|table| table.borrow_mut().insert(data.to_vec(), len))
}

/// Writes `bytes` into an allocated region the way the host does.
pub fn write(handle: RegionHandle, bytes: &[u8]) -> Result<(), RegionError> {
    REGIONS.with(|table| table.borrow_mut().write(handle, bytes))
}

/// Copies exactly `len` bytes out of the region and releases it.
pub fn take(handle: RegionHandle) -> Result<Vec<u8>, RegionError> {
    REGIONS.with(|table| table.borrow_mut().take(handle))
}

/// Releases a region without reading it. Unknown handles are ignored.
pub fn release(handle: RegionHandle) {
    REGIONS.with(|table| {
        table.borrow_mut().slots.remove(&handle.0);
    })
}

/// Returns the record the host sees for `handle`, if the region is still live.
pub fn describe(handle: RegionHandle) -> Option<Region> {
    REGIONS.with(|table| table.borrow().slots.get(&handle.0).map(|slot| *slot.region))
}

/// Number of regions that were neither taken nor released.
pub fn live_regions() -> usize {
    REGIONS.with(|table| table.borrow().slots.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_record_layout() {
        let region = Region {
            offset: 0x0102_0304,
            len: 5,
            capacity: 8,
        };
        let bytes = region.to_bytes();
        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[4..8], &[5, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[8, 0, 0, 0]);
        assert_eq!(Region::from_bytes(&bytes), Ok(region));
    }

    #[test]
    fn test_region_record_too_short() {
        assert_eq!(
            Region::from_bytes(&[1, 2, 3]),
            Err(DecodeError::Length {
                expected: 12,
                actual: 3
            })
        );
    }

    #[test]
    fn test_store_and_take() {
        let handle = store(b"hello");
        assert!(!handle.is_null());

        let region = describe(handle).unwrap();
        assert_eq!(region.len, 5);
        assert_eq!(region.capacity, 5);

        assert_eq!(take(handle).unwrap(), b"hello".to_vec());
        assert!(describe(handle).is_none());
    }

    #[test]
    fn test_take_is_read_once() {
        let handle = store(&[1, 2, 3]);
        take(handle).unwrap();

        assert_eq!(take(handle), Err(RegionError::Unknown(handle.into_raw())));
    }

    #[test]
    fn test_null_handle() {
        assert_eq!(take(RegionHandle::NULL), Err(RegionError::Null));
        assert_eq!(write(RegionHandle::NULL, &[1]), Err(RegionError::Null));
    }

    #[test]
    fn test_host_write_into_allocated_region() {
        let handle = allocate(8);
        write(handle, &[7, 7, 7]).unwrap();

        // Only the written prefix is copied out.
        assert_eq!(take(handle).unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn test_host_write_beyond_capacity() {
        let handle = allocate(2);
        assert_eq!(
            write(handle, &[1, 2, 3]),
            Err(RegionError::Overflow {
                len: 3,
                capacity: 2
            })
        );
        release(handle);
    }

    #[test]
    fn test_release() {
        let before = live_regions();
        let handle = allocate(16);
        assert_eq!(live_regions(), before + 1);

        release(handle);
        assert_eq!(live_regions(), before);
        assert!(take(handle).is_err());
    }

    #[test]
    fn test_empty_region() {
        let handle = store(&[]);
        assert_eq!(take(handle).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_handles_are_never_reused() {
        let first = store(b"a");
        take(first).unwrap();
        let second = store(b"b");

        assert!(second.into_raw() > first.into_raw());
        assert_eq!(take(second).unwrap(), b"b".to_vec());
    }
}
