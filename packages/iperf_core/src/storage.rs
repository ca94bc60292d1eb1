use core::fmt;

use embedded_storage::{ReadStorage, Storage};

pub const PARTITION_MAGIC: u32 = 0x4950_4643;
pub const LAYOUT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 16;
const ERASE_CHUNK: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageFault<E> {
    /// Header unreadable as ours; nothing can be written until erased.
    NoFreePages,
    /// Partition was formatted by a different layout version.
    NewVersionFound { found: u8 },
    Io(E),
}

impl<E> StorageFault<E> {
    pub const fn recoverable_by_erase(&self) -> bool {
        matches!(self, Self::NoFreePages | Self::NewVersionFound { .. })
    }
}

impl<E: fmt::Debug> fmt::Display for StorageFault<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFreePages => f.write_str("no free pages"),
            Self::NewVersionFound { found } => {
                write!(f, "layout version {} (expected {})", found, LAYOUT_VERSION)
            }
            Self::Io(err) => write!(f, "flash io {:?}", err),
        }
    }
}

/// Persistent key-value storage as seen by bring-up: it only has to come up
/// clean, erasing once when the layout is unusable.
pub trait KvStorage {
    type Error: fmt::Debug;

    fn init(&mut self) -> Result<(), StorageFault<Self::Error>>;
    fn erase(&mut self) -> Result<(), Self::Error>;
}

/// Settings region at a fixed flash offset, identified by a checksummed
/// header record.
pub struct SettingsPartition<F> {
    flash: F,
    offset: u32,
    len: u32,
}

impl<F> SettingsPartition<F>
where
    F: ReadStorage + Storage,
{
    pub fn new(flash: F, offset: u32, len: u32) -> Self {
        Self { flash, offset, len }
    }

    /// Last `len` bytes of the device, the way a single-sector store is placed.
    pub fn at_end(flash: F, len: u32) -> Self {
        let capacity = flash.capacity() as u32;
        let offset = capacity.saturating_sub(len);
        Self::new(flash, offset, len)
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn read_header(&mut self) -> Result<[u8; HEADER_LEN], F::Error> {
        let mut header = [0u8; HEADER_LEN];
        self.flash.read(self.offset, &mut header)?;
        Ok(header)
    }

    fn write_fresh_header(&mut self) -> Result<(), F::Error> {
        let mut header = [0xFFu8; HEADER_LEN];
        header[0..4].copy_from_slice(&PARTITION_MAGIC.to_le_bytes());
        header[4] = LAYOUT_VERSION;
        header[HEADER_LEN - 1] = checksum8(&header[..HEADER_LEN - 1]);
        self.flash.write(self.offset, &header)
    }
}

impl<F> KvStorage for SettingsPartition<F>
where
    F: ReadStorage + Storage,
    F::Error: fmt::Debug,
{
    type Error = F::Error;

    fn init(&mut self) -> Result<(), StorageFault<Self::Error>> {
        let header = self.read_header().map_err(StorageFault::Io)?;
        if header.iter().all(|&byte| byte == 0xFF) {
            log::info!("storage: formatting partition at 0x{:x}", self.offset);
            return self.write_fresh_header().map_err(StorageFault::Io);
        }
        if u32::from_le_bytes([header[0], header[1], header[2], header[3]]) != PARTITION_MAGIC {
            return Err(StorageFault::NoFreePages);
        }
        if header[HEADER_LEN - 1] != checksum8(&header[..HEADER_LEN - 1]) {
            return Err(StorageFault::NoFreePages);
        }
        if header[4] != LAYOUT_VERSION {
            return Err(StorageFault::NewVersionFound { found: header[4] });
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        let blank = [0xFFu8; ERASE_CHUNK];
        let end = self.offset.saturating_add(self.len);
        let mut cursor = self.offset;
        while cursor < end {
            let chunk = ((end - cursor) as usize).min(ERASE_CHUNK);
            self.flash.write(cursor, &blank[..chunk])?;
            cursor += chunk as u32;
        }
        Ok(())
    }
}

fn checksum8(bytes: &[u8]) -> u8 {
    let mut acc = 0x5Au8;
    for &byte in bytes {
        acc ^= byte.rotate_left(1);
    }
    acc
}
