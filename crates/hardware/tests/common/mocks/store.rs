use blastn_xcel_core::common::StorageError;
use blastn_xcel_core::mem::BackingStore;
use mockall::mock;

mock! {
    pub Store {}
    impl BackingStore for Store {
        fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), StorageError>;
        fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), StorageError>;
    }
}

/// A store whose reads return zeros and whose writes succeed.
pub fn zero_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_read_bytes().returning(|_, buf| {
        buf.fill(0);
        Ok(())
    });
    store.expect_write_bytes().returning(|_, _| Ok(()));
    store
}
