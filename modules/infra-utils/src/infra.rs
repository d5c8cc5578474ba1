pub mod rdb;

// for test only
#[cfg(all(any(test, feature = "test-utils"), not(feature = "mysql")))]
pub mod test;
