//! Item partitioning

use btchrr_core::{BtchrrError, Result};

/// Split `items` into ordered groups of `batch_size`, the last one holding
/// the remainder.
///
/// Groups are owned copies, so the caller may reuse or mutate `items`
/// afterwards without affecting them.
pub fn partition<T: Clone>(items: &[T], batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(BtchrrError::InvalidConfiguration(
            "batch size must be greater than zero".into(),
        ));
    }
    if items.is_empty() {
        return Err(BtchrrError::EmptyInput);
    }

    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}
