pub mod aggregate;
pub mod pack;
pub mod table;

use crate::engine::errors::AggrError;

/// Allocates a zero-filled buffer, reporting allocator refusal instead of aborting.
pub(crate) fn try_zeroed(len: usize, what: &'static str) -> Result<Vec<u8>, AggrError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| AggrError::OutOfMemory { what })?;
    buf.resize(len, 0);
    Ok(buf)
}
