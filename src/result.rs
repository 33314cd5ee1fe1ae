use super::errors::{PoolError, SpawnError};

pub type SpawnResult<T> = Result<T, SpawnError>;

pub type PoolResult<T> = Result<T, PoolError>;
