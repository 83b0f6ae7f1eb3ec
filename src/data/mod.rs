//! Data access layer.

pub mod db {
    pub use crate::db::*;
}

pub mod lead_storage {
    pub use crate::lead_storage::*;
}
