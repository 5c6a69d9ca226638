//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write paths that need them

pub mod campaign;
pub mod campaign_message;
pub mod event;
pub mod instance;
pub mod warming_activity;
pub mod warming_contact;
pub mod warming_content;
pub mod warming_pair;
pub mod warming_pool;
pub mod warming_schedule;
