//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod campaign_message_repo;
pub mod campaign_repo;
pub mod event_repo;
pub mod instance_repo;
pub mod warming_activity_repo;
pub mod warming_contact_repo;
pub mod warming_content_repo;
pub mod warming_pair_repo;
pub mod warming_pool_repo;
pub mod warming_schedule_repo;

pub use campaign_message_repo::CampaignMessageRepo;
pub use campaign_repo::CampaignRepo;
pub use event_repo::EventRepo;
pub use instance_repo::InstanceRepo;
pub use warming_activity_repo::WarmingActivityRepo;
pub use warming_contact_repo::WarmingContactRepo;
pub use warming_content_repo::WarmingContentRepo;
pub use warming_pair_repo::WarmingPairRepo;
pub use warming_pool_repo::WarmingPoolRepo;
pub use warming_schedule_repo::WarmingScheduleRepo;
