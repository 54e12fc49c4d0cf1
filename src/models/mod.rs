pub mod project;
pub mod provider_account;
pub mod user;

pub use project::Project;
pub use provider_account::{ProviderAccount, ProviderAccounts, Upsert};
pub use user::{User, UserPatch};
