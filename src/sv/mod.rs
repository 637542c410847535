pub mod allocation;
pub mod cache;
pub mod chain;
pub mod referral;
pub mod restaurant;
#[cfg(test)]
pub mod test_utils;
pub mod user;

pub use allocation::Allocation;
pub use cache::ChainCache;
pub use chain::{Chain, ReferralChain};
pub use referral::Referral;
pub use restaurant::Restaurant;
pub use user::User;
