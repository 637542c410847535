pub mod points_allocation;
pub mod referral;
pub mod restaurant;
pub mod user;

pub use referral::ReferralKind;
