pub mod config;
pub mod donations;
pub mod goals;
pub mod memberships;

pub use donations::{
    DonationReceipt, DonationUseCase, InitiateDonationInput, InitiatedCharge, VerifyDonationInput,
};
pub use goals::{CreateGoalInput, GoalUseCase};
pub use memberships::{
    CreateMembershipInput, EnrollmentReceipt, InitiateEnrollmentInput, MembershipUseCase,
    VerifyEnrollmentInput,
};
