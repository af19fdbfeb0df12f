pub mod config;
pub mod login;
pub mod logout;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod tokens;
pub mod verification;

pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use password_reset::PasswordResetUseCase;
pub use refresh::{RefreshOutput, RefreshSessionUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use verification::{ConsumeOutcome, VerificationUseCase};
