//! Application Layer
//!
//! Use cases and application services.

pub mod availability;
pub mod catalog;
pub mod check_session;
pub mod config;
pub mod idle_timeout;
pub mod onboarding;
pub mod session_guard;
pub mod session_liveness;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod sweeper;
pub mod verification;

// Re-exports
pub use availability::{AvailabilityUseCase, NewSlotInput};
pub use catalog::{CatalogUseCase, HomeSummary};
pub use check_session::CheckSessionUseCase;
pub use config::AccountsConfig;
pub use idle_timeout::{IdleTimeoutPolicy, IdleTimeoutUseCase, IdleVerdict, RootTarget};
pub use onboarding::{OnboardingUseCase, OnboardingView, UploadDocumentInput};
pub use session_guard::SingleSessionGuard;
pub use session_liveness::SessionLiveness;
pub use sign_in::{ClientFingerprint, SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use sweeper::{SessionSweeper, SweepReport};
pub use verification::{AcceptOutput, VerificationUseCase};
