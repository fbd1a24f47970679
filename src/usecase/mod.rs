pub mod delete_account;
pub mod get_profile;
pub mod latest_forecasts;
pub mod reset_password;
pub mod resend_verification;
pub mod search_forecasts;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod update_profile;
pub mod upsert_forecast;
pub mod verify_email;

pub use delete_account::DeleteAccountUseCase;
pub use get_profile::GetProfileUseCase;
pub use latest_forecasts::LatestForecastsUseCase;
pub use reset_password::ResetPasswordUseCase;
pub use resend_verification::ResendVerificationUseCase;
pub use search_forecasts::SearchForecastsUseCase;
pub use sign_in::SignInUseCase;
pub use sign_out::SignOutUseCase;
pub use sign_up::SignUpUseCase;
pub use update_profile::UpdateProfileUseCase;
pub use upsert_forecast::UpsertForecastUseCase;
pub use verify_email::VerifyEmailUseCase;
