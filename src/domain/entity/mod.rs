pub mod forecast;
pub mod identity;
pub mod user;

pub use forecast::{Direction, Forecast, ForecastCreate, ForecastFilter, ForecastRecord};
pub use identity::{Identity, TokenClaims};
pub use user::{AuthUser, ProfileUpdate, Session, SignUpResult, UserProfile};
