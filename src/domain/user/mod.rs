//! User module - state that follows a user across conversations.

mod identity;
mod onboarding;
mod user_state;

pub use identity::signed_in_user_id;
pub use onboarding::{
    is_keep_current, parse_interest_list, InterestCategory, OnboardingRecord, Preferences,
};
pub use user_state::{AuthToken, UserState};
