//! Customer accounts: sign up, log in and the user table.

mod db;
mod domain;
mod log_in;
mod sign_up;

pub use db::{
    create_user, create_user_table, get_user_by_email, get_user_by_id, update_user_tokens,
    user_exists,
};
pub use domain::{LogInForm, NewUser, SessionResponse, SignUpForm, User, UserID, UserQuery};
pub use log_in::log_in;
pub use sign_up::{AccountState, sign_up};
