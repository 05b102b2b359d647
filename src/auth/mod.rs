mod redirect;
mod store;
mod token;

pub use redirect::{wait_for_redirect, AuthorizationRedirect};
pub use store::{Credentials, TokenStore};
pub use token::{noop_refresh_callback, RefreshCallback, Token};
