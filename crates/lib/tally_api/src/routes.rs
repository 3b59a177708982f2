//! Route paths.

pub const POST_SIGNUP: &str = "/signup";
pub const POST_SIGNIN: &str = "/signin";
pub const POST_CHECKUSER: &str = "/checkuser";
pub const POST_CHECKTOKEN: &str = "/checktoken";
pub const AUTH_GOOGLE: &str = "/auth/google";
pub const GET_AUTH_CHECKSIGNEDIN: &str = "/auth/checksignedin";
pub const ACCOUNTS: &str = "/accounts";
pub const CATEGORIES: &str = "/categories";
pub const GET_PROFILE: &str = "/profile";
