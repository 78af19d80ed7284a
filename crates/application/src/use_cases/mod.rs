//! Application use cases (business logic orchestration).

mod farm_api;
mod session;
mod verify_login;

pub use farm_api::FarmApi;
pub use session::SessionService;
pub use verify_login::{PollPolicy, VerifyAccountLogin};
