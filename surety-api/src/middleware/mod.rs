pub mod caller;

pub use caller::{caller_middleware, CallerContext, ACCOUNT_HEADER, VALUE_HEADER};
