pub mod api;
pub mod blocks;
pub mod client;
pub mod destination;
pub mod dispatch;
pub mod message;
pub mod render;
pub mod retry;
pub mod tag;
#[cfg(test)]
pub mod test_support;
pub mod users;
