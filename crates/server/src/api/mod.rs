pub mod contacts;
pub mod device;
pub mod dispatch;
pub mod handlers;
pub mod middleware;
pub mod quota;
pub mod routes;
pub mod runs;
pub mod ws;

pub use routes::create_router;
