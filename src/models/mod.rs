mod car;
mod response;

pub use car::{Car, CreateCarRequest, UpdateYearRequest};
pub use response::ApiResponse;
