pub mod drain;

pub use drain::drain_middleware;
pub use dynamo_infra::request_id_middleware;
