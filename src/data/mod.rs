pub mod forecast;
pub mod uv;
