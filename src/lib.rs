pub mod config;
pub mod domain {
    pub mod experiment;
}
pub mod experiments {
    pub mod analyzer;
    pub mod assigner;
}
pub mod http {
    pub mod handlers {
        pub mod assignments;
        pub mod experiments;
        pub mod ops;
        pub mod stats;
    }
    mod reject;
    pub mod routes;

    pub use reject::bad_request;
}
pub mod stats;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
}
