pub mod application {
    pub mod receipt {
        pub mod extract_batch;
        pub mod extraction_client;
    }
}

pub mod domain {
    pub mod logger;
    pub mod receipt {
        pub mod cancellation;
        pub mod category;
        pub mod errors;
        pub mod model;
        pub mod outcome;
        pub mod progress;
        pub mod schema;
        pub mod services;
        pub mod use_cases {
            pub mod extract_batch;
        }
    }
}
