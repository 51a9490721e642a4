//! Verification of mobile in-app-purchase receipts against the Apple App
//! Store `verifyReceipt` endpoint and the Google Play `androidpublisher`
//! API, with the heterogeneous vendor responses normalized into one
//! queryable receipt model.

pub(crate) mod constants;

pub mod data {
    pub mod datasources {
        pub mod app_store_datasource;
        pub mod google_play_datasource;
    }
    pub mod models {
        pub mod app_store {
            pub mod common;
            pub mod ios6_response_model;
            pub mod ios7_response_model;
            pub mod request_model;
        }
        pub mod google_play {
            pub mod product_purchase_model;
            pub mod subscription_purchase_model;
        }
    }
}

pub mod domain {
    pub mod entities {
        pub mod pending_renewal_info;
        pub mod purchase_record;
        pub mod receipt;
    }
}

pub mod errors;
pub mod util;
