//! All structured models scraped out of VPP's CLI reports

mod bond;
pub use bond::*;

mod interface;
pub use interface::*;

mod lcp;
pub use lcp::*;

mod route;
pub use route::*;
