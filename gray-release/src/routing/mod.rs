pub mod canary_pages;
pub mod interceptor;
pub mod navigation;
pub mod path_normalizer;
pub mod redirect;
pub mod session;
