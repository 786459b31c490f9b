pub(crate) mod opts;
pub(crate) mod page_session;
