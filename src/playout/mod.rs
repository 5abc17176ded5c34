pub(crate) mod playlist;
pub(crate) mod store;
pub(crate) mod worker;
pub(crate) mod write_set;
