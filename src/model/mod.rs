pub(crate) mod dsl;
pub(crate) mod instance;
pub(crate) mod rundown;
