pub(crate) mod compiler;
pub(crate) mod fingerprint;
pub(crate) mod object;
pub(crate) mod timing;
