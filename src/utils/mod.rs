pub mod distro;
pub mod paths;
pub mod platform;
pub mod sanitize;
